/*
[INPUT]:  StoreSnapshot, viewport height, scroll input, search/level filter
[OUTPUT]: Visible row window, fetch directives, scroll position bookkeeping
[POS]:    Log viewport - virtualized window over the filtered buffer
[UPDATE]: When scroll trigger, restoration, or filter rules change
*/

use std::ops::Range;
use std::sync::Arc;

use tasklog_adapter::Direction;

use crate::config::ViewportConfig;
use crate::normalize::LogEntry;
use crate::store::{MergeTally, PaginationState, StoreSnapshot, ViewReset};

/// Scroll geometry in rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub scroll_top: usize,
    pub scroll_height: usize,
    pub client_height: usize,
}

impl ScrollMetrics {
    pub fn max_scroll_top(&self) -> usize {
        self.scroll_height.saturating_sub(self.client_height)
    }

    /// Position within the scroll range; a list that fits counts as the top.
    pub fn scrolled_fraction(&self) -> f64 {
        let max = self.max_scroll_top();
        if max == 0 {
            return 0.0;
        }
        self.scroll_top.min(max) as f64 / max as f64
    }

    pub fn is_at_bottom(&self) -> bool {
        self.scroll_top >= self.max_scroll_top()
    }
}

/// Scroll position captured before an older page is prepended.
///
/// `scroll_height` follows every change below the anchor (appends, filter
/// changes) so that only rows prepended above it move the restored offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAnchor {
    pub scroll_height: usize,
    pub scroll_top: usize,
}

impl ScrollAnchor {
    pub fn capture(metrics: &ScrollMetrics) -> Self {
        Self {
            scroll_height: metrics.scroll_height,
            scroll_top: metrics.scroll_top,
        }
    }

    /// Offset that keeps the same lines on screen after the content above grew.
    pub fn restore(&self, new_scroll_height: usize) -> usize {
        self.scroll_top + new_scroll_height.saturating_sub(self.scroll_height)
    }
}

/// Presentation-only filter; never touches the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    search_text: String,
    needle: String,
    errors_only: bool,
}

impl LogFilter {
    pub fn new(search_text: impl Into<String>, errors_only: bool) -> Self {
        let search_text = search_text.into();
        let needle = search_text.trim().to_lowercase();
        Self {
            search_text,
            needle,
            errors_only,
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn errors_only(&self) -> bool {
        self.errors_only
    }

    pub fn is_active(&self) -> bool {
        self.errors_only || !self.needle.is_empty()
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        if self.errors_only && !entry.level.is_error() {
            return false;
        }
        self.needle.is_empty() || entry.message.to_lowercase().contains(&self.needle)
    }
}

/// Virtualized view over the store buffer.
#[derive(Debug)]
pub struct LogViewport {
    threshold: f64,
    overscan: usize,
    filter: LogFilter,
    entries: Arc<[LogEntry]>,
    /// Buffer indices that pass the filter, in buffer order
    filtered: Vec<usize>,
    seen_generation: u64,
    seen_revision: u64,
    seen_tally: MergeTally,
    scroll_top: usize,
    client_height: usize,
    anchor: Option<ScrollAnchor>,
    scroll_to_bottom_pending: bool,
    banner: Option<ViewReset>,
}

impl LogViewport {
    pub fn new(config: &ViewportConfig) -> Self {
        Self {
            threshold: config.scroll_threshold,
            overscan: config.overscan,
            filter: LogFilter::default(),
            entries: Arc::from(Vec::new()),
            filtered: Vec::new(),
            seen_generation: 0,
            seen_revision: 0,
            seen_tally: MergeTally::default(),
            scroll_top: 0,
            client_height: 0,
            anchor: None,
            scroll_to_bottom_pending: false,
            banner: None,
        }
    }

    pub fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: self.scroll_top,
            scroll_height: self.filtered.len(),
            client_height: self.client_height,
        }
    }

    pub fn filter(&self) -> &LogFilter {
        &self.filter
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn banner(&self) -> Option<ViewReset> {
        self.banner
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    pub fn anchor(&self) -> Option<ScrollAnchor> {
        self.anchor
    }

    pub fn set_client_height(&mut self, rows: usize) {
        self.client_height = rows;
        self.clamp();
    }

    pub fn set_filter(&mut self, filter: LogFilter) {
        if filter == self.filter {
            return;
        }
        self.filter = filter;
        self.refilter();
        self.clamp();
        let metrics = self.metrics();
        if let Some(anchor) = self.anchor.as_mut() {
            *anchor = ScrollAnchor::capture(&metrics);
        }
        self.apply_scroll_to_bottom();
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        let filter = LogFilter::new(text, self.filter.errors_only);
        self.set_filter(filter);
    }

    pub fn toggle_errors_only(&mut self) {
        let filter = LogFilter::new(self.filter.search_text.clone(), !self.filter.errors_only);
        self.set_filter(filter);
    }

    /// Pick up store changes. Cheap when nothing changed.
    ///
    /// Works from the merge tally rather than the last merge alone, so any
    /// number of prepends and appends between two calls land the same way.
    pub fn sync(&mut self, snapshot: &StoreSnapshot) {
        if snapshot.generation != self.seen_generation {
            self.seen_generation = snapshot.generation;
            self.scroll_top = 0;
            self.anchor = None;
            self.banner = None;
            self.scroll_to_bottom_pending = false;
        }

        if snapshot.revision != self.seen_revision {
            self.seen_revision = snapshot.revision;
            let was_at_bottom = !self.filtered.is_empty() && self.metrics().is_at_bottom();
            let previous = std::mem::replace(&mut self.seen_tally, snapshot.tally);
            self.entries = Arc::clone(&snapshot.entries);
            self.refilter();

            if snapshot.tally.window != previous.window {
                self.enter_window(snapshot.tally.reset);
            } else {
                let prepended = snapshot.tally.prepended.saturating_sub(previous.prepended);
                let appended = snapshot.tally.appended.saturating_sub(previous.appended);
                self.apply_growth(prepended, appended, was_at_bottom);
            }
            self.clamp();
        }

        self.apply_scroll_to_bottom();
    }

    /// Move by `delta` rows and report whether an older page should be fetched.
    ///
    /// Every scroll input is evaluated, including one that is already pinned at
    /// the top, so a short list can still be extended.
    pub fn scroll_by(
        &mut self,
        delta: isize,
        pagination: &PaginationState,
        error_pending: bool,
    ) -> Option<Direction> {
        self.scroll_top = self.scroll_top.saturating_add_signed(delta);
        self.clamp();
        if let Some(anchor) = self.anchor.as_mut() {
            anchor.scroll_top = self.scroll_top;
        }
        self.older_trigger(pagination, error_pending)
    }

    pub fn page_up(&mut self, pagination: &PaginationState, error_pending: bool) -> Option<Direction> {
        let rows = self.client_height.max(1) as isize;
        self.scroll_by(-rows, pagination, error_pending)
    }

    pub fn page_down(
        &mut self,
        pagination: &PaginationState,
        error_pending: bool,
    ) -> Option<Direction> {
        let rows = self.client_height.max(1) as isize;
        self.scroll_by(rows, pagination, error_pending)
    }

    pub fn scroll_to_top(
        &mut self,
        pagination: &PaginationState,
        error_pending: bool,
    ) -> Option<Direction> {
        let delta = -(self.scroll_top as isize);
        self.scroll_by(delta, pagination, error_pending)
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.metrics().max_scroll_top();
        if let Some(anchor) = self.anchor.as_mut() {
            anchor.scroll_top = self.scroll_top;
        }
    }

    /// Record the scroll position ahead of an explicit older-page request.
    pub fn capture_anchor(&mut self) {
        self.anchor = Some(ScrollAnchor::capture(&self.metrics()));
    }

    /// Rows on screen, as indices into the filtered list.
    pub fn visible_range(&self) -> Range<usize> {
        let start = self.scroll_top.min(self.filtered.len());
        let end = (start + self.client_height).min(self.filtered.len());
        start..end
    }

    /// Visible rows plus overscan on both sides.
    pub fn render_range(&self) -> Range<usize> {
        let visible = self.visible_range();
        let start = visible.start.saturating_sub(self.overscan);
        let end = (visible.end + self.overscan).min(self.filtered.len());
        start..end
    }

    /// Rows between the start of `render_range` and the first visible row.
    pub fn render_offset(&self) -> usize {
        self.visible_range().start - self.render_range().start
    }

    pub fn visible_entries(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        self.entries_in(self.visible_range())
    }

    pub fn render_entries(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        self.entries_in(self.render_range())
    }

    fn entries_in(&self, range: Range<usize>) -> impl Iterator<Item = &LogEntry> + '_ {
        self.filtered[range]
            .iter()
            .filter_map(|&idx| self.entries.get(idx))
    }

    /// A new window replaced the buffer: a first page or a cap reset.
    fn enter_window(&mut self, reset: Option<ViewReset>) {
        self.anchor = None;
        match reset {
            None => self.scroll_to_bottom_pending = true,
            Some(reset) => {
                self.banner = Some(reset);
                self.scroll_top = match reset.direction {
                    // Newest lines of the older page sit next to what was on screen.
                    Direction::Older => self.metrics().max_scroll_top(),
                    Direction::Newer => 0,
                };
            }
        }
    }

    /// The buffer grew by `prepended` lines at the top and `appended` at the bottom.
    fn apply_growth(&mut self, prepended: usize, appended: usize, was_at_bottom: bool) {
        if prepended == 0 && appended == 0 {
            return;
        }
        self.banner = None;

        let above = self.filtered.partition_point(|&idx| idx < prepended);
        let tail_start = self.entries.len().saturating_sub(appended);
        let below = self.filtered.len() - self.filtered.partition_point(|&idx| idx < tail_start);

        if let Some(anchor) = self.anchor.as_mut() {
            anchor.scroll_height += below;
        }
        if prepended > 0 {
            self.scroll_top = match self.anchor.take() {
                Some(anchor) => anchor.restore(self.filtered.len()),
                None => self.scroll_top + above,
            };
        }
        if appended > 0 && was_at_bottom {
            self.scroll_top = self.metrics().max_scroll_top();
        }
    }

    fn older_trigger(&mut self, pagination: &PaginationState, error_pending: bool) -> Option<Direction> {
        if error_pending || pagination.is_loading_older || !pagination.has_more_older {
            return None;
        }
        if self.metrics().scrolled_fraction() > self.threshold {
            return None;
        }
        self.capture_anchor();
        Some(Direction::Older)
    }

    fn refilter(&mut self) {
        self.filtered = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| self.filter.matches(entry))
            .map(|(idx, _)| idx)
            .collect();
    }

    fn clamp(&mut self) {
        self.scroll_top = self.scroll_top.min(self.metrics().max_scroll_top());
    }

    fn apply_scroll_to_bottom(&mut self) {
        if self.scroll_to_bottom_pending && !self.filtered.is_empty() {
            self.scroll_to_bottom_pending = false;
            self.scroll_top = self.metrics().max_scroll_top();
        }
    }
}
