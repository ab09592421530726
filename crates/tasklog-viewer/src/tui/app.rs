/*
[INPUT]:  Shared TaskLogStore, session key, viewport config, UI event sender
[OUTPUT]: AppState with viewport, input mode, and background load spawning
[POS]:    TUI app state
[UPDATE]: When adding keybound actions or load flows
*/

use std::sync::Arc;

use crossterm::event::Event as CrosstermEvent;
use tasklog_adapter::{Direction, TasklogClient};
use tasklog_viewer::config::ViewportConfig;
use tasklog_viewer::{
    LoadOutcome, LogViewport, MergeKind, SessionKey, SkipReason, StoreSnapshot, TaskLogStore,
};
use tokio::sync::mpsc;
use tracing::debug;

pub(super) type SharedStore = Arc<TaskLogStore<TasklogClient>>;

pub(super) enum UiEvent {
    Input(CrosstermEvent),
    Loaded {
        request: LoadRequest,
        result: Result<LoadOutcome, String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LoadRequest {
    Initial,
    Older,
    Newer,
    Retry,
}

impl LoadRequest {
    fn label(self) -> &'static str {
        match self {
            LoadRequest::Initial => "initial load",
            LoadRequest::Older => "older page",
            LoadRequest::Newer => "newer page",
            LoadRequest::Retry => "retry",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum InputMode {
    Normal,
    Search,
}

pub(super) struct AppState {
    pub(super) store: SharedStore,
    pub(super) session: SessionKey,
    pub(super) viewport: LogViewport,
    pub(super) snapshot: StoreSnapshot,
    pub(super) input_mode: InputMode,
    pub(super) search_draft: String,
    pub(super) status_message: String,
    events: mpsc::UnboundedSender<UiEvent>,
}

impl AppState {
    pub(super) fn new(
        store: SharedStore,
        session: SessionKey,
        viewport_config: &ViewportConfig,
        events: mpsc::UnboundedSender<UiEvent>,
    ) -> Self {
        let snapshot = store.snapshot();
        Self {
            store,
            session,
            viewport: LogViewport::new(viewport_config),
            snapshot,
            input_mode: InputMode::Normal,
            search_draft: String::new(),
            status_message: "Ready".to_string(),
            events,
        }
    }

    /// Pull the latest store state into the viewport.
    pub(super) fn sync(&mut self) {
        self.snapshot = self.store.snapshot();
        self.viewport.sync(&self.snapshot);
    }

    pub(super) fn error_pending(&self) -> bool {
        self.snapshot.error.is_some()
    }

    pub(super) fn scroll(&mut self, delta: isize) {
        let pagination = self.snapshot.pagination;
        let directive = self
            .viewport
            .scroll_by(delta, &pagination, self.error_pending());
        self.follow(directive);
    }

    pub(super) fn page_up(&mut self) {
        let pagination = self.snapshot.pagination;
        let directive = self.viewport.page_up(&pagination, self.error_pending());
        self.follow(directive);
    }

    pub(super) fn page_down(&mut self) {
        let pagination = self.snapshot.pagination;
        let directive = self.viewport.page_down(&pagination, self.error_pending());
        self.follow(directive);
    }

    pub(super) fn jump_to_top(&mut self) {
        let pagination = self.snapshot.pagination;
        let directive = self
            .viewport
            .scroll_to_top(&pagination, self.error_pending());
        self.follow(directive);
    }

    pub(super) fn jump_to_bottom(&mut self) {
        self.viewport.scroll_to_bottom();
    }

    /// Load newer lines when the backend has them, otherwise reload the tail.
    pub(super) fn refresh(&mut self) {
        if self.error_pending() {
            self.status_message = "a load failed; press [R] to retry".to_string();
            return;
        }
        if self.snapshot.pagination.has_more_newer {
            self.spawn_load(LoadRequest::Newer);
        } else {
            self.spawn_load(LoadRequest::Initial);
        }
    }

    pub(super) fn retry(&mut self) {
        if !self.error_pending() {
            self.status_message = "nothing to retry".to_string();
            return;
        }
        self.spawn_load(LoadRequest::Retry);
    }

    pub(super) fn begin_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.search_draft = self.viewport.filter().search_text().to_string();
    }

    pub(super) fn update_search(&mut self) {
        self.viewport.set_search_text(self.search_draft.clone());
    }

    pub(super) fn finish_search(&mut self, keep: bool) {
        if !keep {
            self.search_draft.clear();
            self.update_search();
        }
        self.input_mode = InputMode::Normal;
    }

    pub(super) fn toggle_errors_only(&mut self) {
        self.viewport.toggle_errors_only();
        self.status_message = if self.viewport.filter().errors_only() {
            "showing errors only".to_string()
        } else {
            "showing all levels".to_string()
        };
    }

    pub(super) fn spawn_load(&mut self, request: LoadRequest) {
        let store = Arc::clone(&self.store);
        let session = self.session.clone();
        let events = self.events.clone();
        self.status_message = format!("{}...", request.label());

        tokio::spawn(async move {
            let result = match request {
                LoadRequest::Initial => store.load_initial(session).await,
                LoadRequest::Older => store.load_older().await,
                LoadRequest::Newer => store.load_newer().await,
                LoadRequest::Retry => store.retry().await,
            };
            let _ = events.send(UiEvent::Loaded {
                request,
                result: result.map_err(|err| err.to_string()),
            });
        });
    }

    pub(super) fn on_loaded(&mut self, request: LoadRequest, result: Result<LoadOutcome, String>) {
        self.status_message = match result {
            Ok(LoadOutcome::Applied(MergeKind::Initial { lines })) => {
                format!("loaded {lines} lines")
            }
            Ok(LoadOutcome::Applied(MergeKind::Prepended { lines })) => {
                format!("loaded {lines} older lines")
            }
            Ok(LoadOutcome::Applied(MergeKind::Appended { lines: 0 })) => {
                "no new lines".to_string()
            }
            Ok(LoadOutcome::Applied(MergeKind::Appended { lines })) => {
                format!("loaded {lines} newer lines")
            }
            Ok(LoadOutcome::Applied(MergeKind::Replaced(reset))) => {
                format!("view reset after {} lines were dropped", reset.discarded)
            }
            Ok(LoadOutcome::Skipped(SkipReason::Exhausted)) => match request {
                LoadRequest::Newer => "already at the end of the log".to_string(),
                _ => "already at the start of the log".to_string(),
            },
            Ok(outcome) => {
                debug!(?request, ?outcome, "load produced no change");
                return;
            }
            Err(message) => format!("{} failed: {message}", request.label()),
        };
    }

    fn follow(&mut self, directive: Option<Direction>) {
        match directive {
            Some(Direction::Older) => self.spawn_load(LoadRequest::Older),
            Some(Direction::Newer) => self.spawn_load(LoadRequest::Newer),
            None => {}
        }
    }
}
