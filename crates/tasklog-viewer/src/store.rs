/*
[INPUT]:  LogFetcher implementation, project id, StoreConfig, session keys
[OUTPUT]: Bounded oldest-first log buffer with cursors, loading flags and errors
[POS]:    Task log store - bidirectional pagination state for one log view
[UPDATE]: When merge, cap, or session invalidation rules change
*/

//! Task log store.
//!
//! One store instance backs one log view. A session is one
//! `(job, task, file)` triple; loading a new session bumps a generation
//! counter and cancels every request issued for the previous one, so late
//! responses never touch the new buffer.
//!
//! All operations take `&self`: an older-load and a newer-load of the same
//! session may be in flight together. State lives behind a synchronous mutex
//! that is only held between await points, so merges never interleave.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tasklog_adapter::{Direction, LogFetcher, LogPage, LogPageRequest, START_CURSOR};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::Result;
use crate::normalize::{LogEntry, normalize_page};

/// One `(job, task, file)` viewing context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub job_id: String,
    pub task_id: String,
    pub file_path: String,
}

impl SessionKey {
    pub fn new(
        job_id: impl Into<String>,
        task_id: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            task_id: task_id.into(),
            file_path: file_path.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub older_cursor: i64,
    pub newer_cursor: i64,
    pub has_more_older: bool,
    pub has_more_newer: bool,
    pub is_loading_initial: bool,
    pub is_loading_older: bool,
    pub is_loading_newer: bool,
}

impl PaginationState {
    /// State right after a session starts: the newest window is requested next.
    pub fn fresh() -> Self {
        Self {
            older_cursor: START_CURSOR,
            newer_cursor: START_CURSOR,
            has_more_older: true,
            has_more_newer: false,
            is_loading_initial: false,
            is_loading_older: false,
            is_loading_newer: false,
        }
    }

    pub fn is_loading(&self, direction: Direction) -> bool {
        match direction {
            Direction::Older => self.is_loading_older,
            Direction::Newer => self.is_loading_newer,
        }
    }

    pub fn has_more(&self, direction: Direction) -> bool {
        match direction {
            Direction::Older => self.has_more_older,
            Direction::Newer => self.has_more_newer,
        }
    }

    fn set_loading(&mut self, direction: Direction, loading: bool) {
        match direction {
            Direction::Older => self.is_loading_older = loading,
            Direction::Newer => self.is_loading_newer = loading,
        }
    }

    fn cursor(&self, direction: Direction) -> i64 {
        match direction {
            Direction::Older => self.older_cursor,
            Direction::Newer => self.newer_cursor,
        }
    }

    fn adopt_all(&mut self, page: &PageCursors) {
        self.older_cursor = page.older_cursor;
        self.newer_cursor = page.newer_cursor;
        self.has_more_older = page.has_more_older;
        self.has_more_newer = page.has_more_newer;
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::fresh()
    }
}

/// Which store operation a failure belongs to; retry re-runs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOperation {
    Initial,
    Older,
    Newer,
}

impl From<Direction> for LoadOperation {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Older => LoadOperation::Older,
            Direction::Newer => LoadOperation::Newer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub operation: LoadOperation,
    pub message: String,
    pub retryable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    LoadingInitial,
    Ready,
    Error,
}

/// The buffer was replaced because a merge would have exceeded the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewReset {
    pub direction: Direction,
    /// Lines dropped from the previous window
    pub discarded: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeKind {
    Initial { lines: usize },
    Prepended { lines: usize },
    Appended { lines: usize },
    Replaced(ViewReset),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoSession,
    InitialInFlight,
    InFlight,
    Exhausted,
    ErrorPending,
    NothingToRetry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied(MergeKind),
    /// Returned without issuing a request
    Skipped(SkipReason),
    /// The session changed while the request was in flight; nothing applied
    Stale,
}

/// Running merge counts for the current window.
///
/// A window starts with a session, an initial page, or a cap replace. Within
/// one window the buffer only grows at its ends, so diffing two tallies tells
/// how many lines landed above and below what was there before, however many
/// merges happened in between.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeTally {
    pub window: u64,
    pub prepended: usize,
    pub appended: usize,
    /// Set when the window began with a cap replace
    pub reset: Option<ViewReset>,
}

/// Point-in-time copy of the store for rendering.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub session: Option<SessionKey>,
    pub generation: u64,
    /// Bumped on every buffer change
    pub revision: u64,
    pub entries: Arc<[LogEntry]>,
    pub pagination: PaginationState,
    pub status: SessionStatus,
    pub error: Option<LoadFailure>,
    /// Merge that produced `revision`
    pub last_merge: Option<MergeKind>,
    pub tally: MergeTally,
}

struct PageCursors {
    older_cursor: i64,
    newer_cursor: i64,
    has_more_older: bool,
    has_more_newer: bool,
}

struct StoreState {
    session: Option<SessionKey>,
    generation: u64,
    revision: u64,
    entries: Arc<[LogEntry]>,
    pagination: PaginationState,
    error: Option<LoadFailure>,
    last_merge: Option<MergeKind>,
    tally: MergeTally,
    cancel: CancellationToken,
}

impl StoreState {
    fn new() -> Self {
        Self {
            session: None,
            generation: 0,
            revision: 0,
            entries: Arc::from(Vec::new()),
            pagination: PaginationState::fresh(),
            error: None,
            last_merge: None,
            tally: MergeTally::default(),
            cancel: CancellationToken::new(),
        }
    }

    fn status(&self) -> SessionStatus {
        if self.session.is_none() {
            SessionStatus::Idle
        } else if self.pagination.is_loading_initial {
            SessionStatus::LoadingInitial
        } else if self.error.is_some() {
            SessionStatus::Error
        } else {
            SessionStatus::Ready
        }
    }

    /// Drop the current session and start a new generation.
    fn begin_generation(&mut self, session: Option<SessionKey>) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.generation += 1;
        self.revision += 1;
        self.session = session;
        self.entries = Arc::from(Vec::new());
        self.pagination = PaginationState::fresh();
        self.error = None;
        self.last_merge = None;
        self.start_window(None);
    }

    fn start_window(&mut self, reset: Option<ViewReset>) {
        self.tally = MergeTally {
            window: self.tally.window + 1,
            prepended: 0,
            appended: 0,
            reset,
        };
    }

    fn set_entries(&mut self, entries: Vec<LogEntry>, kind: MergeKind) -> MergeKind {
        match kind {
            MergeKind::Initial { .. } => self.start_window(None),
            MergeKind::Replaced(reset) => self.start_window(Some(reset)),
            MergeKind::Prepended { lines } => self.tally.prepended += lines,
            MergeKind::Appended { lines } => self.tally.appended += lines,
        }
        self.entries = Arc::from(entries);
        self.revision += 1;
        self.last_merge = Some(kind);
        kind
    }

    fn install_initial(&mut self, page: LogPage) -> MergeKind {
        let (logs, cursors) = split_page(page);
        let entries = normalize_page(logs);
        self.pagination.adopt_all(&cursors);
        let lines = entries.len();
        self.set_entries(entries, MergeKind::Initial { lines })
    }

    fn merge(&mut self, direction: Direction, page: LogPage, max_logs: usize) -> MergeKind {
        let (logs, cursors) = split_page(page);
        let incoming = normalize_page(logs);
        let lines = incoming.len();
        let current = self.entries.len();

        if current + lines > max_logs {
            // Memory bound wins over scroll continuity.
            self.pagination.adopt_all(&cursors);
            let reset = ViewReset {
                direction,
                discarded: current,
            };
            return self.set_entries(incoming, MergeKind::Replaced(reset));
        }

        let mut merged = Vec::with_capacity(current + lines);
        match direction {
            Direction::Older => {
                merged.extend(incoming);
                merged.extend(self.entries.iter().cloned());
                self.pagination.older_cursor = cursors.older_cursor;
                self.pagination.has_more_older = cursors.has_more_older;
                self.set_entries(merged, MergeKind::Prepended { lines })
            }
            Direction::Newer => {
                merged.extend(self.entries.iter().cloned());
                merged.extend(incoming);
                self.pagination.newer_cursor = cursors.newer_cursor;
                self.pagination.has_more_newer = cursors.has_more_newer;
                self.set_entries(merged, MergeKind::Appended { lines })
            }
        }
    }
}

fn split_page(page: LogPage) -> (Vec<tasklog_adapter::LogRecord>, PageCursors) {
    let LogPage {
        logs,
        older_cursor,
        newer_cursor,
        has_more_older,
        has_more_newer,
    } = page;
    (
        logs,
        PageCursors {
            older_cursor,
            newer_cursor,
            has_more_older,
            has_more_newer,
        },
    )
}

/// Log buffer and pagination state for one log view.
pub struct TaskLogStore<F> {
    fetcher: F,
    project_id: String,
    config: StoreConfig,
    state: Mutex<StoreState>,
}

impl<F: LogFetcher> TaskLogStore<F> {
    pub fn new(fetcher: F, project_id: impl Into<String>, config: StoreConfig) -> Self {
        Self {
            fetcher,
            project_id: project_id.into(),
            config,
            state: Mutex::new(StoreState::new()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Start a fresh session and fetch its most recent window.
    pub async fn load_initial(&self, session: SessionKey) -> Result<LoadOutcome> {
        let (req, generation, cancel) = {
            let mut state = self.lock();
            state.begin_generation(Some(session.clone()));
            state.pagination.is_loading_initial = true;
            let req = self.page_request(
                &session,
                START_CURSOR,
                self.config.initial_batch_size,
                Direction::Older,
            );
            (req, state.generation, state.cancel.clone())
        };

        info!(
            job_id = %session.job_id,
            task_id = %session.task_id,
            file_path = %session.file_path,
            generation,
            "loading task logs"
        );

        let result = self.fetch(&req, &cancel).await;

        let mut state = self.lock();
        if state.generation != generation {
            debug!(generation, "discarding initial page for superseded session");
            return Ok(LoadOutcome::Stale);
        }
        state.pagination.is_loading_initial = false;

        match result {
            None => Ok(LoadOutcome::Stale),
            Some(Ok(page)) => {
                let kind = state.install_initial(page);
                Ok(LoadOutcome::Applied(kind))
            }
            Some(Err(err)) => {
                warn!(generation, error = %err, "initial log load failed");
                state.error = Some(LoadFailure {
                    operation: LoadOperation::Initial,
                    message: err.to_string(),
                    retryable: err.is_retryable(),
                });
                Err(err.into())
            }
        }
    }

    /// Extend the window towards the start of the log.
    pub async fn load_older(&self) -> Result<LoadOutcome> {
        self.load_direction(Direction::Older).await
    }

    /// Extend the window towards the end of the log.
    pub async fn load_newer(&self) -> Result<LoadOutcome> {
        self.load_direction(Direction::Newer).await
    }

    /// Clear the pending error and re-run the operation that produced it.
    pub async fn retry(&self) -> Result<LoadOutcome> {
        let (operation, session) = {
            let mut state = self.lock();
            let Some(failure) = state.error.take() else {
                return Ok(LoadOutcome::Skipped(SkipReason::NothingToRetry));
            };
            (failure.operation, state.session.clone())
        };

        debug!(?operation, "retrying failed log load");
        match operation {
            LoadOperation::Initial => match session {
                Some(session) => self.load_initial(session).await,
                None => Ok(LoadOutcome::Skipped(SkipReason::NoSession)),
            },
            LoadOperation::Older => self.load_older().await,
            LoadOperation::Newer => self.load_newer().await,
        }
    }

    /// Drop the session and cancel its in-flight requests.
    pub fn close(&self) {
        let mut state = self.lock();
        if state.session.is_some() {
            debug!(generation = state.generation, "closing log session");
        }
        state.begin_generation(None);
    }

    pub fn status(&self) -> SessionStatus {
        self.lock().status()
    }

    pub fn pagination(&self) -> PaginationState {
        self.lock().pagination
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.lock();
        StoreSnapshot {
            session: state.session.clone(),
            generation: state.generation,
            revision: state.revision,
            entries: Arc::clone(&state.entries),
            pagination: state.pagination,
            status: state.status(),
            error: state.error.clone(),
            last_merge: state.last_merge,
            tally: state.tally,
        }
    }

    async fn load_direction(&self, direction: Direction) -> Result<LoadOutcome> {
        let (req, generation, cancel) = {
            let mut state = self.lock();
            let Some(session) = state.session.clone() else {
                return Ok(LoadOutcome::Skipped(SkipReason::NoSession));
            };
            if state.pagination.is_loading_initial {
                return Ok(LoadOutcome::Skipped(SkipReason::InitialInFlight));
            }
            if state.error.is_some() {
                return Ok(LoadOutcome::Skipped(SkipReason::ErrorPending));
            }
            if state.pagination.is_loading(direction) {
                return Ok(LoadOutcome::Skipped(SkipReason::InFlight));
            }
            if !state.pagination.has_more(direction) {
                return Ok(LoadOutcome::Skipped(SkipReason::Exhausted));
            }

            state.pagination.set_loading(direction, true);
            let cursor = state.pagination.cursor(direction);
            let req = self.page_request(
                &session,
                cursor,
                self.config.subsequent_batch_size,
                direction,
            );
            (req, state.generation, state.cancel.clone())
        };

        debug!(%direction, cursor = req.cursor, generation, "loading log page");

        let result = self.fetch(&req, &cancel).await;

        let mut state = self.lock();
        if state.generation != generation {
            debug!(%direction, generation, "discarding log page for superseded session");
            return Ok(LoadOutcome::Stale);
        }
        state.pagination.set_loading(direction, false);

        match result {
            None => Ok(LoadOutcome::Stale),
            Some(Ok(page)) => {
                let kind = state.merge(direction, page, self.config.max_logs_in_memory);
                if let MergeKind::Replaced(reset) = kind {
                    warn!(
                        %direction,
                        discarded = reset.discarded,
                        kept = state.entries.len(),
                        "log buffer cap reached; view reset to the fetched page"
                    );
                }
                Ok(LoadOutcome::Applied(kind))
            }
            Some(Err(err)) => {
                warn!(%direction, error = %err, "log page load failed");
                state.error = Some(LoadFailure {
                    operation: direction.into(),
                    message: err.to_string(),
                    retryable: err.is_retryable(),
                });
                Err(err.into())
            }
        }
    }

    async fn fetch(
        &self,
        req: &LogPageRequest,
        cancel: &CancellationToken,
    ) -> Option<tasklog_adapter::Result<LogPage>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.fetcher.fetch_page(req) => Some(result),
        }
    }

    fn page_request(
        &self,
        session: &SessionKey,
        cursor: i64,
        limit: u32,
        direction: Direction,
    ) -> LogPageRequest {
        LogPageRequest {
            project_id: self.project_id.clone(),
            job_id: session.job_id.clone(),
            task_id: session.task_id.clone(),
            file_path: session.file_path.clone(),
            cursor,
            limit,
            direction,
        }
    }
}

impl<F> TaskLogStore<F> {
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F> Drop for TaskLogStore<F> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.cancel.cancel();
    }
}
