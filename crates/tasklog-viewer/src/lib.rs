/*
[INPUT]:  Public API exports for tasklog-viewer crate
[OUTPUT]: Store, viewport, config, and normalization types
[POS]:    Library root
[UPDATE]: When adding or removing public modules
*/

pub mod config;
pub mod error;
pub mod normalize;
pub mod store;
pub mod viewport;

pub use config::ViewerConfig;
pub use error::{Result, ViewerError};
pub use normalize::LogEntry;
pub use store::{
    LoadFailure, LoadOperation, LoadOutcome, MergeKind, MergeTally, PaginationState, SessionKey,
    SessionStatus, SkipReason, StoreSnapshot, TaskLogStore, ViewReset,
};
pub use viewport::{LogFilter, LogViewport, ScrollAnchor, ScrollMetrics};
