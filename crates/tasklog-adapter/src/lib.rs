/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public task log adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod fetcher;
pub mod http;
pub mod types;

pub use fetcher::LogFetcher;

// Re-export commonly used types from http
pub use http::{ClientConfig, Credentials, Result, TasklogClient, TasklogError};

// Re-export all types
pub use types::*;
