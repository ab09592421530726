/*
[INPUT]:  Fetch errors from the adapter, config file and validation failures
[OUTPUT]: ViewerError and Result alias for the viewer library
[POS]:    Error handling layer - viewer library errors
[UPDATE]: When adding new error sources
*/

use std::path::PathBuf;

use tasklog_adapter::TasklogError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    /// Fetching a log page failed
    #[error("log fetch failed: {0}")]
    Fetch(#[from] TasklogError),

    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid YAML for the expected schema
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Config values are inconsistent
    #[error("invalid config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
