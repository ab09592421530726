/*
[INPUT]:  YAML configuration file
[OUTPUT]: Parsed and validated viewer configuration
[POS]:    Configuration layer - endpoint, HTTP, store and viewport tuning
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tasklog_adapter::{ClientConfig, Credentials, TasklogClient};

use crate::error::{Result, ViewerError};

pub const INITIAL_BATCH_SIZE: u32 = 1000;
pub const SUBSEQUENT_BATCH_SIZE: u32 = 1000;
pub const MAX_LOGS_IN_MEMORY: usize = 10_000;
pub const SCROLL_THRESHOLD_PERCENTAGE: f64 = 0.1;

/// Top-level configuration for the log viewer
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ViewerConfig {
    /// Console origin, e.g. "http://localhost:8000"
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_project_id")]
    pub project_id: String,
    /// Bearer token sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    /// Directory for the TUI's log file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

/// HTTP timeouts
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Unset means log page fetches never time out
    pub log_fetch_timeout_secs: Option<u64>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            log_fetch_timeout_secs: None,
        }
    }
}

/// Page sizes and the in-memory cap of the task log store
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub initial_batch_size: u32,
    pub subsequent_batch_size: u32,
    pub max_logs_in_memory: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_batch_size: INITIAL_BATCH_SIZE,
            subsequent_batch_size: SUBSEQUENT_BATCH_SIZE,
            max_logs_in_memory: MAX_LOGS_IN_MEMORY,
        }
    }
}

/// Scroll trigger and rendering tuning
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Fraction of the scroll range from the top that triggers an older load
    pub scroll_threshold: f64,
    /// Extra rows kept around the visible window
    pub overscan: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            scroll_threshold: SCROLL_THRESHOLD_PERCENTAGE,
            overscan: 5,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            project_id: default_project_id(),
            token: None,
            http: HttpConfig::default(),
            store: StoreConfig::default(),
            viewport: ViewportConfig::default(),
            log_dir: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_project_id() -> String {
    "123".to_string()
}

impl ViewerConfig {
    /// Parse configuration from a YAML file.
    ///
    /// Not validated: callers apply command-line overrides first and then
    /// call [`ViewerConfig::validate`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ViewerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Explicit path, else the per-user default file if present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let store = &self.store;
        if store.initial_batch_size == 0 || store.subsequent_batch_size == 0 {
            return Err(ViewerError::Config(
                "batch sizes must be greater than zero".to_string(),
            ));
        }
        let largest_batch = store.initial_batch_size.max(store.subsequent_batch_size) as usize;
        if largest_batch > store.max_logs_in_memory {
            return Err(ViewerError::Config(format!(
                "batch size {largest_batch} exceeds max_logs_in_memory {}",
                store.max_logs_in_memory
            )));
        }
        if !(0.0..=1.0).contains(&self.viewport.scroll_threshold) {
            return Err(ViewerError::Config(format!(
                "scroll_threshold must be within [0, 1], got {}",
                self.viewport.scroll_threshold
            )));
        }
        if self.project_id.trim().is_empty() {
            return Err(ViewerError::Config("project_id must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.http.timeout_secs),
            connect_timeout: Duration::from_secs(self.http.connect_timeout_secs),
            log_fetch_timeout: self.http.log_fetch_timeout_secs.map(Duration::from_secs),
        }
    }

    /// HTTP client for the configured console, with credentials if a token is set
    pub fn build_client(&self) -> Result<TasklogClient> {
        let mut client = TasklogClient::with_config(self.client_config(), &self.base_url)?;
        if let Some(token) = &self.token {
            client.set_credentials(Credentials {
                token: token.clone(),
            });
        }
        Ok(client)
    }

    /// Where the TUI writes its own log file
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("tasklog")
        })
    }
}

/// `$XDG_CONFIG_HOME/tasklog/config.yaml` or the platform equivalent
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tasklog").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.store.initial_batch_size, 1000);
        assert_eq!(config.store.max_logs_in_memory, 10_000);
        assert_eq!(config.viewport.scroll_threshold, 0.1);
        assert!(config.validate().is_ok());
        assert!(config.client_config().log_fetch_timeout.is_none());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let file = write_config(
            r#"
base_url: "https://console.example.com"
project_id: "7"
store:
  max_logs_in_memory: 5000
http:
  log_fetch_timeout_secs: 120
"#,
        );
        let config = ViewerConfig::from_file(file.path()).expect("config");
        assert_eq!(config.base_url, "https://console.example.com");
        assert_eq!(config.project_id, "7");
        assert_eq!(config.store.max_logs_in_memory, 5000);
        assert_eq!(config.store.subsequent_batch_size, SUBSEQUENT_BATCH_SIZE);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(
            config.client_config().log_fetch_timeout,
            Some(Duration::from_secs(120))
        );
    }

    #[test]
    fn test_batch_larger_than_cap_is_rejected() {
        let file = write_config(
            r#"
store:
  initial_batch_size: 2000
  max_logs_in_memory: 1000
"#,
        );
        let config = ViewerConfig::from_file(file.path()).expect("parse");
        let err = config.validate().expect_err("should fail");
        assert!(matches!(err, ViewerError::Config(_)));
    }

    #[test]
    fn test_empty_project_id_is_validated_after_overrides() {
        let file = write_config("project_id: \"\"\n");
        let mut config = ViewerConfig::from_file(file.path()).expect("parse");
        assert!(config.validate().is_err());

        config.project_id = "9".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_out_of_range_is_rejected() {
        let mut config = ViewerConfig::default();
        config.viewport.scroll_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = ViewerConfig::from_file(Path::new("/nonexistent/tasklog.yaml"))
            .expect_err("should fail");
        assert!(matches!(err, ViewerError::ConfigRead { .. }));
    }

    #[test]
    fn test_build_client_with_token() {
        let config = ViewerConfig {
            token: Some("secret".to_string()),
            ..ViewerConfig::default()
        };
        let client = config.build_client().expect("client");
        assert_eq!(client.credentials().map(|c| c.token.as_str()), Some("secret"));
    }
}
