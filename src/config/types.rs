// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Static file server configuration
///
/// Immutable once the server has started; shared read-only between connections.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    #[serde(default = "default_root_directory")]
    pub root_directory: PathBuf,
    /// Joined with ", " into `Access-Control-Allow-Methods`
    #[serde(default = "default_cors_allowed_methods")]
    pub cors_allowed_methods: Vec<String>,
    /// Joined with ", " into `Access-Control-Allow-Headers`
    #[serde(default = "default_cors_allowed_headers")]
    pub cors_allowed_headers: Vec<String>,
    /// File extension (with or without leading dot) -> Content-Type
    #[serde(default = "default_mime_overrides")]
    pub mime_overrides: HashMap<String, String>,
    #[serde(default = "default_index_files")]
    pub index_files: Vec<String>,
    #[serde(default = "default_true")]
    pub directory_listing: bool,
    #[serde(default)]
    pub open_browser: bool,
    #[serde(default)]
    pub workers: Option<usize>,
}

impl ServerConfig {
    /// Create a configuration with defaults for everything but port and root
    pub fn new(port: u16, root_directory: impl Into<PathBuf>) -> Self {
        Self {
            host: default_host(),
            port,
            root_directory: root_directory.into(),
            cors_allowed_methods: default_cors_allowed_methods(),
            cors_allowed_headers: default_cors_allowed_headers(),
            mime_overrides: default_mime_overrides(),
            index_files: default_index_files(),
            directory_listing: true,
            open_browser: false,
            workers: None,
        }
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn with_cors_allowed_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cors_allowed_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_cors_allowed_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cors_allowed_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_mime_override(
        mut self,
        extension: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        self.mime_overrides
            .insert(extension.into(), content_type.into());
        self
    }

    #[must_use]
    pub fn with_index_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.index_files = files.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_directory_listing(mut self, enabled: bool) -> Self {
        self.directory_listing = enabled;
        self
    }

    #[must_use]
    pub const fn with_open_browser(mut self, enabled: bool) -> Self {
        self.open_browser = enabled;
        self
    }

    #[must_use]
    pub const fn with_workers(mut self, workers: Option<usize>) -> Self {
        self.workers = workers;
        self
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// One of error, warn, info, debug
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_true")]
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            access_log: true,
            access_log_format: default_access_log_format(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    #[serde(default = "default_true")]
    pub keep_alive: bool,
    /// Upper bound on a single connection's lifetime, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// How long in-flight connections may run after shutdown, in seconds
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive: true,
            request_timeout: default_request_timeout(),
            shutdown_grace: default_shutdown_grace(),
            max_connections: None,
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_root_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_cors_allowed_methods() -> Vec<String> {
    vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()]
}

fn default_cors_allowed_headers() -> Vec<String> {
    vec!["Content-Type".to_string()]
}

fn default_mime_overrides() -> HashMap<String, String> {
    HashMap::from([
        (".mjs".to_string(), "text/javascript".to_string()),
        (".wasm".to_string(), "application/wasm".to_string()),
    ])
}

fn default_index_files() -> Vec<String> {
    vec!["index.html".to_string(), "index.htm".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_access_log_format() -> String {
    "combined".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_request_timeout() -> u64 {
    30
}

#[allow(clippy::missing_const_for_fn)]
fn default_shutdown_grace() -> u64 {
    5
}
