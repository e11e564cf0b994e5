// Configuration module entry point
// Loads layered configuration (defaults, devserve.toml, DEVSERVE_* env) and validates it

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::ServeError;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig, PerformanceConfig, ServerConfig};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_FILE: &str = "devserve";

/// Environment variable prefix, e.g. `DEVSERVE_SERVER__PORT=3000`
pub const ENV_PREFIX: &str = "DEVSERVE";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; environment variables override it.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.root_directory", ".")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.request_timeout", 30)?
            .set_default("performance.shutdown_grace", 5)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load from the default `devserve.toml` in the working directory
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    pub fn validate(&self) -> Result<(), ServeError> {
        self.server.validate()?;
        self.performance.validate()
    }
}

impl PerformanceConfig {
    /// A zero timeout would close every connection before it is served
    pub fn validate(&self) -> Result<(), ServeError> {
        if self.request_timeout == 0 {
            return Err(ServeError::InvalidConfig(
                "performance.request_timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

impl ServerConfig {
    /// Check the port range and that the root is an existing directory
    pub fn validate(&self) -> Result<(), ServeError> {
        if self.port == 0 {
            return Err(ServeError::InvalidConfig(
                "server.port must be between 1 and 65535".to_string(),
            ));
        }
        if !self.root_directory.exists() {
            return Err(ServeError::InvalidConfig(format!(
                "root directory '{}' does not exist",
                self.root_directory.display()
            )));
        }
        if !self.root_directory.is_dir() {
            return Err(ServeError::InvalidConfig(format!(
                "root directory '{}' is not a directory",
                self.root_directory.display()
            )));
        }
        self.socket_addr().map(|_| ())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServeError> {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        let ip: std::net::IpAddr = host
            .parse()
            .map_err(|e| ServeError::InvalidConfig(format!("Invalid host '{}': {e}", self.host)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
