// Application state module
// Immutable per-process state shared by every connection

use std::path::PathBuf;

use super::types::{LoggingConfig, PerformanceConfig, ServerConfig};
use crate::error::ServeError;
use crate::http::{CorsPolicy, MimeResolver};

/// Application state
///
/// Built once before the accept loop starts and shared behind `Arc`.
pub struct AppState {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    /// Canonical form of `server.root_directory`
    pub root: PathBuf,
    pub cors: CorsPolicy,
    pub mime: MimeResolver,
}

impl AppState {
    pub fn new(
        server: ServerConfig,
        logging: LoggingConfig,
        performance: PerformanceConfig,
    ) -> Result<Self, ServeError> {
        server.validate()?;
        performance.validate()?;
        let root = server.root_directory.canonicalize()?;

        Ok(Self {
            cors: CorsPolicy::from_config(&server),
            mime: MimeResolver::new(&server.mime_overrides),
            root,
            server,
            logging,
            performance,
        })
    }
}
