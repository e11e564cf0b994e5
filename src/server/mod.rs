// 服务器模块入口
// Binds the listener, runs post-start hooks and the accept loop

pub mod connection;
pub mod hook;
pub mod listener;
pub mod signal;

// Rust 不允许 loop 作为模块名（关键字），改用 server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::config::{AppState, Config, LoggingConfig, PerformanceConfig, ServerConfig};
use crate::error::ServeError;
use crate::logger;

// 重新导出常用类型
pub use hook::{browser_hook, PostStartHook};
pub use listener::create_listener;
pub use server_loop::start_server_loop;
pub use signal::{start_signal_handler, SignalHandler};

/// A bound static file server, ready to run
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: Arc<AppState>,
    post_start_hook: Option<PostStartHook>,
}

impl Server {
    /// Bind with default logging and performance settings
    ///
    /// Must be called from within a Tokio runtime.
    pub fn bind(config: ServerConfig) -> Result<Self, ServeError> {
        Self::bind_with(config, LoggingConfig::default(), PerformanceConfig::default())
    }

    /// Bind from a fully loaded configuration
    pub fn from_config(config: Config) -> Result<Self, ServeError> {
        config.validate()?;
        Self::bind_with(config.server, config.logging, config.performance)
    }

    pub fn bind_with(
        server: ServerConfig,
        logging: LoggingConfig,
        performance: PerformanceConfig,
    ) -> Result<Self, ServeError> {
        let state = AppState::new(server, logging, performance)?;
        let addr = state.server.socket_addr()?;

        let listener = create_listener(addr).map_err(|e| {
            logger::log_bind_failed(&addr, &e);
            ServeError::from_bind(addr, e)
        })?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            local_addr,
            state: Arc::new(state),
            post_start_hook: None,
        })
    }

    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.server
    }

    /// Register a callback fired once with the bound address
    #[must_use]
    pub fn with_post_start_hook(mut self, hook: impl FnOnce(SocketAddr) + Send + 'static) -> Self {
        self.post_start_hook = Some(Box::new(hook));
        self
    }

    /// Serve until `shutdown` is notified
    pub async fn run(self, shutdown: Arc<Notify>) -> Result<(), ServeError> {
        logger::log_server_start(&self.local_addr, &self.state.server);

        if let Some(hook) = self.post_start_hook {
            hook(self.local_addr);
        }

        start_server_loop(self.listener, self.state, shutdown).await;
        Ok(())
    }
}
