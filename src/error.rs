//! Error types
//!
//! `ServeError` covers startup failures, which end the process.
//! `RequestError` covers failures of a single request, which become an HTTP status.

use std::net::SocketAddr;

use hyper::StatusCode;
use thiserror::Error;

/// Fatal errors raised while starting the server
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("port {} is already in use on {addr}", .addr.port())]
    PortInUse { addr: SocketAddr },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServeError {
    /// Map a bind failure, singling out an occupied port
    pub fn from_bind(addr: SocketAddr, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::AddrInUse {
            Self::PortInUse { addr }
        } else {
            Self::Bind { addr, source }
        }
    }
}

/// Per-request errors; never terminate the server
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("path escapes the root directory")]
    Forbidden,

    #[error("file not found")]
    NotFound,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RequestError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify a filesystem error by its kind
    pub fn from_fs(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory => Self::NotFound,
            _ => Self::Io(err),
        }
    }
}
