//! devserve: a development static file server
//!
//! Serves a directory over HTTP/1.1 with permissive CORS headers on every
//! response and configurable MIME-type overrides.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::{Config, ServerConfig};
pub use error::{RequestError, ServeError};
pub use server::Server;
