//! HTTP protocol layer module
//!
//! Content-type resolution, CORS finalization and response builders,
//! decoupled from filesystem handling.

pub mod cors;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use cors::CorsPolicy;
pub use mime::MimeResolver;
pub use response::{
    build_501_response, build_error_response, build_file_response, build_html_response,
    build_options_response, build_redirect_response,
};
