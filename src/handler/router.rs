//! Request dispatch module
//!
//! Entry point for HTTP request processing: method dispatch, CORS
//! finalization and access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{REFERER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
///
/// Owns everything it needs so the request body is never held across an await.
pub struct RequestContext {
    pub method: Method,
    /// Raw (still percent-encoded) URI path
    pub path: String,
    pub query: Option<String>,
    pub version: Version,
    pub is_head: bool,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let header = |name: hyper::header::HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(ToString::to_string),
            version: req.version(),
            is_head: req.method() == Method::HEAD,
            referer: header(REFERER),
            user_agent: header(USER_AGENT),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// Every response passes through `CorsPolicy::apply` before it is returned.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext::from_request(&req);
    drop(req);

    let mut response = dispatch(&ctx, &state).await;
    state.cors.apply(&mut response);

    if state.logging.access_log {
        log_access(&ctx, &response, &state, remote_addr, started);
    }

    Ok(response)
}

/// Dispatch by method
async fn dispatch(ctx: &RequestContext, state: &AppState) -> Response<Full<Bytes>> {
    match ctx.method {
        // Preflight: never touches the filesystem
        Method::OPTIONS => http::build_options_response(),
        Method::GET | Method::HEAD => static_files::serve(ctx, state).await,
        _ => {
            logger::log_warning(&format!("Method not implemented: {}", ctx.method));
            http::build_501_response()
        }
    }
}

fn log_access(
    ctx: &RequestContext,
    response: &Response<Full<Bytes>>,
    state: &AppState,
    remote_addr: SocketAddr,
    started: Instant,
) {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        ctx.method.to_string(),
        ctx.path.clone(),
    );
    entry.query.clone_from(&ctx.query);
    entry.http_version = version_label(ctx.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer.clone_from(&ctx.referer);
    entry.user_agent.clone_from(&ctx.user_agent);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.logging.access_log_format);
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
