//! Static file serving module
//!
//! Resolves request paths against the root directory, loads files and
//! directory indexes, and maps failures to error responses.

use crate::config::AppState;
use crate::error::RequestError;
use crate::handler::listing;
use crate::handler::router::RequestContext;
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Outcome of resolving a GET/HEAD request
#[derive(Debug)]
enum Resolved {
    File {
        content: Vec<u8>,
        content_type: String,
    },
    Listing(String),
    Redirect(String),
}

/// Serve a GET/HEAD request from the root directory
pub async fn serve(ctx: &RequestContext, state: &AppState) -> Response<Full<Bytes>> {
    match resolve(ctx, state).await {
        Ok(Resolved::File {
            content,
            content_type,
        }) => http::build_file_response(Bytes::from(content), &content_type, ctx.is_head),
        Ok(Resolved::Listing(html)) => http::build_html_response(html, ctx.is_head),
        Ok(Resolved::Redirect(location)) => http::build_redirect_response(&location),
        Err(err) => {
            match &err {
                RequestError::Forbidden => logger::log_warning(&format!(
                    "Forbidden request path blocked: {}",
                    ctx.path
                )),
                RequestError::NotFound => {
                    logger::log_debug(&format!("Not found: {}", ctx.path));
                }
                RequestError::Io(e) => {
                    logger::log_error(&format!("Failed to serve '{}': {e}", ctx.path));
                }
            }
            http::build_error_response(err.status())
        }
    }
}

async fn resolve(ctx: &RequestContext, state: &AppState) -> Result<Resolved, RequestError> {
    let requested = resolve_request_path(&state.root, &ctx.path)?;
    let canonical = ensure_within_root(&requested, &state.root).await?;
    let metadata = fs::metadata(&canonical)
        .await
        .map_err(RequestError::from_fs)?;

    if !metadata.is_dir() {
        return load_file(&canonical, &requested, state).await;
    }

    if !ctx.path.ends_with('/') {
        return Ok(Resolved::Redirect(directory_location(
            &ctx.path,
            ctx.query.as_deref(),
        )));
    }

    for index_file in &state.server.index_files {
        let index_path = requested.join(index_file);
        let canonical_index = match ensure_within_root(&index_path, &state.root).await {
            Ok(canonical_index) => canonical_index,
            Err(RequestError::NotFound) => continue,
            Err(e) => return Err(e),
        };
        match fs::metadata(&canonical_index).await {
            Ok(meta) if meta.is_file() => {
                return load_file(&canonical_index, &index_path, state).await;
            }
            Ok(_) => {}
            Err(e) => match RequestError::from_fs(e) {
                RequestError::NotFound => {}
                err => return Err(err),
            },
        }
    }

    if !state.server.directory_listing {
        return Err(RequestError::Forbidden);
    }
    let html = listing::render(&canonical, &ctx.path).await?;
    Ok(Resolved::Listing(html))
}

/// Redirect target for a directory requested without its trailing slash
///
/// Leading slashes collapse to one, so `//host/..` cannot turn into a
/// protocol-relative `Location` pointing at another host.
fn directory_location(path: &str, query: Option<&str>) -> String {
    let location = format!("/{}/", path.trim_start_matches('/'));
    match query {
        Some(q) => format!("{location}?{q}"),
        None => location,
    }
}

/// Read a file; the Content-Type comes from the requested name, not the link target
async fn load_file(
    canonical: &Path,
    requested: &Path,
    state: &AppState,
) -> Result<Resolved, RequestError> {
    let content = fs::read(canonical).await.map_err(RequestError::from_fs)?;
    let content_type = state.mime.resolve(requested).to_string();
    Ok(Resolved::File {
        content,
        content_type,
    })
}

/// Map a raw URI path onto the root directory without touching the filesystem
///
/// The path is percent-decoded, `.` and empty segments are dropped and `..`
/// pops a segment. Climbing above the root is `Forbidden`.
pub fn resolve_request_path(root: &Path, url_path: &str) -> Result<PathBuf, RequestError> {
    let decoded = urlencoding::decode(url_path).map_err(|_| RequestError::Forbidden)?;

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(RequestError::Forbidden);
                }
            }
            s if s.contains(['\\', '\0']) || (cfg!(windows) && s.contains(':')) => {
                return Err(RequestError::Forbidden);
            }
            s => segments.push(s),
        }
    }

    Ok(segments
        .iter()
        .fold(root.to_path_buf(), |path, segment| path.join(segment)))
}

/// Canonicalize and reject anything (e.g. symlinks) escaping the canonical root
async fn ensure_within_root(path: &Path, root: &Path) -> Result<PathBuf, RequestError> {
    let canonical = fs::canonicalize(path)
        .await
        .map_err(RequestError::from_fs)?;
    if canonical.starts_with(root) {
        Ok(canonical)
    } else {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path.display(),
            canonical.display()
        ));
        Err(RequestError::Forbidden)
    }
}
