//! Directory listing page for directories without an index file

use crate::error::RequestError;
use std::fmt::Write;
use std::path::Path;
use tokio::fs;

/// Render an HTML listing of `dir`, entries sorted by name
///
/// `url_path` is the raw request path, used for the page title only.
pub async fn render(dir: &Path, url_path: &str) -> Result<String, RequestError> {
    let mut entries = Vec::new();
    let mut read_dir = fs::read_dir(dir).await.map_err(RequestError::from_fs)?;
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().await.is_ok_and(|t| t.is_dir());
        entries.push((name, is_dir));
    }
    entries.sort();

    let title = escape_html(&format!(
        "Directory listing for {}",
        urlencoding::decode(url_path).unwrap_or_else(|_| url_path.into())
    ));

    let mut html = String::with_capacity(256 + entries.len() * 64);
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<hr>\n<ul>\n"
    );
    for (name, is_dir) in &entries {
        let slash = if *is_dir { "/" } else { "" };
        let _ = writeln!(
            html,
            "<li><a href=\"{}{slash}\">{}{slash}</a></li>",
            urlencoding::encode(name),
            escape_html(name),
        );
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");

    Ok(html)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
