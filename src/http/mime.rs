//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension,
//! with configured overrides taking precedence over the built-in table.

use std::collections::HashMap;
use std::path::Path;

/// Get MIME Content-Type based on file extension
///
/// # Examples
/// ```
/// use devserve::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("html")), "text/html; charset=utf-8");
/// assert_eq!(get_content_type(Some("mp4")), "video/mp4");
/// assert_eq!(get_content_type(None), "application/octet-stream");
/// ```
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        // Text
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("txt" | "md") => "text/plain; charset=utf-8",
        Some("csv") => "text/csv",
        Some("xml") => "application/xml",

        // JavaScript/WASM
        Some("js" | "mjs") => "application/javascript",
        Some("json" | "map") => "application/json",
        Some("wasm") => "application/wasm",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",

        // Video
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("ogg" | "ogv") => "video/ogg",
        Some("mov") => "video/quicktime",

        // Audio
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("m4a") => "audio/mp4",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        // Documents
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz" | "gzip") => "application/gzip",
        Some("tar") => "application/x-tar",

        // Default
        _ => "application/octet-stream",
    }
}

/// Content-type resolver combining overrides with the default guesser
#[derive(Debug, Clone, Default)]
pub struct MimeResolver {
    /// Lowercased extension without leading dot -> Content-Type
    overrides: HashMap<String, String>,
}

impl MimeResolver {
    /// Build from override keys like `.mjs` or `mjs`
    pub fn new(overrides: &HashMap<String, String>) -> Self {
        let overrides = overrides
            .iter()
            .map(|(ext, content_type)| (normalize_extension(ext), content_type.clone()))
            .collect();
        Self { overrides }
    }

    /// Resolve the Content-Type for a file path
    pub fn resolve(&self, path: &Path) -> &str {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        if let Some(content_type) = extension
            .as_deref()
            .and_then(|ext| self.overrides.get(ext))
        {
            return content_type;
        }
        get_content_type(extension.as_deref())
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(get_content_type(Some("html")), "text/html; charset=utf-8");
        assert_eq!(get_content_type(Some("css")), "text/css");
        assert_eq!(get_content_type(Some("js")), "application/javascript");
        assert_eq!(get_content_type(Some("json")), "application/json");
        assert_eq!(get_content_type(Some("png")), "image/png");
        assert_eq!(get_content_type(Some("mp4")), "video/mp4");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(get_content_type(Some("xyz")), "application/octet-stream");
        assert_eq!(get_content_type(None), "application/octet-stream");
    }

    #[test]
    fn test_override_takes_precedence() {
        let overrides = HashMap::from([(".mjs".to_string(), "text/javascript".to_string())]);
        let resolver = MimeResolver::new(&overrides);
        assert_eq!(resolver.resolve(Path::new("public/app.mjs")), "text/javascript");
        // Non-overridden extensions still use the default table
        assert_eq!(resolver.resolve(Path::new("app.js")), "application/javascript");
    }

    #[test]
    fn test_override_key_normalization() {
        let overrides = HashMap::from([
            ("WASM".to_string(), "application/x-custom-wasm".to_string()),
            (".data".to_string(), "application/x-game-data".to_string()),
        ]);
        let resolver = MimeResolver::new(&overrides);
        assert_eq!(resolver.resolve(Path::new("mod.wasm")), "application/x-custom-wasm");
        assert_eq!(resolver.resolve(Path::new("LEVEL.DATA")), "application/x-game-data");
    }

    #[test]
    fn test_no_extension() {
        let resolver = MimeResolver::default();
        assert_eq!(resolver.resolve(Path::new("Makefile")), "application/octet-stream");
        assert_eq!(resolver.resolve(Path::new("INDEX.HTML")), "text/html; charset=utf-8");
    }
}
