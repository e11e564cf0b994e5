//! CORS header finalization
//!
//! Every response leaves the server through `CorsPolicy::apply`.

use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use hyper::Response;

use crate::config::ServerConfig;
use crate::logger;

/// Pre-rendered values of the three CORS response headers
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
}

impl CorsPolicy {
    pub fn new(methods: &[String], headers: &[String]) -> Self {
        Self {
            allow_methods: header_value(&methods.join(", ")),
            allow_headers: header_value(&headers.join(", ")),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(&config.cors_allowed_methods, &config.cors_allowed_headers)
    }

    /// Set the CORS headers, replacing any existing values
    pub fn apply<B>(&self, response: &mut Response<B>) {
        let headers = response.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
    }
}

fn header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|e| {
        logger::log_warning(&format!("Invalid CORS header value '{value}': {e}"));
        HeaderValue::from_static("")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_sets_three_headers() {
        let policy = CorsPolicy::new(
            &["GET".to_string(), "OPTIONS".to_string()],
            &["Content-Type".to_string(), "Range".to_string()],
        );
        let mut response = Response::new(());
        policy.apply(&mut response);

        let headers = response.headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type, Range");
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn test_apply_replaces_existing_values() {
        let policy = CorsPolicy::new(&["GET".to_string()], &[]);
        let mut response = Response::builder()
            .header(ACCESS_CONTROL_ALLOW_ORIGIN, "https://example.com")
            .header(ACCESS_CONTROL_ALLOW_ORIGIN, "https://other.example")
            .body(())
            .unwrap();
        policy.apply(&mut response);

        let origins: Vec<&str> = response
            .headers()
            .get_all(ACCESS_CONTROL_ALLOW_ORIGIN)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        assert_eq!(origins, vec!["*"]);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_HEADERS], "");
    }
}
