//! End-to-end tests: a real server on a loopback port, raw HTTP/1.1 over TCP.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use devserve::config::{LoggingConfig, PerformanceConfig};
use devserve::server::SignalHandler;
use devserve::{ServeError, Server, ServerConfig};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

struct RawResponse {
    status: u16,
    headers: HashMap<String, Vec<String>>,
    body: Vec<u8>,
}

impl RawResponse {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    fn header_count(&self, name: &str) -> usize {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map_or(0, Vec::len)
    }
}

struct TestServer {
    addr: SocketAddr,
    signals: Arc<SignalHandler>,
    task: JoinHandle<Result<(), ServeError>>,
    _root: TempDir,
}

impl TestServer {
    async fn stop(self) -> Result<(), ServeError> {
        self.signals.trigger();
        tokio::time::timeout(Duration::from_secs(10), self.task)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked")
    }
}

fn free_port() -> u16 {
    let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    probe.local_addr().unwrap().port()
}

/// Root layout mirroring a small web app under `./public`
fn public_dir() -> TempDir {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("app.mjs"), b"import './dep.mjs';\nconsole.log(1);\n").unwrap();
    std::fs::write(root.path().join("style.css"), b"body { margin: 0 }").unwrap();
    std::fs::create_dir(root.path().join("assets")).unwrap();
    std::fs::write(root.path().join("assets/logo.svg"), b"<svg/>").unwrap();
    root
}

async fn start(root: TempDir, configure: impl FnOnce(ServerConfig) -> ServerConfig) -> TestServer {
    let performance = PerformanceConfig {
        shutdown_grace: 1,
        ..PerformanceConfig::default()
    };
    start_with(root, configure, performance).await
}

async fn start_with(
    root: TempDir,
    configure: impl FnOnce(ServerConfig) -> ServerConfig,
    performance: PerformanceConfig,
) -> TestServer {
    let config = configure(
        ServerConfig::new(free_port(), root.path())
            .with_host("127.0.0.1")
            .with_mime_override(".mjs", "text/javascript"),
    );
    let logging = LoggingConfig {
        access_log: false,
        ..LoggingConfig::default()
    };

    let server = Server::bind_with(config, logging, performance).unwrap();
    let addr = server.local_addr();
    let signals = Arc::new(SignalHandler::new());
    let shutdown = Arc::clone(&signals.shutdown);
    let task = tokio::spawn(server.run(shutdown));

    TestServer {
        addr,
        signals,
        task,
        _root: root,
    }
}

async fn request(addr: SocketAddr, method: &str, target: &str) -> RawResponse {
    try_request(addr, method, target)
        .await
        .expect("connection closed without a response")
}

/// `None` when the server closes or resets the connection without answering
async fn try_request(addr: SocketAddr, method: &str, target: &str) -> Option<RawResponse> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let req = format!(
        "{method} {target} HTTP/1.1\r\nHost: localhost\r\nOrigin: http://example.test\r\nConnection: close\r\n\r\n"
    );
    stream.write_all(req.as_bytes()).await.ok()?;

    let mut raw = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut raw))
        .await
        .expect("response timed out")
        .ok()?;
    if raw.is_empty() {
        return None;
    }
    Some(parse_response(&raw))
}

fn parse_response(raw: &[u8]) -> RawResponse {
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("no header terminator");
    let head = std::str::from_utf8(&raw[..split]).unwrap();
    let body = raw[split + 4..].to_vec();

    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .unwrap()
        .parse()
        .unwrap();

    let mut headers: HashMap<String, Vec<String>> = HashMap::new();
    for line in lines {
        let (name, value) = line.split_once(':').unwrap();
        headers
            .entry(name.trim().to_ascii_lowercase())
            .or_default()
            .push(value.trim().to_string());
    }

    RawResponse {
        status,
        headers,
        body,
    }
}

fn assert_cors(response: &RawResponse) {
    for name in [
        "access-control-allow-origin",
        "access-control-allow-methods",
        "access-control-allow-headers",
    ] {
        assert_eq!(response.header_count(name), 1, "expected exactly one {name}");
    }
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
    assert_eq!(
        response.header("access-control-allow-methods"),
        Some("GET, POST, OPTIONS")
    );
    assert_eq!(
        response.header("access-control-allow-headers"),
        Some("Content-Type")
    );
}

#[tokio::test]
async fn get_mjs_returns_override_content_type() {
    let server = start(public_dir(), |c| c).await;

    let response = request(server.addr, "GET", "/app.mjs").await;
    assert_eq!(response.status, 200);
    assert_eq!(response.header("content-type"), Some("text/javascript"));
    assert_eq!(response.body, b"import './dep.mjs';\nconsole.log(1);\n");
    assert_cors(&response);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn missing_file_returns_404() {
    let server = start(public_dir(), |c| c).await;

    let response = request(server.addr, "GET", "/missing.html").await;
    assert_eq!(response.status, 404);
    assert_cors(&response);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn options_returns_empty_200() {
    let server = start(public_dir(), |c| c).await;

    let response = request(server.addr, "OPTIONS", "/anything").await;
    assert_eq!(response.status, 200);
    assert!(response.body.is_empty());
    assert_cors(&response);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn traversal_returns_403_without_content() {
    let server = start(public_dir(), |c| c).await;

    for target in ["/../../etc/passwd", "/%2e%2e/%2e%2e/etc/passwd", "/assets/../../secret"] {
        let response = request(server.addr, "GET", target).await;
        assert_eq!(response.status, 403, "{target}");
        assert_eq!(response.body, b"403 Forbidden");
        assert_cors(&response);
    }

    server.stop().await.unwrap();
}

#[tokio::test]
async fn every_method_gets_cors_headers() {
    let server = start(public_dir(), |c| c).await;

    for (method, target, status) in [
        ("GET", "/style.css", 200),
        ("HEAD", "/style.css", 200),
        ("OPTIONS", "/style.css", 200),
        ("POST", "/style.css", 501),
        ("DELETE", "/style.css", 501),
        ("GET", "/nope", 404),
        ("GET", "/assets", 301),
        ("GET", "/assets/", 200),
    ] {
        let response = request(server.addr, method, target).await;
        assert_eq!(response.status, status, "{method} {target}");
        assert_cors(&response);
    }

    server.stop().await.unwrap();
}

#[tokio::test]
async fn head_matches_get_without_body() {
    let server = start(public_dir(), |c| c).await;

    let get = request(server.addr, "GET", "/style.css").await;
    let head = request(server.addr, "HEAD", "/style.css").await;
    assert_eq!(head.status, 200);
    assert_eq!(head.header("content-length"), get.header("content-length"));
    assert_eq!(head.header("content-type"), Some("text/css"));
    assert!(head.body.is_empty());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn directory_listing_and_redirect() {
    let server = start(public_dir(), |c| c).await;

    let redirect = request(server.addr, "GET", "/assets").await;
    assert_eq!(redirect.status, 301);
    assert_eq!(redirect.header("location"), Some("/assets/"));

    let listing = request(server.addr, "GET", "/assets/").await;
    assert_eq!(listing.status, 200);
    let html = String::from_utf8(listing.body).unwrap();
    assert!(html.contains(r#"<a href="logo.svg">logo.svg</a>"#));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn custom_cors_lists_are_joined_in_order() {
    let server = start(public_dir(), |c| {
        c.with_cors_allowed_methods(["OPTIONS", "GET"])
            .with_cors_allowed_headers(["X-Requested-With", "Content-Type"])
    })
    .await;

    let response = request(server.addr, "OPTIONS", "/").await;
    assert_eq!(
        response.header("access-control-allow-methods"),
        Some("OPTIONS, GET")
    );
    assert_eq!(
        response.header("access-control-allow-headers"),
        Some("X-Requested-With, Content-Type")
    );

    server.stop().await.unwrap();
}

#[tokio::test]
async fn busy_port_is_reported() {
    let server = start(public_dir(), |c| c).await;
    let root = tempfile::tempdir().unwrap();

    let result = Server::bind(ServerConfig::new(server.addr.port(), root.path()).with_host("127.0.0.1"));
    assert!(matches!(result, Err(ServeError::PortInUse { .. })));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn shutdown_closes_listener() {
    let server = start(public_dir(), |c| c).await;
    let addr = server.addr;

    let response = request(addr, "GET", "/style.css").await;
    assert_eq!(response.status, 200);

    server.stop().await.unwrap();
    assert!(TcpStream::connect(addr).await.is_err());
}

#[cfg(unix)]
#[tokio::test]
async fn unreadable_file_returns_500_and_server_keeps_running() {
    use std::os::unix::fs::PermissionsExt;

    let root = public_dir();
    let locked = root.path().join("locked.js");
    std::fs::write(&locked, b"secret()").unwrap();
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
    if std::fs::read(&locked).is_ok() {
        // Permission bits are not enforced (running as root)
        return;
    }
    let server = start(root, |c| c).await;

    let response = request(server.addr, "GET", "/locked.js").await;
    assert_eq!(response.status, 500);
    assert_eq!(response.body, b"500 Internal Server Error");
    assert_cors(&response);

    let response = request(server.addr, "GET", "/style.css").await;
    assert_eq!(response.status, 200);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn connections_beyond_limit_are_dropped() {
    let performance = PerformanceConfig {
        shutdown_grace: 1,
        max_connections: Some(1),
        ..PerformanceConfig::default()
    };
    let server = start_with(public_dir(), |c| c, performance).await;

    // Idle connection occupying the only slot
    let held = TcpStream::connect(server.addr).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(try_request(server.addr, "GET", "/style.css").await.is_none());

    drop(held);
    let mut served = None;
    for _ in 0..20 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        served = try_request(server.addr, "GET", "/style.css").await;
        if served.is_some() {
            break;
        }
    }
    assert_eq!(served.expect("slot was never released").status, 200);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn idle_connection_is_closed_after_request_timeout() {
    let performance = PerformanceConfig {
        shutdown_grace: 1,
        request_timeout: 1,
        ..PerformanceConfig::default()
    };
    let server = start_with(public_dir(), |c| c, performance).await;

    let mut idle = TcpStream::connect(server.addr).await.unwrap();
    let started = std::time::Instant::now();
    let mut raw = Vec::new();
    let read = tokio::time::timeout(Duration::from_secs(5), idle.read_to_end(&mut raw))
        .await
        .expect("idle connection was not closed");

    assert!(read.is_err() || raw.is_empty());
    assert!(started.elapsed() >= Duration::from_millis(500));

    server.stop().await.unwrap();
}
