//! Post-start hooks
//!
//! A hook runs once, after the listener is bound and before the first accept.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::logger;

/// One-shot callback receiving the bound address
pub type PostStartHook = Box<dyn FnOnce(SocketAddr) + Send + 'static>;

/// Hook that opens the served URL in the default browser after `delay`
///
/// Must be invoked from within a Tokio runtime. Failure to launch the
/// browser is logged and otherwise ignored.
pub fn browser_hook(delay: Duration) -> PostStartHook {
    Box::new(move |addr| {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let url = browser_url(addr);
            let target = url.clone();
            match tokio::task::spawn_blocking(move || open::that(target)).await {
                Ok(Ok(())) => logger::log_info(&format!("Opened {url} in the browser")),
                Ok(Err(e)) => logger::log_warning(&format!(
                    "Failed to open browser: {e}. Please navigate to {url} manually."
                )),
                Err(e) => logger::log_warning(&format!("Browser launch task failed: {e}")),
            }
        });
    })
}

/// URL a local browser can reach; wildcard binds are shown as `localhost`
pub fn browser_url(addr: SocketAddr) -> String {
    if addr.ip().is_unspecified() {
        return format!("http://localhost:{}/", addr.port());
    }
    match addr.ip() {
        IpAddr::V4(ip) => format!("http://{ip}:{}/", addr.port()),
        IpAddr::V6(ip) => format!("http://[{ip}]:{}/", addr.port()),
    }
}
