use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use devserve::config::Config;
use devserve::error::ServeError;
use devserve::logger;
use devserve::server::{self, Server, SignalHandler};

/// Delay between binding and launching the browser
const BROWSER_DELAY: Duration = Duration::from_millis(500);

fn main() -> ExitCode {
    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("[ERROR] Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logger::init(&cfg) {
        eprintln!("[ERROR] Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    // 创建 Tokio 运行时，根据 workers 配置设置线程数
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = match runtime_builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            logger::log_error(&format!("Failed to build Tokio runtime: {e}"));
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(async_main(cfg)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(ServeError::PortInUse { addr }) => {
            logger::log_error(&format!(
                "Port {} is already in use ({addr}). Stop the other process or choose another port.",
                addr.port()
            ));
            ExitCode::FAILURE
        }
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn async_main(cfg: Config) -> Result<(), ServeError> {
    let open_browser = cfg.server.open_browser;
    let mut server = Server::from_config(cfg)?;
    if open_browser {
        server = server.with_post_start_hook(server::browser_hook(BROWSER_DELAY));
    }

    let signals = Arc::new(SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    server.run(Arc::clone(&signals.shutdown)).await
}
