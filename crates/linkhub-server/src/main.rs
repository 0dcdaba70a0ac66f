//! LinkHub - a personal link dashboard served over HTTP.
//!
//! Links live in `public/data/links.txt`, users in `data/users.txt`, and
//! uploaded icons in `public/images/`, all under `LINKHUB_ROOT`.

use std::io;
use std::path::Path;

use anyhow::Result;
use linkhub_core::Config;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Base name of the rolling log file in `LINKHUB_LOG_DIR`
const LOG_FILE_NAME: &str = "linkhub.log";

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes the log file on drop and must live until exit.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    let _log_guard = init_tracing(config.log_dir.as_deref());
    info!("LinkHub starting");

    linkhub_server::run(config).await
}
