//! Forward log entries from FIFOs to stdout
//!
//! Run with: cargo run --example stdout_driver <FIFO>...
//!
//! Each FIFO is registered as its own stream, using the file name as the
//! container id. Entries are printed as
//! `<container id>: [<source>] [<timestamp nanos>] <line>`.
//!
//! Example:
//!   mkfifo /tmp/app.fifo
//!   cargo run --example stdout_driver /tmp/app.fifo
//!
//! Then attach a writer that emits length-prefixed `LogEntry` frames.
//!
//! Set `RUST_LOG=fifo_log_driver=debug` for per-frame diagnostics.

use std::path::Path;
use std::sync::Arc;

use fifo_log_driver::driver::api::StartLoggingRequest;
use fifo_log_driver::{ContainerInfo, ForwarderConfig, LogDriver, WriterSink};

fn print_usage() {
    eprintln!("Usage: stdout_driver <FIFO>...");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  stdout_driver /tmp/app.fifo");
    eprintln!("  stdout_driver /tmp/web.fifo /tmp/db.fifo");
}

fn container_id(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let fifos: Vec<String> = std::env::args().skip(1).collect();

    if fifos.is_empty() || fifos.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fifo_log_driver=info".parse()?)
                .add_directive("stdout_driver=info".parse()?),
        )
        .init();

    let config = ForwarderConfig::default().resync_threshold(4);
    let driver = Arc::new(LogDriver::with_config(
        WriterSink::stdout(),
        fifo_log_driver::FifoOpener,
        config,
    ));

    // Opening blocks until a writer attaches, so each FIFO starts on its own task
    for file in fifos {
        let driver = Arc::clone(&driver);
        tokio::spawn(async move {
            let req = StartLoggingRequest {
                info: ContainerInfo::new(container_id(&file)),
                file: file.clone(),
            };
            match driver.start_logging(req).await {
                Ok(handle) => match handle.await {
                    Ok(exit) => tracing::info!(file = %file, exit = ?exit, "Stream finished"),
                    Err(e) => tracing::warn!(file = %file, error = %e, "Forwarding task failed"),
                },
                Err(e) => tracing::error!(file = %file, error = %e, "Start logging failed"),
            }
        });
    }

    tokio::signal::ctrl_c().await?;
    eprintln!("\nShutting down...");

    for id in driver.registry().stream_ids().await {
        if let Some(stats) = driver.registry().stream_stats(id.as_str()).await {
            eprintln!(
                "{}: entries={} bytes={} framing_errors={} rate={:.1}/s",
                id,
                stats.entries_forwarded,
                stats.bytes_forwarded,
                stats.framing_errors,
                stats.entry_rate()
            );
        }
    }

    driver.shutdown().await;
    Ok(())
}
