use anyhow::Result;
use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// Pick the filter from CLI flags, falling back to RUST_LOG and then the
/// configured level.
fn build_filter(verbose_level: u8, quiet: bool, default_level: &str) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    let fallback = match verbose_level {
        0 => default_level,
        // -v: debug, but keep hyper's connection chatter out
        1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

pub fn init_logging_with_file(
    verbose_level: u8,
    quiet: bool,
    default_level: &str,
    log_file: Option<PathBuf>,
) -> Result<()> {
    let filter = build_filter(verbose_level, quiet, default_level);

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal());

    let stderr_layer = if json {
        fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr)
            .boxed()
    };

    let file_layer = match log_file {
        Some(log_path) => {
            let log_dir = log_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            std::fs::create_dir_all(&log_dir)?;

            let log_filename = log_path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow::anyhow!("Invalid log filename: {}", log_path.display()))?;

            // Rotation prefix drops the extension: traktboxd.log -> traktboxd.2026-01-17
            let log_prefix = log_filename.rsplit_once('.').map_or(log_filename, |(stem, _)| stem);

            let appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, log_prefix);
            Some(
                fmt::layer()
                    .json()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(appender)
                    .boxed(),
            )
        }
        None => None,
    };

    Registry::default()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
