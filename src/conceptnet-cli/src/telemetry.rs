//! Tracing setup for the command line tool
//!
//! Provides structured tracing with:
//! - Human-readable console output on stderr
//! - Optional JSON formatted logs to file
//! - Size-based rotation (10MB per file)
//! - Daily rotation with numbered files

use anyhow::Result;
use rolling_file::{RollingConditionBasic, RollingFileAppender};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize tracing, writing JSON logs under `log_dir` when given
///
/// Returns a guard that must be kept alive to ensure file logs are flushed
pub fn init_telemetry(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Environment filter for log levels
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("conceptnet=info,conceptnet_rs=info,conceptnet_core=info")
    });

    // Console layer for human-readable output, kept off stdout
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;

            // Format: conceptnet.log.2026-02-04, rotated at 10MB or daily
            let file_appender = RollingFileAppender::new(
                dir.join("conceptnet.log"),
                RollingConditionBasic::new()
                    .daily()
                    .max_size(10 * 1024 * 1024), // 10 MB
                9, // Keep up to 10 files per day (0-9)
            )?;
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    if let Some(dir) = log_dir {
        tracing::debug!("File logging to {:?}", dir);
    }

    Ok(guard)
}
