use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Keeps the run's log file open. Dropping it flushes pending lines.
pub struct RunLog {
    pub path: PathBuf,
    _guard: WorkerGuard,
}

/// One file per run, `log_<timestamp>.txt` under `log_dir`. Warnings and
/// errors are echoed to stderr as well.
pub fn init(log_dir: &Path) -> Result<RunLog> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_name = log_file_name(Local::now());
    let appender = tracing_appender::rolling::never(log_dir, &file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(RunLog {
        path: log_dir.join(file_name),
        _guard: guard,
    })
}

fn log_file_name(now: chrono::DateTime<Local>) -> String {
    format!("log_{}.txt", now.format("%Y-%m-%dT%H-%M-%S"))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_is_timestamped() {
        let now = Local.with_ymd_and_hms(2024, 1, 15, 14, 5, 7).unwrap();
        assert_eq!(log_file_name(now), "log_2024-01-15T14-05-07.txt");
    }
}
