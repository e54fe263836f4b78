//! File logging for the CLI.
//!
//! Logs go to `<log_path>/field-filter.<date>`, one file per day. Files older
//! than [`LOG_RETENTION`] are pruned once the subscriber is installed, so
//! pruning failures end up in the new log.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use time::macros::format_description;
use tracing::{debug, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Prefix of rotated log file names.
const LOG_FILE_PREFIX: &str = "field-filter";

/// Rotated logs older than this are removed at startup.
const LOG_RETENTION: Duration = Duration::from_secs(2 * 24 * 60 * 60);

/// Install the global file subscriber, then prune expired logs.
pub fn init(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.log_path).with_context(|| {
        format!(
            "Failed to create log directory: {}",
            config.log_path.display()
        )
    })?;

    let file_appender =
        RollingFileAppender::new(Rotation::DAILY, &config.log_path, LOG_FILE_PREFIX);

    let time_format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let local_offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let timer = OffsetTime::new(local_offset, time_format);

    // Debug by default; RUST_LOG adds per-target directives
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(timer),
        );

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    let removed = cleanup_old_logs(&config.log_path, SystemTime::now())?;
    if removed > 0 {
        debug!(removed, "Pruned expired log files");
    }

    Ok(())
}

/// Remove this crate's log files last modified before `now - LOG_RETENTION`.
///
/// Returns how many files were removed. A file that cannot be removed is
/// logged and skipped.
pub fn cleanup_old_logs(log_path: &Path, now: SystemTime) -> Result<usize> {
    if !log_path.is_dir() {
        return Ok(0);
    }
    let cutoff = now.checked_sub(LOG_RETENTION).unwrap_or(SystemTime::UNIX_EPOCH);

    let mut removed = 0;
    for path in expired_logs(log_path, cutoff)? {
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove old log file"),
        }
    }

    Ok(removed)
}

fn expired_logs(log_path: &Path, cutoff: SystemTime) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(log_path)
        .with_context(|| format!("Failed to read log directory: {}", log_path.display()))?;

    let mut expired = Vec::new();
    for entry in entries {
        let entry = entry?;
        let is_ours = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX));
        if !is_ours {
            continue;
        }

        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let stale = metadata.is_file()
            && metadata.modified().is_ok_and(|modified| modified < cutoff);
        if stale {
            expired.push(entry.path());
        }
    }

    Ok(expired)
}
