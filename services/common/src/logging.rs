use std::{
    fs, panic,
    path::{Path, PathBuf},
    thread,
    time::{Duration, SystemTime},
};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, writer::MakeWriterExt},
    layer::SubscriberExt,
    EnvFilter, Registry,
};

use crate::env::env_or;

const DEFAULT_LOG_DIR: &str = "logs";

/// Holds the file writer's flush guard. Keep it alive for the whole process.
pub struct TracingGuards {
    _file_guard: Option<WorkerGuard>,
}

/// Installs the global subscriber: errors to stderr, everything else to
/// stdout, plus a daily rolling file under `LOG_DIR/<service_name>` when that
/// directory is writable.
pub fn init_tracing(service_name: &str) -> TracingGuards {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = std::io::stderr
        .with_max_level(Level::ERROR)
        .or_else(std::io::stdout);
    let console_layer = fmt::layer().with_writer(console);

    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
    let log_root = PathBuf::from(log_dir).join(service_name);
    let mut file_guard = None;
    let mut file_layer = None;

    if fs::create_dir_all(&log_root).is_ok() {
        // The rolling appender panics if it cannot open its first file.
        let appender = panic::catch_unwind(|| {
            tracing_appender::rolling::daily(&log_root, format!("{service_name}.log"))
        })
        .ok();

        if let Some(appender) = appender {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            file_layer = Some(fmt::layer().with_ansi(false).with_writer(writer));
            file_guard = Some(guard);
        }
    }

    let subscriber = Registry::default()
        .with(filter)
        .with(console_layer)
        .with(file_layer);
    let _ = tracing::subscriber::set_global_default(subscriber);

    if file_guard.is_some() {
        let retention_days = env_or("LOG_RETENTION_DAYS", 14u64);
        let interval_minutes = env_or("LOG_CLEANUP_INTERVAL_MINUTES", 360u64);
        spawn_retention(log_root, retention_days, interval_minutes);
    }

    TracingGuards {
        _file_guard: file_guard,
    }
}

fn spawn_retention(log_root: PathBuf, retention_days: u64, interval_minutes: u64) {
    if retention_days == 0 || interval_minutes == 0 {
        return;
    }

    let retention = Duration::from_secs(retention_days * 24 * 60 * 60);
    let interval = Duration::from_secs(interval_minutes * 60);

    thread::spawn(move || loop {
        if let Some(cutoff) = SystemTime::now().checked_sub(retention) {
            let removed = prune_logs_older_than(&log_root, cutoff);
            if removed > 0 {
                tracing::debug!(removed, root = %log_root.display(), "pruned rolled log files");
            }
        }
        thread::sleep(interval);
    });
}

/// Deletes every file under `root` (recursively) last modified before
/// `cutoff`. Returns how many files were removed; unreadable entries are
/// skipped.
pub fn prune_logs_older_than(root: &Path, cutoff: SystemTime) -> usize {
    let Ok(entries) = fs::read_dir(root) else {
        return 0;
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            removed += prune_logs_older_than(&path, cutoff);
            continue;
        }
        let modified = fs::metadata(&path).and_then(|metadata| metadata.modified());
        match modified {
            Ok(modified) if modified < cutoff => {
                if fs::remove_file(&path).is_ok() {
                    removed += 1;
                }
            }
            _ => {}
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(path: &Path, modified: SystemTime) {
        let file = File::create(path).unwrap();
        file.set_modified(modified).unwrap();
    }

    #[test]
    fn prunes_only_stale_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("ingest-service");
        fs::create_dir_all(&nested).unwrap();

        let now = SystemTime::now();
        let old = now - Duration::from_secs(30 * 24 * 60 * 60);
        touch(&dir.path().join("fresh.log"), now);
        touch(&dir.path().join("stale.log"), old);
        touch(&nested.join("stale.log.2024-01-01"), old);

        let cutoff = now - Duration::from_secs(14 * 24 * 60 * 60);
        assert_eq!(prune_logs_older_than(dir.path(), cutoff), 2);
        assert!(dir.path().join("fresh.log").exists());
        assert!(!dir.path().join("stale.log").exists());
        assert!(nested.exists());
    }

    #[test]
    fn missing_root_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(prune_logs_older_than(&missing, SystemTime::now()), 0);
    }
}
