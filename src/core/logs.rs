//! Per-run log files.
//!
//! Each run writes to `logs/deployer_<YYYYmmdd_HHMMSS>.log` and mirrors every
//! record to stdout. Older files are pruned so only the most recent
//! [`LOG_RETENTION`] remain.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{Error, Result};

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE_PREFIX: &str = "deployer_";
pub const LOG_RETENTION: usize = 10;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// File name for a run started at `started`.
pub fn log_file_name(started: DateTime<Local>) -> String {
    format!("{}{}.log", LOG_FILE_PREFIX, started.format("%Y%m%d_%H%M%S"))
}

/// Log sink for a single run.
///
/// Installs a tracing subscriber for the current thread that writes to the
/// run's log file and, when `echo` is set, to stdout. Only the stdout copy
/// may carry ANSI codes, and only when `ansi` is set. The subscriber stays
/// active until the `RunLog` is dropped.
pub struct RunLog {
    dir: PathBuf,
    path: PathBuf,
    _guard: DefaultGuard,
}

impl RunLog {
    pub fn open(dir: &Path, started: DateTime<Local>, echo: bool, ansi: bool) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("create {}", dir.display())))
        })?;

        let path = dir.join(log_file_name(started));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                Error::internal_io(e.to_string(), Some(format!("open {}", path.display())))
            })?;

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let file_layer = fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
            .with_writer(Mutex::new(file));

        let stdout_layer = echo.then(|| {
            fmt::layer()
                .with_target(false)
                .with_ansi(ansi)
                .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
                .with_writer(std::io::stdout)
        });

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(stdout_layer);

        let guard = tracing::subscriber::set_default(subscriber);

        Ok(Self {
            dir: dir.to_path_buf(),
            path,
            _guard: guard,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Delete all but the `keep` most recently modified run logs in `dir`.
///
/// Only files matching `deployer_*.log` are considered. Returns the deleted
/// paths, newest first.
pub fn clean_old_logs(dir: &Path, keep: usize) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/{}*.log",
        glob::Pattern::escape(&dir.to_string_lossy()),
        LOG_FILE_PREFIX
    );
    let entries = glob::glob(&pattern)
        .map_err(|e| Error::internal_io(e.to_string(), Some("list log files".to_string())))?;

    let mut logs: Vec<(PathBuf, SystemTime)> = entries
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
            Some((path, modified))
        })
        .collect();

    logs.sort_by(|a, b| b.1.cmp(&a.1));

    let mut deleted = Vec::new();
    for (path, _) in logs.into_iter().skip(keep) {
        match fs::remove_file(&path) {
            Ok(()) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                tracing::info!("Deleted old log: {}", name);
                deleted.push(path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::internal_io(
                    e.to_string(),
                    Some(format!("delete {}", path.display())),
                ));
            }
        }
    }

    Ok(deleted)
}
