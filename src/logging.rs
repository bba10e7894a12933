//! File logger behind the `log` facade.
//!
//! The terminal is owned by the TUI, so records are appended to
//! `.branchflow/logs/branchflow.log` instead of stderr.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};

use crate::constants::{ENV_LOG, LOG_FILE, STORE_DIR};

pub struct FileLogger {
    level: LevelFilter,
    file: Mutex<File>,
}

impl FileLogger {
    pub fn open(path: &Path, level: LevelFilter) -> io::Result<Self> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { level, file: Mutex::new(file) })
    }
}

fn format_record(record: &Record) -> String {
    format!(
        "{} {:<5} [{}] {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        record.level(),
        record.target(),
        record.args()
    )
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record);
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Parse a level name; unknown or missing values mean `info`.
pub fn parse_level(value: Option<&str>) -> LevelFilter {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(LevelFilter::Info)
}

pub fn log_path() -> PathBuf {
    Path::new(STORE_DIR).join("logs").join(LOG_FILE)
}

/// Install the file logger. Failing to open the log file leaves logging disabled.
pub fn init() {
    let level = parse_level(std::env::var(ENV_LOG).ok().as_deref());
    let Ok(logger) = FileLogger::open(&log_path(), level) else {
        return;
    };
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use log::Level;

    use super::*;

    #[test]
    fn level_parsing() {
        assert_eq!(parse_level(None), LevelFilter::Info);
        assert_eq!(parse_level(Some("debug")), LevelFilter::Debug);
        assert_eq!(parse_level(Some(" WARN ")), LevelFilter::Warn);
        assert_eq!(parse_level(Some("chatty")), LevelFilter::Info);
        assert_eq!(parse_level(Some("off")), LevelFilter::Off);
    }

    #[test]
    fn writes_enabled_records_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("test.log");
        let logger = FileLogger::open(&path, LevelFilter::Info).unwrap();

        logger.log(&Record::builder().level(Level::Info).target("bf").args(format_args!("kept")).build());
        logger.log(&Record::builder().level(Level::Debug).target("bf").args(format_args!("dropped")).build());
        logger.flush();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("INFO  [bf] kept"));
        assert!(!content.contains("dropped"));
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.log");
        for msg in ["one", "two"] {
            let logger = FileLogger::open(&path, LevelFilter::Trace).unwrap();
            logger.log(&Record::builder().level(Level::Warn).target("t").args(format_args!("{}", msg)).build());
        }
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
