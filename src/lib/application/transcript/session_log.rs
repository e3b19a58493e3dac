use super::error::TranscriptError;
use crate::domain::LogRecord;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Accumulated log records of one session and the file they are saved to.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
    records: Vec<LogRecord>,
}

impl SessionLog {
    /// Names the file after the session start, e.g. `session_20250101_093000.json`.
    pub fn start(dir: impl AsRef<Path>, started_at: DateTime<Local>) -> Self {
        let file_name = format!("session_{}.json", started_at.format("%Y%m%d_%H%M%S"));
        Self::at(dir.as_ref().join(file_name))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn push(&mut self, record: LogRecord) {
        self.records.push(record);
    }

    /// Rewrites the whole file with every record collected so far.
    pub fn persist(&self) -> Result<(), TranscriptError> {
        let io_error = |source| TranscriptError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_error)?;
        }

        let encoded =
            serde_json::to_string_pretty(&self.records).map_err(|source| TranscriptError::Json {
                path: self.path.clone(),
                source,
            })?;

        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, encoded).map_err(io_error)?;
        fs::rename(&staging, &self.path).map_err(io_error)?;

        debug!(
            path = %self.path.display(),
            records = self.records.len(),
            "Session log written"
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Vec<LogRecord>, TranscriptError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| TranscriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| TranscriptError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LogRecord, ToolStatus};
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[test]
    fn file_name_follows_session_start() {
        let started = Local
            .with_ymd_and_hms(2025, 3, 7, 9, 5, 1)
            .single()
            .expect("valid time");
        let log = SessionLog::start("logs", started);
        assert_eq!(log.path(), Path::new("logs/session_20250307_090501.json"));
    }

    #[test]
    fn persisted_records_round_trip() {
        let dir = tempdir().expect("tempdir");
        let mut log = SessionLog::at(dir.path().join("nested").join("session.json"));
        log.push(LogRecord::user("what's (3 + 5) x 12?"));
        log.push(LogRecord::tool("add", "8", ToolStatus::Success));
        log.push(LogRecord::assistant("96"));
        log.persist().expect("persist");

        let loaded = SessionLog::load(log.path()).expect("load");
        assert_eq!(loaded, log.records());
    }

    #[test]
    fn persist_rewrites_the_whole_file() {
        let dir = tempdir().expect("tempdir");
        let mut log = SessionLog::at(dir.path().join("session.json"));
        log.push(LogRecord::user("one"));
        log.persist().expect("first persist");
        log.push(LogRecord::user("two"));
        log.persist().expect("second persist");

        let loaded = SessionLog::load(log.path()).expect("load");
        assert_eq!(loaded.len(), 2);
        assert!(!dir.path().join("session.json.tmp").exists());
    }

    #[test]
    fn non_ascii_is_kept_literally() {
        let dir = tempdir().expect("tempdir");
        let mut log = SessionLog::at(dir.path().join("session.json"));
        log.push(LogRecord::assistant("✅ Fichier écrit"));
        log.persist().expect("persist");

        let raw = fs::read_to_string(log.path()).expect("read");
        assert!(raw.contains("✅ Fichier écrit"));
        assert!(raw.contains("\n  {"));
    }

    #[test]
    fn persist_reports_unwritable_location() {
        let dir = tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").expect("write blocker");

        let log = SessionLog::at(blocker.join("session.json"));
        assert!(matches!(log.persist(), Err(TranscriptError::Io { .. })));
    }
}
