//! Audit log of constructed queries.
//!
//! # Design
//! Construction produces a `LogEntry`; where it goes is decided by the
//! `QueryLog` the caller injects. `FileLog` appends one text line per entry,
//! `MemoryLog` keeps entries around for tests and embedding. Every recorded
//! entry is also emitted as a tracing event.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::config::QueryConfig;
use crate::error::{QueryError, Result};
use crate::http::{DisplayHeaders, Headers};
use crate::query::Payload;

/// One audit record, produced once per constructed query.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub uri: String,
    pub headers: Headers,
    pub payload: Option<Payload>,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} {} headers={} payload=",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.id,
            self.method.escape_debug(),
            self.uri.escape_debug(),
            DisplayHeaders(&self.headers)
        )?;
        match &self.payload {
            Some(payload) => write!(f, "{payload}"),
            None => write!(f, "-"),
        }
    }
}

/// Sink for construction-time audit records.
pub trait QueryLog {
    fn record(&self, entry: &LogEntry) -> Result<()>;
}

impl<L: QueryLog + ?Sized> QueryLog for &L {
    fn record(&self, entry: &LogEntry) -> Result<()> {
        (**self).record(entry)
    }
}

/// Appends entries to a file, one line each.
#[derive(Debug, Clone)]
pub struct FileLog {
    path: PathBuf,
}

impl FileLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open the log named by the configured `log_file`.
    pub fn from_config(config: &QueryConfig) -> Result<Self> {
        Ok(Self::new(config.log_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{line}")
    }
}

impl QueryLog for FileLog {
    fn record(&self, entry: &LogEntry) -> Result<()> {
        self.append(&entry.to_string()).map_err(|source| QueryError::Log {
            path: self.path.clone(),
            source,
        })?;
        trace_entry(entry);
        Ok(())
    }
}

/// Keeps entries in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl QueryLog for MemoryLog {
    fn record(&self, entry: &LogEntry) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry.clone());
        trace_entry(entry);
        Ok(())
    }
}

fn trace_entry(entry: &LogEntry) {
    tracing::info!(
        query_id = %entry.id,
        method = %entry.method,
        uri = %entry.uri,
        headers = ?entry.headers,
        "query constructed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry() -> LogEntry {
        let mut headers = Headers::new();
        headers.insert("accept".to_string(), "application/json".to_string());
        headers.insert("limit".to_string(), "25".to_string());
        LogEntry {
            id: Uuid::nil(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            method: "GET".to_string(),
            uri: "/rest/api/content".to_string(),
            headers,
            payload: None,
        }
    }

    #[test]
    fn entry_renders_single_line() {
        assert_eq!(
            entry().to_string(),
            "[2024-01-02T03:04:05.000Z] 00000000-0000-0000-0000-000000000000 GET /rest/api/content \
             headers={accept=application/json, limit=25} payload=-"
        );
    }

    #[test]
    fn entry_renders_encoded_payload() {
        let mut e = entry();
        e.method = "POST".to_string();
        e.payload = Some(Payload::Encoded(r#"{"title":"x"}"#.to_string()));
        assert!(e.to_string().ends_with(r#"payload={"title":"x"}"#));
    }

    #[test]
    fn entry_escapes_line_breaks() {
        let mut e = entry();
        e.uri = "/a\n[2099-01-01T00:00:00.000Z] forged GET /b".to_string();
        e.headers.insert("x".to_string(), "1\r\n2".to_string());

        let line = e.to_string();
        assert_eq!(line.lines().count(), 1);
        assert!(line.contains(r"GET /a\n[2099-01-01T00:00:00.000Z] forged GET /b headers="));
        assert!(line.contains(r"x=1\r\n2"));
    }

    #[test]
    fn memory_log_keeps_entries() {
        let log = MemoryLog::new();
        log.record(&entry()).unwrap();
        log.record(&entry()).unwrap();
        assert_eq!(log.entries().len(), 2);
    }

    #[test]
    fn file_log_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileLog::new(dir.path().join("nested/queries.log"));
        log.record(&entry()).unwrap();
        log.record(&entry()).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("GET /rest/api/content"));
    }

    #[test]
    fn file_log_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let log = FileLog::new(dir.path());
        let err = log.record(&entry()).unwrap_err();
        assert!(matches!(err, QueryError::Log { .. }));
    }

    #[test]
    fn file_log_from_config_requires_log_file() {
        let config = QueryConfig::from_toml_str("default_page_limit = 5").unwrap();
        let err = FileLog::from_config(&config).unwrap_err();
        assert!(matches!(err, QueryError::ConfigurationMissing("log_file")));
    }
}
