//! Append-only audit log file.
//!
//! One line per event, `{timestamp} - {message}`. The file is opened in
//! append mode for every write and is never truncated or rotated.

use chrono::NaiveDateTime;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::error::AlgodeskError;
use crate::ports::audit_port::{format_audit_line, AuditPort};

pub const DEFAULT_AUDIT_PATH: &str = "algodesk_data/logs/audit_log.txt";

pub struct FileAuditLog {
    path: PathBuf,
}

impl FileAuditLog {
    /// Creates the parent directory if needed.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, AlgodeskError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditPort for FileAuditLog {
    fn append(&mut self, timestamp: NaiveDateTime, message: &str) -> Result<(), AlgodeskError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format_audit_line(timestamp, message).as_bytes())?;
        Ok(())
    }
}
