//! Append-only audit trail port.

use chrono::NaiveDateTime;

use crate::domain::error::AlgodeskError;

/// Line format written by audit implementations: `{timestamp} - {message}`.
pub const AUDIT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub fn format_audit_line(timestamp: NaiveDateTime, message: &str) -> String {
    format!("{} - {}\n", timestamp.format(AUDIT_TIMESTAMP_FORMAT), message)
}

pub trait AuditPort {
    fn append(&mut self, timestamp: NaiveDateTime, message: &str) -> Result<(), AlgodeskError>;
}
