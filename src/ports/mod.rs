//! Port traits the domain talks through.

pub mod config_port;
pub mod snapshot_port;
pub mod alert_port;
pub mod audit_port;
