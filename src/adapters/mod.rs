//! Concrete adapter implementations for ports.

pub mod file_config_adapter;
pub mod simulated_feed;
pub mod csv_feed;
pub mod file_audit_log;
pub mod tracing_alert_sink;
