//! Core domain types and logic.

pub mod error;
pub mod snapshot;
pub mod signal;
pub mod order;
pub mod position;
pub mod sizing;
pub mod ledger;
pub mod pnl;
pub mod alert;
pub mod instrument;
pub mod heatmap;
pub mod settings;
pub mod session;
pub mod config_validation;
