//! algodesk: simulated futures/options signal desk.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`]. [`cli`] is the presentation layer.

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
