//! Tradeable instrument universe per trading mode.

use chrono::{Duration, NaiveDate};
use std::fmt;
use std::str::FromStr;

use super::error::AlgodeskError;
use super::sizing::LotSizeTable;

const FUTURES: [&str; 3] = ["NIFTY_FUT", "BANKNIFTY_FUT", "FINNIFTY_FUT"];
const OPTIONS: [&str; 3] = ["NIFTY_CE_20000", "NIFTY_PE_19000", "BANKNIFTY_CE_52000"];

const DEFAULT_LOT_SIZES: [(&str, u32); 6] = [
    ("NIFTY_FUT", 50),
    ("BANKNIFTY_FUT", 25),
    ("FINNIFTY_FUT", 40),
    ("NIFTY_CE_20000", 50),
    ("NIFTY_PE_19000", 50),
    ("BANKNIFTY_CE_52000", 25),
];

/// Days from today to the simulated weekly expiry.
pub const EXPIRY_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Futures,
    Options,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Futures => write!(f, "FUTURES"),
            Mode::Options => write!(f, "OPTIONS"),
        }
    }
}

impl FromStr for Mode {
    type Err = AlgodeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FUTURES" => Ok(Mode::Futures),
            "OPTIONS" => Ok(Mode::Options),
            other => Err(AlgodeskError::invalid_argument(format!(
                "unknown mode '{other}' (expected FUTURES or OPTIONS)"
            ))),
        }
    }
}

pub fn symbols(mode: Mode) -> Vec<String> {
    let list: &[&str] = match mode {
        Mode::Futures => &FUTURES,
        Mode::Options => &OPTIONS,
    };
    list.iter().map(|s| s.to_string()).collect()
}

pub fn atm_symbol(mode: Mode) -> &'static str {
    match mode {
        Mode::Futures => FUTURES[0],
        Mode::Options => OPTIONS[0],
    }
}

pub fn expiry(today: NaiveDate) -> NaiveDate {
    today + Duration::days(EXPIRY_DAYS)
}

pub fn default_lot_sizes() -> LotSizeTable {
    DEFAULT_LOT_SIZES
        .iter()
        .map(|(symbol, size)| (symbol.to_string(), *size))
        .collect()
}
