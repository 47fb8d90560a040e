//! Point-in-time market record for one symbol.
//!
//! Snapshots are produced by a [`SnapshotPort`](crate::ports::snapshot_port::SnapshotPort)
//! and never mutated afterwards.

use std::fmt;
use std::str::FromStr;

use super::error::AlgodeskError;

/// Supertrend direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn is_up(self) -> bool {
        self == Trend::Up
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "UP"),
            Trend::Down => write!(f, "DOWN"),
        }
    }
}

impl FromStr for Trend {
    type Err = AlgodeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "UP" => Ok(Trend::Up),
            "DOWN" => Ok(Trend::Down),
            other => Err(AlgodeskError::invalid_argument(format!(
                "unknown supertrend direction '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub spot: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_prev_high: f64,
    pub bb_upper: f64,
    pub bb_middle: f64,
    pub bb_lower: f64,
    pub supertrend: Trend,
}

impl MarketSnapshot {
    /// Check the shape every feed must honour: OHLC ordering, band ordering
    /// and RSI range.
    pub fn validate(&self) -> Result<(), AlgodeskError> {
        let fail = |reason: String| {
            Err(AlgodeskError::Feed {
                reason: format!("{}: {}", self.symbol, reason),
            })
        };

        if self.symbol.trim().is_empty() {
            return Err(AlgodeskError::Feed {
                reason: "snapshot has empty symbol".into(),
            });
        }
        if self.low > self.open.min(self.close) || self.high < self.open.max(self.close) {
            return fail(format!(
                "OHLC out of order (o={} h={} l={} c={})",
                self.open, self.high, self.low, self.close
            ));
        }
        if self.bb_lower > self.bb_middle || self.bb_middle > self.bb_upper {
            return fail(format!(
                "bollinger bands out of order ({} / {} / {})",
                self.bb_lower, self.bb_middle, self.bb_upper
            ));
        }
        if !(0.0..=100.0).contains(&self.rsi) {
            return fail(format!("rsi {} outside [0, 100]", self.rsi));
        }
        if self.volume < 0 {
            return fail(format!("negative volume {}", self.volume));
        }
        Ok(())
    }
}
