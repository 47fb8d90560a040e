//! Order records and order id assignment.

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

use super::error::AlgodeskError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for Side {
    type Err = AlgodeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(AlgodeskError::invalid_argument(format!(
                "unknown order side '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderType {
    #[default]
    Market,
    Limit,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
        }
    }
}

/// Simulated fills complete immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Complete,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Complete => write!(f, "COMPLETE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: String,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub timestamp: NaiveDateTime,
    pub qty: u32,
    pub price: f64,
}

/// Hands out order ids of the form `ORD{unix_seconds}-{seq}`.
///
/// The sequence never repeats for the lifetime of the generator, so two
/// orders created within the same second still get distinct ids.
#[derive(Debug, Clone, Default)]
pub struct OrderIdGenerator {
    next_seq: u64,
}

impl OrderIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, at: NaiveDateTime) -> String {
        self.next_seq += 1;
        format!("ORD{}-{}", at.and_utc().timestamp(), self.next_seq)
    }

    pub fn issued(&self) -> u64 {
        self.next_seq
    }
}
