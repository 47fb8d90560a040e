//! Open positions and closed trades.

use chrono::NaiveDateTime;
use std::fmt;

use super::order::Side;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub side: Side,
    pub qty: u32,
    pub avg_price: f64,
    pub last_price: f64,
    pub pnl: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub entry_time: NaiveDateTime,
}

impl Position {
    pub fn is_long(&self) -> bool {
        self.side == Side::Buy
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        let diff = price - self.avg_price;
        match self.side {
            Side::Buy => self.qty as f64 * diff,
            Side::Sell => -(self.qty as f64) * diff,
        }
    }

    /// Record a new last traded price and refresh `pnl` from it.
    pub fn mark(&mut self, price: f64) {
        self.last_price = price;
        self.pnl = self.unrealized_pnl(price);
    }

    pub fn should_stop_loss(&self, price: f64) -> bool {
        if self.is_long() {
            price <= self.stop_loss
        } else {
            price >= self.stop_loss
        }
    }

    pub fn should_take_profit(&self, price: f64) -> bool {
        if self.is_long() {
            price >= self.take_profit
        } else {
            price <= self.take_profit
        }
    }

    /// Which exit, if any, the last marked price has triggered. Stop-loss wins
    /// when both levels are crossed.
    pub fn triggered_exit(&self) -> Option<ExitReason> {
        if self.should_stop_loss(self.last_price) {
            Some(ExitReason::StopLoss)
        } else if self.should_take_profit(self.last_price) {
            Some(ExitReason::TakeProfit)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    Manual,
    StopLoss,
    TakeProfit,
    Panic,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::Manual => "MANUAL",
            ExitReason::StopLoss => "SL",
            ExitReason::TakeProfit => "TP",
            ExitReason::Panic => "PANIC",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub symbol: String,
    pub side: Side,
    pub qty: u32,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub pnl: f64,
    pub reason: ExitReason,
}

impl ClosedTrade {
    pub fn from_position(
        position: Position,
        exit_time: NaiveDateTime,
        reason: ExitReason,
    ) -> Self {
        ClosedTrade {
            pnl: position.unrealized_pnl(position.last_price),
            exit_price: position.last_price,
            symbol: position.symbol,
            side: position.side,
            qty: position.qty,
            entry_price: position.avg_price,
            entry_time: position.entry_time,
            exit_time,
            reason,
        }
    }
}
