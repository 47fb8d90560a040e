//! Profit and loss aggregation over open positions.
//!
//! `tp_count` and `sl_count` only move through [`PnlStats::record_exit`],
//! which the session calls when an automatic exit fires. Manual and panic
//! exits do not count towards the win rate.

use super::position::{ExitReason, Position};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PnlStats {
    pub total_profit: f64,
    pub total_loss: f64,
    pub net_profit: f64,
    /// Percent of capital.
    pub roi: f64,
    pub tp_count: usize,
    pub sl_count: usize,
}

/// The figures shown on the profit and loss page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PnlSummary {
    pub net_profit: f64,
    pub win_rate: f64,
    pub roi: f64,
}

impl PnlStats {
    /// Recompute the aggregates from the full open-position set. ROI keeps its
    /// previous value when `capital` is not positive.
    pub fn recompute(&mut self, positions: &[Position], capital: f64) -> PnlSummary {
        let net: f64 = positions.iter().map(|p| p.pnl).sum();
        self.net_profit = net;
        self.total_profit = net.max(0.0);
        self.total_loss = (-net).max(0.0);
        if capital > 0.0 {
            self.roi = net / capital * 100.0;
        }
        self.summary()
    }

    /// Percentage of take-profit exits among all counted exits.
    pub fn win_rate(&self) -> f64 {
        let total = self.tp_count + self.sl_count;
        self.tp_count as f64 / total.max(1) as f64 * 100.0
    }

    pub fn record_exit(&mut self, reason: ExitReason) {
        match reason {
            ExitReason::TakeProfit => self.tp_count += 1,
            ExitReason::StopLoss => self.sl_count += 1,
            ExitReason::Manual | ExitReason::Panic => {}
        }
    }

    pub fn summary(&self) -> PnlSummary {
        PnlSummary {
            net_profit: self.net_profit,
            win_rate: self.win_rate(),
            roi: self.roi,
        }
    }
}
