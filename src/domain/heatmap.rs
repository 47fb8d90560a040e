//! Per-symbol condition heatmap.
//!
//! A coarser view than the signal evaluator: MACD is compared to zero rather
//! than its previous high, and a row is hot when three of supertrend, middle
//! band cross, overbought RSI and positive MACD are set.

use super::snapshot::MarketSnapshot;
use super::signal::{RSI_OVERBOUGHT, RSI_OVERSOLD};

pub const HEATMAP_HOT_THRESHOLD: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatmapRow {
    pub symbol: String,
    pub supertrend: bool,
    pub bb_mid_cross: bool,
    pub rsi_70: bool,
    pub rsi_30: bool,
    pub macd: bool,
    pub hot_signal: bool,
}

impl HeatmapRow {
    pub fn from_snapshot(snapshot: &MarketSnapshot) -> Self {
        let supertrend = snapshot.supertrend.is_up();
        let bb_mid_cross = snapshot.spot > snapshot.bb_middle;
        let rsi_70 = snapshot.rsi >= RSI_OVERBOUGHT;
        let rsi_30 = snapshot.rsi <= RSI_OVERSOLD;
        let macd = snapshot.macd > 0.0;
        let score = [supertrend, bb_mid_cross, rsi_70, macd]
            .iter()
            .filter(|f| **f)
            .count() as u8;

        HeatmapRow {
            symbol: snapshot.symbol.clone(),
            supertrend,
            bb_mid_cross,
            rsi_70,
            rsi_30,
            macd,
            hot_signal: score >= HEATMAP_HOT_THRESHOLD,
        }
    }

    /// Flags as 0/1 cells in column order.
    pub fn cells(&self) -> [u8; 6] {
        [
            self.supertrend,
            self.bb_mid_cross,
            self.rsi_70,
            self.rsi_30,
            self.macd,
            self.hot_signal,
        ]
        .map(u8::from)
    }
}

pub const HEATMAP_COLUMNS: [&str; 6] = [
    "supertrend",
    "bb_mid_cross",
    "rsi_70",
    "rsi_30",
    "macd",
    "hot_signal",
];

pub fn build(snapshots: &[MarketSnapshot]) -> Vec<HeatmapRow> {
    snapshots.iter().map(HeatmapRow::from_snapshot).collect()
}
