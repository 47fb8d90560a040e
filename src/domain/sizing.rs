//! Lot sizing: converts a cash budget per trade into a whole number of lots.

use std::collections::HashMap;

use super::error::AlgodeskError;

/// Lot size used for symbols missing from the table.
pub const DEFAULT_LOT_SIZE: u32 = 1;

/// Minimum tradeable unit per symbol.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LotSizeTable {
    sizes: HashMap<String, u32>,
}

impl LotSizeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a lot size. Zero is rejected.
    pub fn insert(&mut self, symbol: &str, lot_size: u32) -> Result<(), AlgodeskError> {
        if lot_size == 0 {
            return Err(AlgodeskError::invalid_argument(format!(
                "lot size for {symbol} must be positive"
            )));
        }
        self.sizes.insert(symbol.to_uppercase(), lot_size);
        Ok(())
    }

    pub fn lot_size(&self, symbol: &str) -> u32 {
        self.sizes
            .get(&symbol.to_uppercase())
            .copied()
            .unwrap_or(DEFAULT_LOT_SIZE)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.sizes.contains_key(&symbol.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl FromIterator<(String, u32)> for LotSizeTable {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        LotSizeTable {
            sizes: iter
                .into_iter()
                .filter(|(_, size)| *size > 0)
                .map(|(symbol, size)| (symbol.to_uppercase(), size))
                .collect(),
        }
    }
}

/// `floor(amount_per_trade / lot_size)`, never less than one lot.
pub fn compute_lots(
    symbol: &str,
    amount_per_trade: f64,
    table: &LotSizeTable,
) -> Result<u32, AlgodeskError> {
    if !amount_per_trade.is_finite() || amount_per_trade <= 0.0 {
        return Err(AlgodeskError::invalid_argument(format!(
            "amount per trade must be positive, got {amount_per_trade}"
        )));
    }
    let lot = table.lot_size(symbol) as f64;
    let lots = (amount_per_trade / lot).floor();
    // Saturate rather than wrap for absurd budgets.
    let lots = if lots >= u32::MAX as f64 {
        u32::MAX
    } else {
        lots as u32
    };
    Ok(lots.max(1))
}
