//! Session settings (account sizing, risk offsets, alert toggles).

use super::alert::AlertPreferences;
use super::error::AlgodeskError;
use super::instrument::{default_lot_sizes, Mode};
use super::ledger::ExitPolicy;
use super::sizing::LotSizeTable;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub capital: f64,
    pub amount_per_trade: f64,
    pub max_trades_per_symbol: usize,
    pub mode: Mode,
    pub auto_exit: bool,
    pub exit_policy: ExitPolicy,
    pub lot_sizes: LotSizeTable,
    pub alerts: AlertPreferences,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            capital: 200_000.0,
            amount_per_trade: 10_000.0,
            max_trades_per_symbol: 2,
            mode: Mode::Futures,
            auto_exit: true,
            exit_policy: ExitPolicy::default(),
            lot_sizes: default_lot_sizes(),
            alerts: AlertPreferences::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), AlgodeskError> {
        if !self.capital.is_finite() || self.capital <= 0.0 {
            return Err(AlgodeskError::config_invalid(
                "account",
                "capital",
                "capital must be positive",
            ));
        }
        if !self.amount_per_trade.is_finite() || self.amount_per_trade <= 0.0 {
            return Err(AlgodeskError::config_invalid(
                "account",
                "amount_per_trade",
                "amount_per_trade must be positive",
            ));
        }
        if self.max_trades_per_symbol < 1 {
            return Err(AlgodeskError::config_invalid(
                "account",
                "max_trades_per_symbol",
                "max_trades_per_symbol must be at least 1",
            ));
        }
        self.exit_policy.validate()?;
        Ok(())
    }
}
