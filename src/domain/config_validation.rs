//! Configuration validation.
//!
//! Validates all config fields before a session starts.

use crate::domain::alert::AlertCategory;
use crate::domain::error::AlgodeskError;
use crate::domain::instrument::Mode;
use crate::ports::config_port::ConfigPort;

pub const FEED_SOURCES: [&str; 2] = ["simulated", "csv"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), AlgodeskError> {
    validate_account_config(config)?;
    validate_risk_config(config)?;
    validate_lot_sizes(config)?;
    validate_alerts(config)?;
    validate_feed_config(config)?;
    Ok(())
}

pub fn validate_account_config(config: &dyn ConfigPort) -> Result<(), AlgodeskError> {
    validate_capital(config)?;
    validate_amount_per_trade(config)?;
    validate_max_trades(config)?;
    validate_mode(config)?;
    validate_auto_exit(config)?;
    Ok(())
}

/// Present keys must parse; absent keys fall back to defaults later.
fn read_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, AlgodeskError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<f64>().map(Some).map_err(|_| {
            AlgodeskError::config_invalid(
                section,
                key,
                format!("expected a number, got '{}'", raw.trim()),
            )
        }),
    }
}

fn read_integer(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<i64>, AlgodeskError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<i64>().map(Some).map_err(|_| {
            AlgodeskError::config_invalid(
                section,
                key,
                format!("expected an integer, got '{}'", raw.trim()),
            )
        }),
    }
}

fn validate_capital(config: &dyn ConfigPort) -> Result<(), AlgodeskError> {
    match read_number(config, "account", "capital")? {
        Some(value) if !value.is_finite() || value <= 0.0 => Err(AlgodeskError::config_invalid(
            "account",
            "capital",
            "capital must be positive",
        )),
        _ => Ok(()),
    }
}

fn validate_amount_per_trade(config: &dyn ConfigPort) -> Result<(), AlgodeskError> {
    match read_number(config, "account", "amount_per_trade")? {
        Some(value) if !value.is_finite() || value <= 0.0 => Err(AlgodeskError::config_invalid(
            "account",
            "amount_per_trade",
            "amount_per_trade must be positive",
        )),
        _ => Ok(()),
    }
}

fn validate_max_trades(config: &dyn ConfigPort) -> Result<(), AlgodeskError> {
    match read_integer(config, "account", "max_trades_per_symbol")? {
        Some(value) if value < 1 => Err(AlgodeskError::config_invalid(
            "account",
            "max_trades_per_symbol",
            "max_trades_per_symbol must be at least 1",
        )),
        _ => Ok(()),
    }
}

fn validate_mode(config: &dyn ConfigPort) -> Result<(), AlgodeskError> {
    match config.get_string("account", "mode") {
        None => Ok(()),
        Some(s) => s.parse::<Mode>().map(|_| ()).map_err(|_| AlgodeskError::ConfigInvalid {
            section: "account".to_string(),
            key: "mode".to_string(),
            reason: format!("unknown mode '{}', expected FUTURES or OPTIONS", s.trim()),
        }),
    }
}

fn validate_auto_exit(config: &dyn ConfigPort) -> Result<(), AlgodeskError> {
    match config.get_string("account", "auto_exit") {
        Some(raw) if parse_bool(&raw).is_none() => Err(AlgodeskError::config_invalid(
            "account",
            "auto_exit",
            format!("expected true/false, got '{}'", raw.trim()),
        )),
        _ => Ok(()),
    }
}

pub fn validate_risk_config(config: &dyn ConfigPort) -> Result<(), AlgodeskError> {
    for key in ["stop_loss_offset", "take_profit_offset"] {
        if let Some(value) = read_number(config, "risk", key)? {
            if !value.is_finite() || value <= 0.0 {
                return Err(AlgodeskError::config_invalid(
                    "risk",
                    key,
                    format!("{key} must be a positive number"),
                ));
            }
        }
    }
    Ok(())
}

pub fn validate_lot_sizes(config: &dyn ConfigPort) -> Result<(), AlgodeskError> {
    for key in config.section_keys("lot_size") {
        let raw = config.get_string("lot_size", &key).unwrap_or_default();
        match raw.trim().parse::<u32>() {
            Ok(n) if n > 0 => {}
            _ => {
                return Err(AlgodeskError::ConfigInvalid {
                    section: "lot_size".to_string(),
                    key,
                    reason: format!("lot size must be a positive integer, got '{}'", raw.trim()),
                })
            }
        }
    }
    Ok(())
}

/// `[alerts]` key for the sink master switch; every other key names a category.
pub const TOASTS_KEY: &str = "toasts";

pub fn validate_alerts(config: &dyn ConfigPort) -> Result<(), AlgodeskError> {
    for key in config.section_keys("alerts") {
        if key != TOASTS_KEY && key.parse::<AlertCategory>().is_err() {
            return Err(AlgodeskError::ConfigInvalid {
                section: "alerts".to_string(),
                key,
                reason: "unknown alert category".to_string(),
            });
        }
        let raw = config.get_string("alerts", &key).unwrap_or_default();
        if parse_bool(&raw).is_none() {
            return Err(AlgodeskError::ConfigInvalid {
                section: "alerts".to_string(),
                key,
                reason: format!("expected true/false, got '{}'", raw.trim()),
            });
        }
    }
    Ok(())
}

pub fn validate_feed_config(config: &dyn ConfigPort) -> Result<(), AlgodeskError> {
    let source = config
        .get_string("feed", "source")
        .unwrap_or_else(|| "simulated".to_string())
        .trim()
        .to_lowercase();
    if !FEED_SOURCES.contains(&source.as_str()) {
        return Err(AlgodeskError::ConfigInvalid {
            section: "feed".to_string(),
            key: "source".to_string(),
            reason: format!("unknown feed source '{source}', expected simulated or csv"),
        });
    }
    if source == "csv" {
        match config.get_string("feed", "path") {
            Some(p) if !p.trim().is_empty() => {}
            _ => {
                return Err(AlgodeskError::ConfigMissing {
                    section: "feed".to_string(),
                    key: "path".to_string(),
                })
            }
        }
    }
    if let Some(seed) = config.get_string("feed", "seed") {
        if seed.trim().parse::<u64>().is_err() {
            return Err(AlgodeskError::ConfigInvalid {
                section: "feed".to_string(),
                key: "seed".to_string(),
                reason: "seed must be a non-negative integer".to_string(),
            });
        }
    }
    Ok(())
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
