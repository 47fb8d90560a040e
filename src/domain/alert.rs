//! Alert categories and per-category enable flags.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::error::AlgodeskError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AlertCategory {
    Heartbeat,
    WsReconnect,
    HotSignal,
    VerifiedSignal,
    OrderPlaced,
    Slippage,
    Heatmap,
    VisualValidator,
    PositionExit,
}

impl AlertCategory {
    pub const ALL: [AlertCategory; 9] = [
        AlertCategory::Heartbeat,
        AlertCategory::WsReconnect,
        AlertCategory::HotSignal,
        AlertCategory::VerifiedSignal,
        AlertCategory::OrderPlaced,
        AlertCategory::Slippage,
        AlertCategory::Heatmap,
        AlertCategory::VisualValidator,
        AlertCategory::PositionExit,
    ];

    /// Config key for the category.
    pub fn as_str(self) -> &'static str {
        match self {
            AlertCategory::Heartbeat => "heartbeat",
            AlertCategory::WsReconnect => "ws_reconnect",
            AlertCategory::HotSignal => "hot_signal",
            AlertCategory::VerifiedSignal => "verified_signal",
            AlertCategory::OrderPlaced => "order_placed",
            AlertCategory::Slippage => "slippage",
            AlertCategory::Heatmap => "heatmap",
            AlertCategory::VisualValidator => "visual_validator",
            AlertCategory::PositionExit => "position_exit",
        }
    }
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AlertCategory {
    type Err = AlgodeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        AlertCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == key)
            .ok_or_else(|| AlgodeskError::invalid_argument(format!("unknown alert category '{s}'")))
    }
}

/// Every category starts enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertPreferences {
    enabled: BTreeMap<AlertCategory, bool>,
    toasts: bool,
}

impl Default for AlertPreferences {
    fn default() -> Self {
        AlertPreferences {
            enabled: AlertCategory::ALL.into_iter().map(|c| (c, true)).collect(),
            toasts: true,
        }
    }
}

impl AlertPreferences {
    pub fn is_enabled(&self, category: AlertCategory) -> bool {
        self.enabled.get(&category).copied().unwrap_or(true)
    }

    pub fn set(&mut self, category: AlertCategory, enabled: bool) {
        self.enabled.insert(category, enabled);
    }

    /// Master switch for the alert sink. The audit log ignores it.
    pub fn toasts_on(&self) -> bool {
        self.toasts
    }

    pub fn set_toasts(&mut self, on: bool) {
        self.toasts = on;
    }

    /// Whether an alert of `category` reaches the sink.
    pub fn should_deliver(&self, category: AlertCategory) -> bool {
        self.toasts && self.is_enabled(category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AlertCategory, bool)> + '_ {
        self.enabled.iter().map(|(c, e)| (*c, *e))
    }
}
