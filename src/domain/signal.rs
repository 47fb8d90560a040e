//! Signal evaluator.
//!
//! Maps a [`MarketSnapshot`] to five named conditions, checked in a fixed
//! display order:
//!
//! 1. Supertrend UP and spot above the Bollinger middle band (pink)
//! 2. RSI at or beyond 70/30 (blue)
//! 3. MACD above its previous high (green)
//! 4. Spot outside the Bollinger bands, strict on both sides (green)
//! 5. Supertrend UP (green)
//!
//! A signal is *verified* when all five pass and *hot* when at least four do.

use std::fmt;

use super::snapshot::MarketSnapshot;

pub const HOT_THRESHOLD: usize = 4;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

/// Display colour attached to a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionTag {
    Pink,
    Blue,
    Green,
}

impl fmt::Display for ConditionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConditionTag::Pink => "pink",
            ConditionTag::Blue => "blue",
            ConditionTag::Green => "green",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionResult {
    pub name: &'static str,
    pub passed: bool,
    pub tag: ConditionTag,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalOutcome {
    pub conditions: Vec<ConditionResult>,
    pub verified: bool,
    pub hot: bool,
}

impl SignalOutcome {
    pub fn passed_count(&self) -> usize {
        self.conditions.iter().filter(|c| c.passed).count()
    }
}

pub fn evaluate(snapshot: &MarketSnapshot) -> SignalOutcome {
    let trend_up = snapshot.supertrend.is_up();

    let conditions = vec![
        ConditionResult {
            name: "Supertrend Cross BB Middle",
            passed: trend_up && snapshot.spot > snapshot.bb_middle,
            tag: ConditionTag::Pink,
        },
        ConditionResult {
            name: "RSI 70/30 Cross",
            passed: snapshot.rsi >= RSI_OVERBOUGHT || snapshot.rsi <= RSI_OVERSOLD,
            tag: ConditionTag::Blue,
        },
        ConditionResult {
            name: "MACD Cross Prev High",
            passed: snapshot.macd > snapshot.macd_prev_high,
            tag: ConditionTag::Green,
        },
        ConditionResult {
            name: "BB Breakout",
            passed: snapshot.spot > snapshot.bb_upper || snapshot.spot < snapshot.bb_lower,
            tag: ConditionTag::Green,
        },
        ConditionResult {
            name: "Supertrend UP",
            passed: trend_up,
            tag: ConditionTag::Green,
        },
    ];

    let passed = conditions.iter().filter(|c| c.passed).count();
    SignalOutcome {
        verified: passed == conditions.len(),
        hot: passed >= HOT_THRESHOLD,
        conditions,
    }
}
