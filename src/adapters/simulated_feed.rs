//! Seeded random snapshot generator.
//!
//! Prices, bands and indicator readings are drawn from fixed ranges around a
//! spot between 48000 and 49000. The same seed always replays the same
//! sequence of snapshots.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::error::AlgodeskError;
use crate::domain::snapshot::{MarketSnapshot, Trend};
use crate::ports::snapshot_port::SnapshotPort;

pub struct SimulatedFeed {
    rng: StdRng,
}

impl SimulatedFeed {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    fn round2(value: f64) -> f64 {
        (value * 100.0).round() / 100.0
    }
}

impl SnapshotPort for SimulatedFeed {
    fn snapshot(&mut self, symbol: &str) -> Result<MarketSnapshot, AlgodeskError> {
        let rng = &mut self.rng;

        let price = rng.gen_range(48_000..49_000) as f64;
        let open = price - rng.gen_range(10..=50) as f64;
        let high = price + rng.gen_range(10..=50) as f64;
        let low = (price - rng.gen_range(10..=50) as f64).min(open);
        let volume = rng.gen_range(100..=1_000);

        let rsi = Self::round2(rng.gen_range(20.0..=80.0));
        let macd = Self::round2(rng.gen_range(-5.0..=5.0));
        let bb_upper = price + rng.gen_range(50..=150) as f64;
        let bb_lower = price - rng.gen_range(50..=150) as f64;
        let supertrend = if rng.gen_bool(0.5) {
            Trend::Up
        } else {
            Trend::Down
        };
        let macd_prev_high = macd + rng.gen_range(0.0..2.0);

        let snapshot = MarketSnapshot {
            symbol: symbol.to_string(),
            spot: price,
            open,
            high,
            low,
            close: price,
            volume,
            rsi,
            macd,
            macd_prev_high,
            bb_upper,
            bb_middle: price,
            bb_lower,
            supertrend,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }
}
