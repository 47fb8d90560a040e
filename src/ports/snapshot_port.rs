//! Market snapshot source port.
//!
//! Implemented by the seeded simulator and by the CSV replay feed. Callers
//! must not assume which one they hold.

use crate::domain::error::AlgodeskError;
use crate::domain::snapshot::MarketSnapshot;

pub trait SnapshotPort {
    /// Next snapshot for `symbol`.
    fn snapshot(&mut self, symbol: &str) -> Result<MarketSnapshot, AlgodeskError>;

    fn snapshots(&mut self, symbols: &[String]) -> Result<Vec<MarketSnapshot>, AlgodeskError> {
        symbols.iter().map(|s| self.snapshot(s)).collect()
    }
}
