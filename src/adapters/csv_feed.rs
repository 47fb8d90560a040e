//! CSV replay feed.
//!
//! Loads recorded snapshots from a CSV file with the header
//!
//! ```text
//! symbol,spot,open,high,low,close,volume,rsi,macd,macd_prev_high,bb_upper,bb_middle,bb_lower,supertrend
//! ```
//!
//! and hands them out per symbol in file order. Column order in the file may
//! differ; columns are matched by header name.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::Path;

use crate::domain::error::AlgodeskError;
use crate::domain::snapshot::{MarketSnapshot, Trend};
use crate::ports::snapshot_port::SnapshotPort;

pub const COLUMNS: [&str; 14] = [
    "symbol",
    "spot",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "rsi",
    "macd",
    "macd_prev_high",
    "bb_upper",
    "bb_middle",
    "bb_lower",
    "supertrend",
];

pub struct CsvSnapshotFeed {
    queues: HashMap<String, VecDeque<MarketSnapshot>>,
}

impl CsvSnapshotFeed {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AlgodeskError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| AlgodeskError::Feed {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_reader(content.as_bytes())
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, AlgodeskError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = rdr.headers().map_err(|e| AlgodeskError::Feed {
            reason: format!("CSV header error: {}", e),
        })?;
        let mut index = [0usize; COLUMNS.len()];
        for (slot, name) in index.iter_mut().zip(COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| AlgodeskError::Feed {
                    reason: format!("missing {} column", name),
                })?;
        }

        let mut queues: HashMap<String, VecDeque<MarketSnapshot>> = HashMap::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| AlgodeskError::Feed {
                reason: format!("CSV parse error: {}", e),
            })?;
            let row = line + 2;
            let snapshot = parse_record(&record, &index, row)?;
            snapshot.validate()?;
            queues
                .entry(snapshot.symbol.clone())
                .or_default()
                .push_back(snapshot);
        }

        Ok(Self { queues })
    }

    /// Snapshots left to replay for `symbol`.
    pub fn remaining(&self, symbol: &str) -> usize {
        self.queues.get(symbol).map_or(0, VecDeque::len)
    }

    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.queues.keys().cloned().collect();
        symbols.sort();
        symbols
    }
}

fn field<'a>(
    record: &'a csv::StringRecord,
    index: &[usize; COLUMNS.len()],
    col: usize,
    row: usize,
) -> Result<&'a str, AlgodeskError> {
    record.get(index[col]).ok_or_else(|| AlgodeskError::Feed {
        reason: format!("row {}: missing {} value", row, COLUMNS[col]),
    })
}

fn parse_record(
    record: &csv::StringRecord,
    index: &[usize; COLUMNS.len()],
    row: usize,
) -> Result<MarketSnapshot, AlgodeskError> {
    let text = |col: usize| field(record, index, col, row);
    let number = |col: usize| -> Result<f64, AlgodeskError> {
        text(col)?.parse().map_err(|e| AlgodeskError::Feed {
            reason: format!("row {}: invalid {} value: {}", row, COLUMNS[col], e),
        })
    };

    let volume: i64 = text(6)?.parse().map_err(|e| AlgodeskError::Feed {
        reason: format!("row {}: invalid volume value: {}", row, e),
    })?;
    let supertrend: Trend = text(13)?.parse().map_err(|e: AlgodeskError| AlgodeskError::Feed {
        reason: format!("row {}: {}", row, e),
    })?;

    Ok(MarketSnapshot {
        symbol: text(0)?.to_uppercase(),
        spot: number(1)?,
        open: number(2)?,
        high: number(3)?,
        low: number(4)?,
        close: number(5)?,
        volume,
        rsi: number(7)?,
        macd: number(8)?,
        macd_prev_high: number(9)?,
        bb_upper: number(10)?,
        bb_middle: number(11)?,
        bb_lower: number(12)?,
        supertrend,
    })
}

impl SnapshotPort for CsvSnapshotFeed {
    fn snapshot(&mut self, symbol: &str) -> Result<MarketSnapshot, AlgodeskError> {
        self.queues
            .get_mut(symbol)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| AlgodeskError::NoData {
                symbol: symbol.to_string(),
            })
    }
}
