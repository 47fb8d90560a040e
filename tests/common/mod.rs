#![allow(dead_code)]

use algodesk::domain::alert::AlertCategory;
use algodesk::domain::error::AlgodeskError;
use algodesk::domain::session::Session;
use algodesk::domain::settings::Settings;
pub use algodesk::domain::snapshot::{MarketSnapshot, Trend};
use algodesk::ports::alert_port::AlertPort;
use algodesk::ports::audit_port::{format_audit_line, AuditPort};
use algodesk::ports::snapshot_port::SnapshotPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::rc::Rc;

/// Alert sink that keeps every delivered alert for inspection.
#[derive(Clone, Default)]
pub struct RecordingAlerts {
    pub sent: Rc<RefCell<Vec<(AlertCategory, String)>>>,
}

impl RecordingAlerts {
    pub fn messages(&self) -> Vec<String> {
        self.sent.borrow().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn count(&self, category: AlertCategory) -> usize {
        self.sent.borrow().iter().filter(|(c, _)| *c == category).count()
    }
}

impl AlertPort for RecordingAlerts {
    fn notify(&mut self, category: AlertCategory, message: &str) {
        self.sent.borrow_mut().push((category, message.to_string()));
    }
}

/// In-memory audit trail holding formatted lines.
#[derive(Clone, Default)]
pub struct MemoryAudit {
    pub lines: Rc<RefCell<Vec<String>>>,
}

impl MemoryAudit {
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|l| l.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.lines.borrow().len()
    }
}

impl AuditPort for MemoryAudit {
    fn append(&mut self, timestamp: NaiveDateTime, message: &str) -> Result<(), AlgodeskError> {
        self.lines
            .borrow_mut()
            .push(format_audit_line(timestamp, message));
        Ok(())
    }
}

/// Feed that replays queued snapshots per symbol.
pub struct ScriptedFeed {
    queues: HashMap<String, VecDeque<MarketSnapshot>>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self {
            queues: HashMap::new(),
        }
    }

    pub fn push(mut self, snapshot: MarketSnapshot) -> Self {
        self.queues
            .entry(snapshot.symbol.clone())
            .or_default()
            .push_back(snapshot);
        self
    }
}

impl SnapshotPort for ScriptedFeed {
    fn snapshot(&mut self, symbol: &str) -> Result<MarketSnapshot, AlgodeskError> {
        self.queues
            .get_mut(symbol)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| AlgodeskError::NoData {
                symbol: symbol.to_string(),
            })
    }
}

pub fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap()
}

/// Snapshot around `spot` where none of the signal conditions pass.
pub fn quiet_snapshot(symbol: &str, spot: f64) -> MarketSnapshot {
    MarketSnapshot {
        symbol: symbol.to_string(),
        spot,
        open: spot - 20.0,
        high: spot + 20.0,
        low: spot - 30.0,
        close: spot,
        volume: 400,
        rsi: 50.0,
        macd: -1.0,
        macd_prev_high: 0.5,
        bb_upper: spot + 100.0,
        bb_middle: spot,
        bb_lower: spot - 100.0,
        supertrend: Trend::Down,
    }
}

/// Snapshot at `spot` that passes all five signal conditions.
pub fn verified_snapshot(symbol: &str, spot: f64) -> MarketSnapshot {
    MarketSnapshot {
        symbol: symbol.to_string(),
        spot,
        open: spot - 20.0,
        high: spot + 10.0,
        low: spot - 30.0,
        close: spot,
        volume: 800,
        rsi: 75.0,
        macd: 3.0,
        macd_prev_high: 2.0,
        bb_upper: spot - 5.0,
        bb_middle: spot - 100.0,
        bb_lower: spot - 200.0,
        supertrend: Trend::Up,
    }
}

pub fn make_session(settings: Settings) -> (Session, RecordingAlerts, MemoryAudit) {
    let alerts = RecordingAlerts::default();
    let audit = MemoryAudit::default();
    let session = Session::new(settings, Box::new(alerts.clone()), Box::new(audit.clone()))
        .unwrap()
        .with_clock(fixed_time);
    (session, alerts, audit)
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
