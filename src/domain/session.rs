//! Trading session context.
//!
//! One `Session` owns everything a dashboard session mutates: settings, the
//! ledger, PnL counters, signal logs and the alert/audit ports. Every
//! mutating operation takes `&mut self`, so a session has a single writer;
//! sharing one across threads requires wrapping it in a `Mutex`.
//!
//! Notifications go to the [`AlertPort`] only when their category is enabled,
//! but every notification is written to the [`AuditPort`]. Audit failures
//! abort the operation that raised them and leave the ledger, counters and
//! signal logs as they were before the call.

use chrono::{Local, NaiveDateTime};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::alert::AlertCategory;
use super::error::AlgodeskError;
use super::heatmap::{self, HeatmapRow};
use super::instrument::Mode;
use super::ledger::Ledger;
use super::order::{Order, OrderType, Side};
use super::pnl::{PnlStats, PnlSummary};
use super::position::{ClosedTrade, ExitReason};
use super::settings::Settings;
use super::signal::{self, SignalOutcome};
use super::sizing::compute_lots;
use super::snapshot::{MarketSnapshot, Trend};
use crate::ports::alert_port::AlertPort;
use crate::ports::audit_port::AuditPort;

type Clock = Box<dyn Fn() -> NaiveDateTime>;

pub struct Session {
    settings: Settings,
    ledger: Ledger,
    stats: PnlStats,
    alerts: Box<dyn AlertPort>,
    audit: Box<dyn AuditPort>,
    clock: Clock,
    verified_signals: Vec<String>,
    hot_signals: Vec<String>,
    heartbeat: u64,
    halted: bool,
}

impl Session {
    pub fn new(
        settings: Settings,
        alerts: Box<dyn AlertPort>,
        audit: Box<dyn AuditPort>,
    ) -> Result<Self, AlgodeskError> {
        settings.validate()?;
        Ok(Session {
            ledger: Ledger::new(settings.exit_policy),
            settings,
            stats: PnlStats::default(),
            alerts,
            audit,
            clock: Box::new(|| Local::now().naive_local()),
            verified_signals: Vec::new(),
            hot_signals: Vec::new(),
            heartbeat: 0,
            halted: false,
        })
    }

    /// Replace the wall clock, e.g. with a fixed instant in tests.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn stats(&self) -> &PnlStats {
        &self.stats
    }

    pub fn verified_signals(&self) -> &[String] {
        &self.verified_signals
    }

    pub fn hot_signals(&self) -> &[String] {
        &self.hot_signals
    }

    pub fn heartbeat_count(&self) -> u64 {
        self.heartbeat
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn update_settings(&mut self, settings: Settings) -> Result<(), AlgodeskError> {
        settings.validate()?;
        self.ledger.set_exit_policy(settings.exit_policy);
        self.settings = settings;
        Ok(())
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.settings.mode = mode;
    }

    pub fn set_alert(&mut self, category: AlertCategory, enabled: bool) {
        self.settings.alerts.set(category, enabled);
    }

    pub fn set_toasts(&mut self, on: bool) {
        self.settings.alerts.set_toasts(on);
    }

    pub fn notify(&mut self, category: AlertCategory, message: &str) -> Result<(), AlgodeskError> {
        if self.settings.alerts.should_deliver(category) {
            self.alerts.notify(category, message);
        } else {
            debug!(%category, message, "alert suppressed");
        }
        let now = (self.clock)();
        self.audit.append(now, message)
    }

    pub fn heartbeat(&mut self) -> Result<u64, AlgodeskError> {
        self.notify(AlertCategory::Heartbeat, "Heartbeat Alive")?;
        self.heartbeat += 1;
        Ok(self.heartbeat)
    }

    pub fn reconnect_feed(&mut self) -> Result<(), AlgodeskError> {
        self.notify(AlertCategory::WsReconnect, "WebSocket Reconnected")
    }

    /// Evaluate a snapshot and log the symbol as hot and/or verified.
    pub fn validate_signal(
        &mut self,
        snapshot: &MarketSnapshot,
    ) -> Result<SignalOutcome, AlgodeskError> {
        let outcome = signal::evaluate(snapshot);
        self.atomically(|session| {
            if outcome.hot {
                session.notify(
                    AlertCategory::HotSignal,
                    &format!("HOT SIGNAL CREATED: {}", snapshot.symbol),
                )?;
                session.hot_signals.push(snapshot.symbol.clone());
            }
            if outcome.verified {
                session.notify(
                    AlertCategory::VerifiedSignal,
                    &format!("VERIFIED SIGNAL: {}", snapshot.symbol),
                )?;
                session.verified_signals.push(snapshot.symbol.clone());
            }
            Ok(())
        })?;
        Ok(outcome)
    }

    pub fn is_at_capacity(&self, symbol: &str) -> bool {
        self.ledger
            .is_at_capacity(symbol, self.settings.max_trades_per_symbol)
    }

    /// Trade a previously verified symbol at the snapshot's spot price.
    ///
    /// Returns `Ok(None)` when the symbol already holds the maximum number of
    /// positions. Side follows the supertrend in futures mode; options are
    /// always bought.
    pub fn execute_signal(
        &mut self,
        snapshot: &MarketSnapshot,
    ) -> Result<Option<Order>, AlgodeskError> {
        if self.halted {
            return Err(AlgodeskError::EngineHalted);
        }
        let symbol = snapshot.symbol.as_str();
        if !self.verified_signals.iter().any(|s| s == symbol) {
            return Err(AlgodeskError::invalid_argument(format!(
                "no verified signal for {symbol}"
            )));
        }
        if self.is_at_capacity(symbol) {
            warn!(symbol, "already at max trades for symbol, no trade");
            return Ok(None);
        }

        let qty = compute_lots(
            symbol,
            self.settings.amount_per_trade,
            &self.settings.lot_sizes,
        )?;
        let side = match (self.settings.mode, snapshot.supertrend) {
            (Mode::Futures, Trend::Down) => Side::Sell,
            _ => Side::Buy,
        };

        self.notify(
            AlertCategory::VisualValidator,
            &format!("Visual Validator Confirmed: {symbol}"),
        )?;
        let order = self.place_order(
            symbol,
            side,
            i64::from(qty),
            snapshot.spot,
            OrderType::Market,
        )?;
        Ok(Some(order))
    }

    pub fn place_order(
        &mut self,
        symbol: &str,
        side: Side,
        qty: i64,
        price: f64,
        order_type: OrderType,
    ) -> Result<Order, AlgodeskError> {
        if self.halted {
            return Err(AlgodeskError::EngineHalted);
        }
        let now = (self.clock)();
        self.atomically(|session| {
            let order = session
                .ledger
                .place_order(symbol, side, qty, price, order_type, now)?;
            session.notify(
                AlertCategory::OrderPlaced,
                &format!(
                    "Order Placed: {} | {} | {} | {} | {}",
                    order.order_id, order.symbol, order.side, order.qty, order.price
                ),
            )?;
            Ok(order)
        })
    }

    pub fn exit_position(&mut self, index: usize) -> Result<ClosedTrade, AlgodeskError> {
        let now = (self.clock)();
        self.atomically(|session| {
            let trade = session.ledger.exit_position(index, now)?;
            session.notify(
                AlertCategory::PositionExit,
                &format!("Exited {}", trade.symbol),
            )?;
            Ok(trade)
        })
    }

    /// Mark open positions and, with auto exit on, close those that hit
    /// their stop-loss or take-profit. Returns the trades closed.
    pub fn mark_to_market(
        &mut self,
        prices: &HashMap<String, f64>,
    ) -> Result<Vec<ClosedTrade>, AlgodeskError> {
        let now = (self.clock)();
        let auto_exit = self.settings.auto_exit;
        self.atomically(|session| {
            session.ledger.mark_to_market(prices);
            if !auto_exit {
                return Ok(Vec::new());
            }

            let mut closed = Vec::new();
            // Highest index first so earlier indices stay valid.
            for (index, reason) in session.ledger.triggered_exits().into_iter().rev() {
                let trade = session.ledger.close_position(index, reason, now)?;
                session.stats.record_exit(reason);
                closed.push(trade);
            }
            closed.reverse();

            for trade in &closed {
                session.notify(
                    AlertCategory::PositionExit,
                    &format!(
                        "Exited {} ({}) at {} pnl {:.2}",
                        trade.symbol, trade.reason, trade.exit_price, trade.pnl
                    ),
                )?;
            }
            Ok(closed)
        })
    }

    pub fn pnl(&mut self) -> PnlSummary {
        self.stats
            .recompute(self.ledger.positions(), self.settings.capital)
    }

    /// Exit every position and stop accepting orders.
    pub fn panic_exit(&mut self) -> Result<usize, AlgodeskError> {
        let now = (self.clock)();
        let count = self.atomically(|session| {
            let closed = session.ledger.close_all(ExitReason::Panic, now);
            session.halted = true;
            session.notify(
                AlertCategory::PositionExit,
                &format!("PANIC: exited {} positions, engine stopped", closed.len()),
            )?;
            Ok(closed.len())
        })?;
        info!(closed = count, "panic exit, engine stopped");
        Ok(count)
    }

    /// Run `op`, restoring the ledger, counters, signal logs and halted flag
    /// if it fails.
    fn atomically<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, AlgodeskError>,
    ) -> Result<T, AlgodeskError> {
        let ledger = self.ledger.clone();
        let stats = self.stats.clone();
        let hot = self.hot_signals.len();
        let verified = self.verified_signals.len();
        let halted = self.halted;

        let result = op(self);
        if result.is_err() {
            self.ledger = ledger;
            self.stats = stats;
            self.hot_signals.truncate(hot);
            self.verified_signals.truncate(verified);
            self.halted = halted;
            warn!("operation failed, session state rolled back");
        }
        result
    }

    pub fn heatmap(&mut self, snapshots: &[MarketSnapshot]) -> Result<Vec<HeatmapRow>, AlgodeskError> {
        let rows = heatmap::build(snapshots);
        let hot: Vec<&str> = rows
            .iter()
            .filter(|r| r.hot_signal)
            .map(|r| r.symbol.as_str())
            .collect();
        if !hot.is_empty() {
            let message = format!("HEATMAP HOT: {}", hot.join(", "));
            self.notify(AlertCategory::Heatmap, &message)?;
        }
        Ok(rows)
    }
}
