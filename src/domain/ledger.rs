//! In-memory order book and open-position store.
//!
//! Every order opens exactly one position. Orders are append-only; positions
//! leave the ledger through [`Ledger::exit_position`] or
//! [`Ledger::close_position`], which move them into the closed-trade history.
//!
//! The per-symbol capacity gate ([`Ledger::is_at_capacity`]) is a caller
//! precondition and is not enforced by [`Ledger::place_order`].

use chrono::NaiveDateTime;
use std::collections::HashMap;
use tracing::{debug, info};

use super::error::AlgodeskError;
use super::order::{Order, OrderIdGenerator, OrderStatus, OrderType, Side};
use super::position::{ClosedTrade, ExitReason, Position};

/// Fixed price offsets used to derive stop-loss and take-profit levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitPolicy {
    pub stop_loss_offset: f64,
    pub take_profit_offset: f64,
}

impl Default for ExitPolicy {
    fn default() -> Self {
        ExitPolicy {
            stop_loss_offset: 100.0,
            take_profit_offset: 150.0,
        }
    }
}

impl ExitPolicy {
    /// Both offsets must be finite and strictly positive. A zero offset puts
    /// the level on the entry price, so the first mark would close the trade.
    pub fn validate(&self) -> Result<(), AlgodeskError> {
        for (key, value) in [
            ("stop_loss_offset", self.stop_loss_offset),
            ("take_profit_offset", self.take_profit_offset),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AlgodeskError::config_invalid(
                    "risk",
                    key,
                    format!("{key} must be a positive number, got {value}"),
                ));
            }
        }
        Ok(())
    }

    /// `(stop_loss, take_profit)` for an entry at `price`. Levels sit below
    /// and above the entry for buys and are mirrored for sells.
    pub fn levels(&self, side: Side, price: f64) -> (f64, f64) {
        match side {
            Side::Buy => (
                price - self.stop_loss_offset,
                price + self.take_profit_offset,
            ),
            Side::Sell => (
                price + self.stop_loss_offset,
                price - self.take_profit_offset,
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    orders: Vec<Order>,
    positions: Vec<Position>,
    closed_trades: Vec<ClosedTrade>,
    ids: OrderIdGenerator,
    exit_policy: ExitPolicy,
}

impl Ledger {
    pub fn new(exit_policy: ExitPolicy) -> Self {
        Ledger {
            exit_policy,
            ..Ledger::default()
        }
    }

    pub fn exit_policy(&self) -> ExitPolicy {
        self.exit_policy
    }

    /// Applies to positions opened after the call.
    pub fn set_exit_policy(&mut self, exit_policy: ExitPolicy) {
        self.exit_policy = exit_policy;
    }

    pub fn place_order(
        &mut self,
        symbol: &str,
        side: Side,
        qty: i64,
        price: f64,
        order_type: OrderType,
        at: NaiveDateTime,
    ) -> Result<Order, AlgodeskError> {
        if symbol.trim().is_empty() {
            return Err(AlgodeskError::invalid_argument("symbol must not be empty"));
        }
        if qty <= 0 {
            return Err(AlgodeskError::invalid_argument(format!(
                "quantity must be positive, got {qty}"
            )));
        }
        let qty = u32::try_from(qty).map_err(|_| {
            AlgodeskError::invalid_argument(format!("quantity {qty} exceeds the maximum"))
        })?;
        if !price.is_finite() || price <= 0.0 {
            return Err(AlgodeskError::invalid_argument(format!(
                "price must be positive, got {price}"
            )));
        }

        let order = Order {
            order_id: self.ids.next_id(at),
            symbol: symbol.to_string(),
            side,
            order_type,
            status: OrderStatus::Complete,
            timestamp: at,
            qty,
            price,
        };

        let (stop_loss, take_profit) = self.exit_policy.levels(side, price);
        self.positions.push(Position {
            symbol: symbol.to_string(),
            side,
            qty,
            avg_price: price,
            last_price: price,
            pnl: 0.0,
            stop_loss,
            take_profit,
            entry_time: at,
        });
        self.orders.push(order.clone());

        info!(
            order_id = %order.order_id,
            symbol,
            side = %side,
            qty,
            price,
            "order placed"
        );
        Ok(order)
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn closed_trades(&self) -> &[ClosedTrade] {
        &self.closed_trades
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn position_count_for(&self, symbol: &str) -> usize {
        self.positions.iter().filter(|p| p.symbol == symbol).count()
    }

    pub fn is_at_capacity(&self, symbol: &str, max_trades_per_symbol: usize) -> bool {
        self.position_count_for(symbol) >= max_trades_per_symbol
    }

    /// Manual exit by position index.
    pub fn exit_position(
        &mut self,
        index: usize,
        at: NaiveDateTime,
    ) -> Result<ClosedTrade, AlgodeskError> {
        self.close_position(index, ExitReason::Manual, at)
    }

    pub fn close_position(
        &mut self,
        index: usize,
        reason: ExitReason,
        at: NaiveDateTime,
    ) -> Result<ClosedTrade, AlgodeskError> {
        if index >= self.positions.len() {
            return Err(AlgodeskError::OutOfRange {
                index,
                len: self.positions.len(),
            });
        }
        let position = self.positions.remove(index);
        let trade = ClosedTrade::from_position(position, at, reason);
        debug!(
            symbol = %trade.symbol,
            reason = %reason,
            pnl = trade.pnl,
            "position closed"
        );
        self.closed_trades.push(trade.clone());
        Ok(trade)
    }

    /// Close every open position, oldest first.
    pub fn close_all(&mut self, reason: ExitReason, at: NaiveDateTime) -> Vec<ClosedTrade> {
        let drained: Vec<Position> = self.positions.drain(..).collect();
        let trades: Vec<ClosedTrade> = drained
            .into_iter()
            .map(|p| ClosedTrade::from_position(p, at, reason))
            .collect();
        self.closed_trades.extend(trades.iter().cloned());
        trades
    }

    /// Mark every position whose symbol has a price. Returns how many were
    /// marked.
    pub fn mark_to_market(&mut self, prices: &HashMap<String, f64>) -> usize {
        let mut marked = 0;
        for position in &mut self.positions {
            if let Some(&price) = prices.get(&position.symbol) {
                position.mark(price);
                marked += 1;
            }
        }
        marked
    }

    /// Indices of positions whose last price has crossed a stop-loss or
    /// take-profit level, in ascending order.
    pub fn triggered_exits(&self) -> Vec<(usize, ExitReason)> {
        self.positions
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.triggered_exit().map(|reason| (i, reason)))
            .collect()
    }
}
