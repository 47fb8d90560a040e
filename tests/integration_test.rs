//! Session-level integration tests.
//!
//! Drive a [`Session`] through signal validation, order placement, marking
//! and exits with recording alert and audit ports.

mod common;

use algodesk::cli::drive_session;
use algodesk::domain::alert::AlertCategory;
use algodesk::domain::error::AlgodeskError;
use algodesk::domain::instrument::Mode;
use algodesk::domain::order::{OrderType, Side};
use algodesk::domain::position::ExitReason;
use algodesk::domain::settings::Settings;
use approx::assert_relative_eq;
use common::*;
use std::collections::HashMap;

fn prices(entries: &[(&str, f64)]) -> HashMap<String, f64> {
    entries
        .iter()
        .map(|(s, p)| (s.to_string(), *p))
        .collect()
}

mod signal_to_order {
    use super::*;

    #[test]
    fn verified_signal_places_sized_buy() {
        let (mut session, alerts, audit) = make_session(Settings::default());
        let snap = verified_snapshot("NIFTY_FUT", 48700.0);

        let outcome = session.validate_signal(&snap).unwrap();
        assert!(outcome.verified && outcome.hot);
        assert_eq!(session.verified_signals(), ["NIFTY_FUT".to_string()]);

        let order = session.execute_signal(&snap).unwrap().unwrap();
        assert_eq!(order.side, Side::Buy);
        assert_eq!(order.order_type, OrderType::Market);
        // 10000 per trade / lot size 50
        assert_eq!(order.qty, 200);
        assert_relative_eq!(order.price, 48700.0);

        let position = &session.ledger().positions()[0];
        assert_relative_eq!(position.stop_loss, 48600.0);
        assert_relative_eq!(position.take_profit, 48850.0);

        assert_eq!(alerts.count(AlertCategory::VerifiedSignal), 1);
        assert_eq!(alerts.count(AlertCategory::OrderPlaced), 1);
        assert!(audit.contains("VERIFIED SIGNAL: NIFTY_FUT"));
        assert!(audit.contains(&format!("Order Placed: {}", order.order_id)));
    }

    #[test]
    fn unverified_symbol_cannot_trade() {
        let (mut session, _, _) = make_session(Settings::default());
        let snap = quiet_snapshot("NIFTY_FUT", 48500.0);
        let outcome = session.validate_signal(&snap).unwrap();
        assert!(!outcome.hot);
        assert_eq!(outcome.passed_count(), 0);

        let err = session.execute_signal(&snap).unwrap_err();
        assert!(matches!(err, AlgodeskError::InvalidArgument { .. }));
        assert!(session.ledger().orders().is_empty());
    }

    #[test]
    fn unknown_symbol_sizes_with_default_lot() {
        let (mut session, _, _) = make_session(Settings::default());
        let snap = verified_snapshot("MIDCAP_FUT", 48700.0);
        session.validate_signal(&snap).unwrap();
        let order = session.execute_signal(&snap).unwrap().unwrap();
        assert_eq!(order.qty, 10_000);
    }

    #[test]
    fn capacity_caps_positions_per_symbol() {
        let (mut session, _, _) = make_session(Settings::default());
        let snap = verified_snapshot("BANKNIFTY_FUT", 48400.0);
        session.validate_signal(&snap).unwrap();

        assert!(session.execute_signal(&snap).unwrap().is_some());
        assert!(session.execute_signal(&snap).unwrap().is_some());
        assert!(session.is_at_capacity("BANKNIFTY_FUT"));
        assert!(session.execute_signal(&snap).unwrap().is_none());

        assert_eq!(session.ledger().position_count_for("BANKNIFTY_FUT"), 2);
        assert_eq!(session.ledger().orders().len(), 2);
    }

    #[test]
    fn order_ids_are_unique_within_a_tick() {
        let (mut session, _, _) = make_session(Settings {
            max_trades_per_symbol: 5,
            ..Settings::default()
        });
        for _ in 0..5 {
            session
                .place_order("NIFTY_FUT", Side::Buy, 1, 48500.0, OrderType::Market)
                .unwrap();
        }
        let mut ids: Vec<&str> = session
            .ledger()
            .orders()
            .iter()
            .map(|o| o.order_id.as_str())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn invalid_orders_rejected() {
        let (mut session, _, audit) = make_session(Settings::default());
        assert!(session
            .place_order("NIFTY_FUT", Side::Buy, 0, 48500.0, OrderType::Market)
            .is_err());
        assert!(session
            .place_order("NIFTY_FUT", Side::Buy, 1, -1.0, OrderType::Limit)
            .is_err());
        assert!(session
            .place_order("", Side::Sell, 1, 48500.0, OrderType::Market)
            .is_err());
        assert!(session.ledger().orders().is_empty());
        assert_eq!(audit.len(), 0);
    }
}

mod exits {
    use super::*;

    fn session_with_long() -> (algodesk::domain::session::Session, RecordingAlerts) {
        let (mut session, alerts, _) = make_session(Settings::default());
        let snap = verified_snapshot("NIFTY_FUT", 48700.0);
        session.validate_signal(&snap).unwrap();
        session.execute_signal(&snap).unwrap();
        (session, alerts)
    }

    #[test]
    fn stop_loss_closes_at_boundary() {
        let (mut session, alerts) = session_with_long();
        let closed = session
            .mark_to_market(&prices(&[("NIFTY_FUT", 48600.0)]))
            .unwrap();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].reason, ExitReason::StopLoss);
        assert_relative_eq!(closed[0].pnl, -20_000.0);
        assert!(session.ledger().positions().is_empty());
        assert_eq!(session.stats().sl_count, 1);
        assert_eq!(alerts.count(AlertCategory::PositionExit), 1);
    }

    #[test]
    fn take_profit_closes_at_boundary() {
        let (mut session, _) = session_with_long();
        let closed = session
            .mark_to_market(&prices(&[("NIFTY_FUT", 48850.0)]))
            .unwrap();
        assert_eq!(closed[0].reason, ExitReason::TakeProfit);
        assert_eq!(session.stats().tp_count, 1);
        assert_relative_eq!(session.pnl().win_rate, 100.0);
    }

    #[test]
    fn price_between_levels_keeps_position() {
        let (mut session, _) = session_with_long();
        let closed = session
            .mark_to_market(&prices(&[("NIFTY_FUT", 48750.0)]))
            .unwrap();
        assert!(closed.is_empty());

        let summary = session.pnl();
        assert_relative_eq!(summary.net_profit, 10_000.0);
        assert_relative_eq!(summary.roi, 5.0);
        assert_relative_eq!(summary.win_rate, 0.0);
    }

    #[test]
    fn auto_exit_off_only_marks() {
        let (mut session, _, _) = make_session(Settings {
            auto_exit: false,
            ..Settings::default()
        });
        let snap = verified_snapshot("NIFTY_FUT", 48700.0);
        session.validate_signal(&snap).unwrap();
        session.execute_signal(&snap).unwrap();

        let closed = session
            .mark_to_market(&prices(&[("NIFTY_FUT", 48000.0)]))
            .unwrap();
        assert!(closed.is_empty());
        assert_relative_eq!(session.ledger().positions()[0].last_price, 48000.0);
    }

    #[test]
    fn manual_exit_and_out_of_range() {
        let (mut session, alerts) = session_with_long();
        let err = session.exit_position(3).unwrap_err();
        assert!(matches!(err, AlgodeskError::OutOfRange { index: 3, len: 1 }));

        let trade = session.exit_position(0).unwrap();
        assert_eq!(trade.reason, ExitReason::Manual);
        assert_eq!(session.ledger().closed_trades().len(), 1);
        assert_eq!(session.stats().tp_count + session.stats().sl_count, 0);
        assert!(alerts.messages().iter().any(|m| m.contains("Exited NIFTY_FUT")));
    }

    #[test]
    fn panic_exit_flattens_and_halts() {
        let (mut session, _) = session_with_long();
        session
            .place_order("BANKNIFTY_FUT", Side::Sell, 25, 48300.0, OrderType::Market)
            .unwrap();

        assert_eq!(session.panic_exit().unwrap(), 2);
        assert!(session.is_halted());
        assert!(session.ledger().positions().is_empty());

        let snap = verified_snapshot("NIFTY_FUT", 48700.0);
        assert!(matches!(
            session.execute_signal(&snap),
            Err(AlgodeskError::EngineHalted)
        ));
        assert!(matches!(
            session.place_order("NIFTY_FUT", Side::Buy, 1, 1.0, OrderType::Market),
            Err(AlgodeskError::EngineHalted)
        ));
    }
}

mod alerts_and_audit {
    use super::*;

    #[test]
    fn disabled_category_still_audited() {
        let mut settings = Settings::default();
        settings.alerts.set(AlertCategory::Heartbeat, false);
        let (mut session, alerts, audit) = make_session(settings);

        assert_eq!(session.heartbeat().unwrap(), 1);
        assert_eq!(alerts.count(AlertCategory::Heartbeat), 0);
        assert!(audit.contains("Heartbeat Alive"));

        session.set_alert(AlertCategory::Heartbeat, true);
        session.heartbeat().unwrap();
        assert_eq!(alerts.count(AlertCategory::Heartbeat), 1);
        assert_eq!(session.heartbeat_count(), 2);
    }

    #[test]
    fn audit_lines_carry_timestamp() {
        let (mut session, _, audit) = make_session(Settings::default());
        session.reconnect_feed().unwrap();
        let lines = audit.lines.borrow();
        assert_eq!(
            lines[0],
            "2024-03-01 09:15:00.000000 - WebSocket Reconnected\n"
        );
    }

    #[test]
    fn heatmap_alerts_hot_rows() {
        let (mut session, alerts, _) = make_session(Settings::default());
        let rows = session
            .heatmap(&[
                verified_snapshot("NIFTY_FUT", 48700.0),
                quiet_snapshot("BANKNIFTY_FUT", 48300.0),
            ])
            .unwrap();
        assert!(rows[0].hot_signal);
        assert!(!rows[1].hot_signal);
        assert_eq!(alerts.messages(), vec!["HEATMAP HOT: NIFTY_FUT".to_string()]);
    }
}

mod session_loop {
    use super::*;

    #[test]
    fn loop_trades_then_takes_profit() {
        let (mut session, alerts, _) = make_session(Settings::default());
        let mut feed = ScriptedFeed::new()
            .push(verified_snapshot("NIFTY_FUT", 48700.0))
            .push(quiet_snapshot("BANKNIFTY_FUT", 48300.0))
            .push(quiet_snapshot("FINNIFTY_FUT", 48100.0))
            .push(quiet_snapshot("NIFTY_FUT", 48900.0))
            .push(quiet_snapshot("BANKNIFTY_FUT", 48300.0))
            .push(quiet_snapshot("FINNIFTY_FUT", 48100.0));

        let closed = drive_session(&mut session, &mut feed, 2).unwrap();

        assert_eq!(session.heartbeat_count(), 2);
        assert_eq!(session.ledger().orders().len(), 1);
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].reason, ExitReason::TakeProfit);
        assert_relative_eq!(closed[0].pnl, 40_000.0);
        assert_eq!(alerts.count(AlertCategory::Heartbeat), 2);
    }

    #[test]
    fn loop_stops_when_feed_runs_dry() {
        let (mut session, _, _) = make_session(Settings::default());
        let mut feed = ScriptedFeed::new()
            .push(quiet_snapshot("NIFTY_FUT", 48500.0))
            .push(quiet_snapshot("BANKNIFTY_FUT", 48300.0))
            .push(quiet_snapshot("FINNIFTY_FUT", 48100.0));

        let closed = drive_session(&mut session, &mut feed, 5).unwrap();
        assert!(closed.is_empty());
        assert_eq!(session.heartbeat_count(), 2);
    }

    #[test]
    fn partial_tick_still_marks_read_prices() {
        let (mut session, _, _) = make_session(Settings::default());
        let mut feed = ScriptedFeed::new()
            .push(verified_snapshot("NIFTY_FUT", 48700.0))
            .push(quiet_snapshot("BANKNIFTY_FUT", 48300.0))
            .push(quiet_snapshot("FINNIFTY_FUT", 48100.0))
            .push(quiet_snapshot("NIFTY_FUT", 48900.0));

        let closed = drive_session(&mut session, &mut feed, 5).unwrap();

        assert_eq!(session.heartbeat_count(), 2);
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].reason, ExitReason::TakeProfit);
        assert_relative_eq!(closed[0].exit_price, 48900.0);
        assert_eq!(session.ledger().position_count(), 0);
    }

    #[test]
    fn options_mode_uses_option_symbols() {
        let (mut session, _, _) = make_session(Settings::default());
        session.set_mode(Mode::Options);
        let mut feed = ScriptedFeed::new()
            .push(verified_snapshot("NIFTY_CE_20000", 48120.0))
            .push(quiet_snapshot("NIFTY_PE_19000", 48100.0))
            .push(quiet_snapshot("BANKNIFTY_CE_52000", 48200.0));

        drive_session(&mut session, &mut feed, 1).unwrap();
        let order = &session.ledger().orders()[0];
        assert_eq!(order.symbol, "NIFTY_CE_20000");
        assert_eq!(order.side, Side::Buy);
    }
}
