//! CLI definition and dispatch.
//!
//! The CLI is a thin presentation layer: it builds a [`Session`] from config,
//! pulls snapshots from the configured feed and prints what the domain
//! returns.

use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_feed::CsvSnapshotFeed;
use crate::adapters::file_audit_log::{FileAuditLog, DEFAULT_AUDIT_PATH};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::simulated_feed::SimulatedFeed;
use crate::adapters::tracing_alert_sink::TracingAlertSink;
use crate::domain::alert::AlertCategory;
use crate::domain::config_validation::{parse_bool, validate_config, TOASTS_KEY};
use crate::domain::error::AlgodeskError;
use crate::domain::heatmap::{HeatmapRow, HEATMAP_COLUMNS};
use crate::domain::instrument::{self, Mode};
use crate::domain::ledger::ExitPolicy;
use crate::domain::order::Order;
use crate::domain::pnl::PnlSummary;
use crate::domain::position::{ClosedTrade, Position};
use crate::domain::session::Session;
use crate::domain::settings::Settings;
use crate::domain::signal::SignalOutcome;
use crate::domain::snapshot::MarketSnapshot;
use crate::ports::config_port::ConfigPort;
use crate::ports::snapshot_port::SnapshotPort;

#[derive(Parser, Debug)]
#[command(name = "algodesk", about = "Simulated futures/options signal desk")]
pub struct Cli {
    /// INI config file; built-in defaults are used when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Override the simulated feed seed
    #[arg(long, global = true)]
    pub seed: Option<u64>,
    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a snapshot table for every symbol in the mode
    Scan {
        #[arg(long)]
        mode: Option<Mode>,
    },
    /// Print the indicator panel for one symbol
    Indicators {
        #[arg(long)]
        symbol: String,
    },
    /// Evaluate the five signal conditions for one symbol
    Signal {
        #[arg(long)]
        symbol: String,
    },
    /// Print the condition heatmap for the current mode
    Heatmap {
        #[arg(long)]
        mode: Option<Mode>,
    },
    /// Run a trading session for a number of ticks
    Run {
        #[arg(long, default_value_t = 10)]
        ticks: u32,
        #[arg(long)]
        mode: Option<Mode>,
    },
    /// Validate a config file
    Validate,
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match cli.config.as_ref() {
        Some(path) => match load_config(path) {
            Ok(c) => c,
            Err(code) => return code,
        },
        None => match FileConfigAdapter::from_string("") {
            Ok(c) => c,
            Err(reason) => {
                error!("{reason}");
                return ExitCode::from(2);
            }
        },
    };

    let result = match cli.command {
        Command::Validate => run_validate(&config),
        Command::Scan { mode } => run_scan(&config, cli.seed, mode),
        Command::Indicators { symbol } => run_indicators(&config, cli.seed, &symbol),
        Command::Signal { symbol } => run_signal(&config, cli.seed, &symbol),
        Command::Heatmap { mode } => run_heatmap(&config, cli.seed, mode),
        Command::Run { ticks, mode } => run_session(&config, cli.seed, ticks, mode),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = AlgodeskError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        error!("{err}");
        ExitCode::from(&err)
    })
}

/// Turn a config into session settings, falling back to defaults for
/// anything not set.
pub fn build_settings(config: &dyn ConfigPort) -> Result<Settings, AlgodeskError> {
    validate_config(config)?;
    let defaults = Settings::default();

    let mode = match config.get_string("account", "mode") {
        Some(m) => m.parse()?,
        None => defaults.mode,
    };

    let mut lot_sizes = defaults.lot_sizes.clone();
    for key in config.section_keys("lot_size") {
        let size = config
            .get_string("lot_size", &key)
            .unwrap_or_default()
            .trim()
            .parse::<u32>()
            .map_err(|e| AlgodeskError::config_invalid("lot_size", &key, e.to_string()))?;
        lot_sizes.insert(&key, size)?;
    }

    let mut alerts = defaults.alerts.clone();
    for key in config.section_keys("alerts") {
        let raw = config.get_string("alerts", &key).unwrap_or_default();
        let enabled = parse_bool(&raw).ok_or_else(|| {
            AlgodeskError::config_invalid("alerts", &key, format!("expected true/false, got '{raw}'"))
        })?;
        if key == TOASTS_KEY {
            alerts.set_toasts(enabled);
        } else {
            alerts.set(key.parse::<AlertCategory>()?, enabled);
        }
    }

    let settings = Settings {
        capital: config.get_double("account", "capital", defaults.capital),
        amount_per_trade: config.get_double("account", "amount_per_trade", defaults.amount_per_trade),
        max_trades_per_symbol: config.get_int(
            "account",
            "max_trades_per_symbol",
            defaults.max_trades_per_symbol as i64,
        ) as usize,
        mode,
        auto_exit: config.get_bool("account", "auto_exit", defaults.auto_exit),
        exit_policy: ExitPolicy {
            stop_loss_offset: config.get_double(
                "risk",
                "stop_loss_offset",
                defaults.exit_policy.stop_loss_offset,
            ),
            take_profit_offset: config.get_double(
                "risk",
                "take_profit_offset",
                defaults.exit_policy.take_profit_offset,
            ),
        },
        lot_sizes,
        alerts,
    };
    settings.validate()?;
    Ok(settings)
}

/// Simulated feed unless `[feed] source = csv`. `seed_override` wins over
/// `[feed] seed`; with neither the simulator is seeded from entropy.
pub fn build_feed(
    config: &dyn ConfigPort,
    seed_override: Option<u64>,
) -> Result<Box<dyn SnapshotPort>, AlgodeskError> {
    let source = config
        .get_string("feed", "source")
        .unwrap_or_else(|| "simulated".to_string())
        .trim()
        .to_lowercase();

    if source == "csv" {
        let path = config
            .get_string("feed", "path")
            .ok_or_else(|| AlgodeskError::ConfigMissing {
                section: "feed".into(),
                key: "path".into(),
            })?;
        info!(path = %path, "replaying snapshots from CSV");
        return Ok(Box::new(CsvSnapshotFeed::from_file(path.trim())?));
    }

    let seed = match seed_override {
        Some(s) => Some(s),
        None => config
            .get_string("feed", "seed")
            .map(|s| s.trim().parse::<u64>())
            .transpose()
            .map_err(|e| AlgodeskError::config_invalid("feed", "seed", e.to_string()))?,
    };
    Ok(match seed {
        Some(s) => {
            info!(seed = s, "simulated feed");
            Box::new(SimulatedFeed::new(s))
        }
        None => Box::new(SimulatedFeed::from_entropy()),
    })
}

pub fn build_session(config: &dyn ConfigPort, settings: Settings) -> Result<Session, AlgodeskError> {
    let audit_path = config
        .get_string("audit", "path")
        .unwrap_or_else(|| DEFAULT_AUDIT_PATH.to_string());
    let audit = FileAuditLog::new(audit_path.trim())?;
    Session::new(settings, Box::new(TracingAlertSink::new()), Box::new(audit))
}

fn run_validate(config: &dyn ConfigPort) -> Result<(), AlgodeskError> {
    let settings = build_settings(config)?;
    println!("Config is valid");
    println!("  mode:                  {}", settings.mode);
    println!("  capital:               {}", settings.capital);
    println!("  amount per trade:      {}", settings.amount_per_trade);
    println!("  max trades per symbol: {}", settings.max_trades_per_symbol);
    println!(
        "  stop-loss / take-profit offsets: {} / {}",
        settings.exit_policy.stop_loss_offset, settings.exit_policy.take_profit_offset
    );
    Ok(())
}

fn run_scan(config: &dyn ConfigPort, seed: Option<u64>, mode: Option<Mode>) -> Result<(), AlgodeskError> {
    let settings = build_settings(config)?;
    let mode = mode.unwrap_or(settings.mode);
    let mut feed = build_feed(config, seed)?;
    let snapshots = feed.snapshots(&instrument::symbols(mode))?;
    println!(
        "MODE: {}  ATM: {}  expiry: {}",
        mode,
        instrument::atm_symbol(mode),
        instrument::expiry(chrono::Local::now().date_naive()).format("%d-%m-%Y")
    );
    print!("{}", render_snapshot_table(&snapshots));
    Ok(())
}

fn run_indicators(config: &dyn ConfigPort, seed: Option<u64>, symbol: &str) -> Result<(), AlgodeskError> {
    let mut feed = build_feed(config, seed)?;
    let snapshot = feed.snapshot(&symbol.to_uppercase())?;
    print!("{}", render_indicator_panel(&snapshot));
    Ok(())
}

fn run_signal(config: &dyn ConfigPort, seed: Option<u64>, symbol: &str) -> Result<(), AlgodeskError> {
    let settings = build_settings(config)?;
    let mut session = build_session(config, settings)?;
    let mut feed = build_feed(config, seed)?;
    let snapshot = feed.snapshot(&symbol.to_uppercase())?;
    let outcome = session.validate_signal(&snapshot)?;
    print!("{}", render_outcome(&outcome));
    Ok(())
}

fn run_heatmap(config: &dyn ConfigPort, seed: Option<u64>, mode: Option<Mode>) -> Result<(), AlgodeskError> {
    let settings = build_settings(config)?;
    let mode = mode.unwrap_or(settings.mode);
    let mut session = build_session(config, settings)?;
    let mut feed = build_feed(config, seed)?;
    let snapshots = feed.snapshots(&instrument::symbols(mode))?;
    let rows = session.heatmap(&snapshots)?;
    print!("{}", render_heatmap(&rows));
    Ok(())
}

fn run_session(
    config: &dyn ConfigPort,
    seed: Option<u64>,
    ticks: u32,
    mode: Option<Mode>,
) -> Result<(), AlgodeskError> {
    let mut settings = build_settings(config)?;
    if let Some(m) = mode {
        settings.mode = m;
    }
    let mut session = build_session(config, settings)?;
    let mut feed = build_feed(config, seed)?;

    let closed = drive_session(&mut session, feed.as_mut(), ticks)?;

    println!("=== Positions ===");
    print!("{}", render_positions(session.ledger().positions()));
    println!("\n=== Order Book ===");
    print!("{}", render_orders(session.ledger().orders()));
    if !closed.is_empty() {
        println!("\n=== Closed Trades ===");
        print!("{}", render_closed(&closed));
    }
    println!("\n=== Profit & Loss ===");
    print!("{}", render_pnl(&session.pnl()));
    Ok(())
}

/// One heartbeat per tick, then evaluate and trade every symbol of the
/// session's mode and mark positions at the tick's spot prices. Stops early
/// when the feed runs out of data. Returns the trades closed by auto exit.
pub fn drive_session(
    session: &mut Session,
    feed: &mut dyn SnapshotPort,
    ticks: u32,
) -> Result<Vec<ClosedTrade>, AlgodeskError> {
    let mut closed = Vec::new();
    let symbols = instrument::symbols(session.settings().mode);

    for tick in 1..=ticks {
        session.heartbeat()?;
        let mut prices = HashMap::new();
        let mut exhausted = false;
        for symbol in &symbols {
            let snapshot = match feed.snapshot(symbol) {
                Ok(s) => s,
                Err(AlgodeskError::NoData { symbol }) => {
                    warn!(tick, %symbol, "feed exhausted, ending session");
                    exhausted = true;
                    break;
                }
                Err(e) => return Err(e),
            };
            prices.insert(snapshot.symbol.clone(), snapshot.spot);
            let outcome = session.validate_signal(&snapshot)?;
            if outcome.verified {
                session.execute_signal(&snapshot)?;
            }
        }
        // Prices already read this tick still get marked.
        closed.extend(session.mark_to_market(&prices)?);
        if exhausted {
            break;
        }
    }
    Ok(closed)
}

pub fn render_snapshot_table(snapshots: &[MarketSnapshot]) -> String {
    let mut out = format!(
        "{:<20} {:>9} {:>9} {:>9} {:>9} {:>9} {:>6} {:>6} {:>6} {:>9} {:>9} {:>9} {:>5}\n",
        "symbol", "spot", "open", "high", "low", "close", "vol", "rsi", "macd", "bb_up", "bb_mid", "bb_low", "trend"
    );
    for s in snapshots {
        out.push_str(&format!(
            "{:<20} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>6} {:>6.2} {:>6.2} {:>9.2} {:>9.2} {:>9.2} {:>5}\n",
            s.symbol, s.spot, s.open, s.high, s.low, s.close, s.volume, s.rsi, s.macd,
            s.bb_upper, s.bb_middle, s.bb_lower, s.supertrend.to_string()
        ));
    }
    out
}

pub fn render_indicator_panel(s: &MarketSnapshot) -> String {
    let trend_mark = if s.supertrend.is_up() { "up" } else { "down" };
    let macd_mark = if s.macd > 0.0 { "positive" } else { "negative" };
    let rows: [(&str, String, &str); 7] = [
        ("Supertrend", s.supertrend.to_string(), trend_mark),
        ("BB Upper", format!("{:.2}", s.bb_upper), ""),
        ("BB Middle", format!("{:.2}", s.bb_middle), ""),
        ("BB Lower", format!("{:.2}", s.bb_lower), ""),
        ("RSI", format!("{:.2}", s.rsi), ""),
        ("MACD", format!("{:.2}", s.macd), macd_mark),
        ("Spot Price", format!("{:.2}", s.spot), ""),
    ];
    let mut out = format!("{} indicators\n{:<12} {:>10} {}\n", s.symbol, "Indicator", "Value", "Status");
    for (name, value, status) in rows {
        out.push_str(&format!("{:<12} {:>10} {}\n", name, value, status));
    }
    out
}

pub fn render_outcome(outcome: &SignalOutcome) -> String {
    let mut out = format!("{:<28} {:<6} {}\n", "Condition", "Status", "Color");
    for c in &outcome.conditions {
        out.push_str(&format!(
            "{:<28} {:<6} {}\n",
            c.name,
            if c.passed { "PASS" } else { "FAIL" },
            c.tag.to_string()
        ));
    }
    if outcome.hot {
        out.push_str("HOT SIGNAL\n");
    }
    if outcome.verified {
        out.push_str("VERIFIED SIGNAL\n");
    }
    out
}

pub fn render_heatmap(rows: &[HeatmapRow]) -> String {
    let mut out = format!("{:<20}", "symbol");
    for col in HEATMAP_COLUMNS {
        out.push_str(&format!(" {:>12}", col));
    }
    out.push('\n');
    for row in rows {
        out.push_str(&format!("{:<20}", row.symbol));
        for cell in row.cells() {
            out.push_str(&format!(" {:>12}", cell));
        }
        out.push('\n');
    }
    out
}

pub fn render_positions(positions: &[Position]) -> String {
    if positions.is_empty() {
        return "(no open positions)\n".to_string();
    }
    let mut out = format!(
        "{:>3} {:<20} {:<4} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {}\n",
        "#", "symbol", "side", "qty", "avg", "ltp", "pnl", "sl", "tp", "entry"
    );
    for (i, p) in positions.iter().enumerate() {
        out.push_str(&format!(
            "{:>3} {:<20} {:<4} {:>6} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {}\n",
            i,
            p.symbol,
            p.side.to_string(),
            p.qty,
            p.avg_price,
            p.last_price,
            p.pnl,
            p.stop_loss,
            p.take_profit,
            p.entry_time.format("%H:%M:%S")
        ));
    }
    out
}

pub fn render_orders(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "(no orders)\n".to_string();
    }
    let mut out = format!(
        "{:<20} {:<20} {:<4} {:<6} {:<8} {:<8} {:>6} {:>10}\n",
        "order_id", "symbol", "side", "type", "status", "time", "qty", "price"
    );
    for o in orders {
        out.push_str(&format!(
            "{:<20} {:<20} {:<4} {:<6} {:<8} {:<8} {:>6} {:>10.2}\n",
            o.order_id,
            o.symbol,
            o.side.to_string(),
            o.order_type.to_string(),
            o.status.to_string(),
            o.timestamp.format("%H:%M:%S"),
            o.qty,
            o.price
        ));
    }
    out
}

pub fn render_closed(trades: &[ClosedTrade]) -> String {
    let mut out = String::new();
    for t in trades {
        out.push_str(&format!(
            "{:<20} {:<4} {:>6} {:>10.2} -> {:>10.2} {:>10.2} {}\n",
            t.symbol,
            t.side.to_string(),
            t.qty,
            t.entry_price,
            t.exit_price,
            t.pnl,
            t.reason
        ));
    }
    out
}

pub fn render_pnl(summary: &PnlSummary) -> String {
    format!(
        "Net Profit: {:.2}\nWin Rate:   {:.2}%\nROI:        {:.2}%\n",
        summary.net_profit, summary.win_rate, summary.roi
    )
}
