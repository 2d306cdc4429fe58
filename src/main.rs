//! Morning Scan
//!
//! Scales trading risk by how well-rested and active the trader is, then
//! sizes a stop-protected long position from recent market data.

mod api;
mod db;
mod models;
mod report;
mod risk;
mod scanner;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::api::{ChartClient, PriceBarProvider, StaticBars};
use crate::db::Database;
use crate::models::ReadinessInput;
use crate::report::ScanReport;
use crate::risk::{parse_flag, PsychologyScorer, RiskPolicy, StopMode};
use crate::scanner::{validate_readiness, ScanRequest, Scanner};

/// Readiness-aware position sizing CLI.
#[derive(Parser)]
#[command(name = "tradefit")]
#[command(about = "Size today's trades by sleep, exercise, and volatility", long_about = None)]
struct Cli {
    /// Database URL
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:./tradefit.db?mode=rwc")]
    database: String,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(flatten)]
    policy: PolicyArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Risk policy, each field overridable from the environment or `.env`.
#[derive(Args)]
struct PolicyArgs {
    /// Fraction of account value used as bankroll
    #[arg(long, env = "BANKROLL_BASE_PCT", default_value = "1.0")]
    base_pct: f64,

    /// Scale the bankroll by the readiness factor (1/true/yes/y)
    #[arg(
        long,
        env = "BANKROLL_PSYCHOLOGY_SCALE",
        default_value = "true",
        value_parser = parse_flag,
        action = clap::ArgAction::Set
    )]
    psychology_scale: bool,

    /// Fraction of bankroll risked per trade
    #[arg(long, env = "RISK_PER_TRADE_PCT", default_value = "0.01")]
    risk_per_trade_pct: f64,

    /// Stop distance as a fraction of entry
    #[arg(long, env = "STOP_LOSS_PCT", default_value = "0.01")]
    stop_loss_pct: f64,

    /// Stop placement (percent, atr)
    #[arg(long, env = "STOP_MODE", default_value = "percent")]
    stop_mode: StopMode,

    /// ATR multiple for the stop in atr mode
    #[arg(long, env = "ATR_MULTIPLE", default_value = "2.0")]
    atr_multiple: f64,

    /// Number of bars averaged for the ATR
    #[arg(long, env = "ATR_LOOKBACK", default_value = "14")]
    atr_lookback: usize,
}

impl PolicyArgs {
    fn to_policy(&self) -> Result<RiskPolicy> {
        let policy = RiskPolicy {
            base_pct: self.base_pct,
            scale_by_psychology: self.psychology_scale,
            risk_per_trade_pct: self.risk_per_trade_pct,
            stop_loss_pct: self.stop_loss_pct,
            stop_mode: self.stop_mode,
            atr_multiple: self.atr_multiple,
            atr_lookback: self.atr_lookback,
        };
        policy.validate()?;
        Ok(policy)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full morning scan for a symbol and store the result
    Scan {
        /// Ticker symbol
        #[arg(short, long)]
        symbol: String,

        /// Total account value
        #[arg(short, long)]
        total_value: f64,

        /// Hours slept last night (0-12)
        #[arg(long)]
        sleep: f64,

        /// Minutes of exercise (0-120)
        #[arg(long)]
        exercise: u32,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Read bars from a JSON file instead of the network
        #[arg(long)]
        bars_file: Option<PathBuf>,

        /// Don't persist the scan
        #[arg(long)]
        no_save: bool,
    },

    /// Score readiness only
    Score {
        /// Hours slept last night (0-12)
        #[arg(long)]
        sleep: f64,

        /// Minutes of exercise (0-120)
        #[arg(long)]
        exercise: u32,
    },

    /// List stored scans, newest first
    Scans {
        /// Maximum number of scans to show
        #[arg(long, default_value = "50")]
        limit: i64,

        /// Number of scans to skip
        #[arg(long, default_value = "0")]
        offset: i64,

        /// Only scans for this symbol
        #[arg(short, long)]
        symbol: Option<String>,
    },

    /// Show one stored scan
    Show {
        /// Scan id
        id: i64,
    },

    /// Show the effective risk policy
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let policy = cli.policy.to_policy()?;

    match cli.command {
        Commands::Scan {
            symbol,
            total_value,
            sleep,
            exercise,
            json,
            bars_file,
            no_save,
        } => {
            info!(
                symbol = %symbol,
                total_value = total_value,
                stop_mode = %policy.stop_mode,
                "Starting scan"
            );

            let provider: Arc<dyn PriceBarProvider> = match &bars_file {
                Some(path) => Arc::new(StaticBars::from_file(path).await?),
                None => Arc::new(ChartClient::new()?),
            };
            let scanner = Scanner::new(provider, policy);
            let request = ScanRequest::new(symbol, total_value, sleep, exercise);

            let outcome = match scanner.scan(&request).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(code = e.code(), error = %e, "Scan rejected");
                    bail!("Scan rejected ({}): {}", e.code(), e);
                }
            };

            let id = if no_save {
                None
            } else {
                let db = Database::new(&cli.database).await?;
                let id = db.insert_scan(&outcome).await?;
                info!(id = id, "Scan stored");
                Some(id)
            };

            let report = ScanReport::from_outcome(id, &outcome);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report);
            }
        }

        Commands::Score { sleep, exercise } => {
            let readiness = ReadinessInput::new(sleep, exercise);
            if let Err(e) = validate_readiness(&readiness) {
                bail!("Input rejected ({}): {}", e.code(), e);
            }

            let factor = PsychologyScorer::score_input(&readiness);

            println!("\n=== Readiness ===");
            println!("Sleep:     {}h ({})", sleep, factor.sleep_level);
            println!("Exercise:  {} min ({})", exercise, factor.exercise_level);
            println!("Factor:    {:.3}", factor.value);
            println!("Alert:     {}", factor.alert);
            println!("Note:      {}", factor.note);
            if !factor.guidance.is_empty() {
                println!("Guidance:  {}", factor.guidance);
            }
        }

        Commands::Scans {
            limit,
            offset,
            symbol,
        } => {
            let db = Database::new(&cli.database).await?;
            let scans = db.list_scans(limit, offset, symbol.as_deref()).await?;

            if scans.is_empty() {
                println!("No scans stored. Use 'tradefit scan' to run one.");
                return Ok(());
            }

            println!(
                "\n{:>6} {:<20} {:<8} {:>7} {:<16} {:>12} {:>10} {:>10}",
                "ID", "CREATED", "SYMBOL", "FACTOR", "ALERT", "BANKROLL", "ENTRY", "SHARES"
            );
            println!("{}", "-".repeat(96));

            for scan in scans {
                println!(
                    "{:>6} {:<20} {:<8} {:>7.3} {:<16} {:>12.2} {:>10.4} {:>10}",
                    scan.id,
                    scan.created_at.get(..19).unwrap_or(&scan.created_at),
                    truncate(&scan.symbol, 8),
                    scan.psychology_score,
                    scan.psychology_alert,
                    scan.bankroll_amount,
                    scan.entry_price,
                    scan.whole_shares()
                );
            }
        }

        Commands::Show { id } => {
            let db = Database::new(&cli.database).await?;
            let scan = db.get_scan(id).await?.context("Scan not found")?;
            println!("{}", ScanReport::from_stored(&scan));
        }

        Commands::Config => {
            println!("\n=== Risk Policy ===\n");
            println!("Bankroll:");
            println!("  Base Fraction:        {}%", policy.base_pct * 100.0);
            println!("  Psychology Scaling:   {}", if policy.scale_by_psychology { "on" } else { "off" });

            println!("\nPer Trade:");
            println!("  Risk per Trade:       {}%", policy.risk_per_trade_pct * 100.0);
            println!("  Stop Mode:            {}", policy.stop_mode);
            println!("  Stop Loss:            {}%", policy.stop_loss_pct * 100.0);
            println!("  ATR Multiple:         {}", policy.atr_multiple);
            println!("  ATR Lookback:         {} bars", policy.atr_lookback);

            println!("\nStorage:");
            println!("  Database:             {}", cli.database);
        }
    }

    Ok(())
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
