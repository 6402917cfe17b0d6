//! XYwow CLI - billing estimates for the lounge front desk
//! Composition root: wires the clock, snapshot adapter and refresh driver

mod logging;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tabled::{Table, Tabled};
use tracing::info;

use xywow_core::application::refresh::constants::{
    DEFAULT_POLL_INTERVAL, DEFAULT_REFRESH_INTERVAL, TEARDOWN_GRACE_PERIOD,
};
use xywow_core::application::{
    teardown_channel, EstimatorService, LiveEstimate, LiveEstimateRefresher, MemberCard,
    StandingPoller,
};
use xywow_core::domain::{
    combined_discount, discount_factor, discount_label, format_yuan, parse_timestamp,
    AccountStanding, CostEstimate, TieredRateTable, VipProgress, UNCLOSED_LABEL,
};
use xywow_core::port::{FixedTimeProvider, StandingProvider, SystemTimeProvider, TimeProvider};
use xywow_infra_snapshot::{read_play_logs, JsonFileStandingProvider};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "xywow")]
#[command(about = "XYwow lounge billing CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log format: pretty or json
    #[arg(long, env = "XYWOW_LOG_FORMAT", default_value = "pretty", global = true)]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the amount due for a session
    Estimate {
        /// Entry timestamp (epoch ms)
        #[arg(short, long)]
        enter: String,

        /// Reference "now" (epoch ms); defaults to the system clock
        #[arg(long)]
        now: Option<String>,

        /// Lifetime consumption (drives VIP level)
        #[arg(short, long, default_value = "0")]
        consumption: f64,

        /// Account discount multiplier in [0, 1]
        #[arg(short, long, default_value = "1")]
        discount: f64,

        /// Print the estimate as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the tiered rate table
    Rates {
        /// Break down the cost of this many billable hours
        #[arg(long)]
        hours: Option<u32>,
    },

    /// Show VIP level, discount and progress for a spend
    Vip {
        /// Lifetime consumption
        #[arg(short, long)]
        consumption: f64,

        /// Account discount multiplier in [0, 1]
        #[arg(short, long, default_value = "1")]
        discount: f64,
    },

    /// Render a play-log export with recorded and projected costs
    Logs {
        /// JSON array of play logs
        #[arg(short, long)]
        file: PathBuf,

        /// Lifetime consumption used for the projection
        #[arg(short, long, default_value = "0")]
        consumption: f64,

        /// Account discount multiplier used for the projection
        #[arg(short, long, default_value = "1")]
        discount: f64,
    },

    /// Show the member card for an account snapshot
    Card {
        /// Account snapshot JSON
        #[arg(long, env = "XYWOW_SNAPSHOT_PATH")]
        snapshot: PathBuf,
    },

    /// Keep a live estimate on screen while the member is in the venue
    Watch {
        /// Account snapshot JSON (re-read every poll)
        #[arg(long, env = "XYWOW_SNAPSHOT_PATH")]
        snapshot: PathBuf,

        /// Recompute period in seconds
        #[arg(long, env = "XYWOW_REFRESH_INTERVAL_SECS", default_value_t = DEFAULT_REFRESH_INTERVAL.as_secs())]
        interval_secs: u64,

        /// Snapshot poll period in seconds
        #[arg(long, env = "XYWOW_POLL_INTERVAL_SECS", default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
        poll_secs: u64,
    },
}

#[derive(Tabled)]
struct TierRow {
    #[tabled(rename = "Hours")]
    hours: String,
    #[tabled(rename = "Rate")]
    rate: String,
}

#[derive(Tabled)]
struct ChargeRow {
    #[tabled(rename = "Hours")]
    span: String,
    #[tabled(rename = "Count")]
    count: u32,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Subtotal")]
    subtotal: String,
}

#[derive(Tabled)]
struct PlayLogRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Enter")]
    enter: String,
    #[tabled(rename = "Exit")]
    exit: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Recorded")]
    recorded: String,
    #[tabled(rename = "Projected")]
    projected: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_format)?;

    info!("XYwow CLI v{} starting", VERSION);

    match cli.command {
        Commands::Estimate {
            enter,
            now,
            consumption,
            discount,
            json,
        } => {
            let time_provider: Arc<dyn TimeProvider> = match now {
                Some(raw) => Arc::new(FixedTimeProvider::new(parse_timestamp(
                    "referenceTimestamp",
                    &raw,
                )?)),
                None => Arc::new(SystemTimeProvider),
            };
            let service = EstimatorService::new(time_provider);
            let standing = AccountStanding::new(consumption, discount)?;
            let estimate = service.estimate_raw(&enter, &standing)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&estimate)?);
            } else {
                print_estimate(&estimate);
            }
        }

        Commands::Rates { hours } => {
            let table = TieredRateTable::venue();
            println!("{}", "Tiered hourly rates".cyan().bold());
            println!();

            let rows: Vec<TierRow> = table
                .tiers()
                .iter()
                .map(|tier| TierRow {
                    hours: match tier.to_hour {
                        Some(to) => format!("{}-{}", tier.from_hour, to),
                        None => format!("{}+", tier.from_hour),
                    },
                    rate: format!("{}/h", format_yuan(tier.rate)),
                })
                .collect();
            println!("{}", Table::new(rows));
            println!();
            println!(
                "  Final = tiered total x VIP factor (1.0 - 0.005 per level) x account discount"
            );

            if let Some(hours) = hours {
                println!();
                let rows: Vec<ChargeRow> = table
                    .breakdown(hours)
                    .iter()
                    .map(|charge| ChargeRow {
                        span: format!("{}-{}", charge.from_hour, charge.to_hour),
                        count: charge.hours,
                        rate: format_yuan(charge.rate),
                        subtotal: format_yuan(charge.subtotal),
                    })
                    .collect();
                if !rows.is_empty() {
                    println!("{}", Table::new(rows));
                }
                println!(
                    "  {} {} for {} billable hours",
                    "Base cost:".bold(),
                    format_yuan(table.base_cost(hours)).green(),
                    hours
                );
            }
        }

        Commands::Vip {
            consumption,
            discount,
        } => {
            let standing = AccountStanding::new(consumption, discount)?;
            let progress = VipProgress::for_consumption(standing.lifetime_consumption);
            let combined = combined_discount(progress.level, standing.account_discount_multiplier);

            println!("  {} VIP {}", "Level:".bold(), progress.level);
            println!("  {} {:.3}", "VIP factor:".bold(), discount_factor(progress.level));
            println!("  {} {}", "Discount:".bold(), discount_label(combined));
            match progress.next_threshold {
                Some(threshold) => println!(
                    "  {} {}/{} RMB ({:.1}%)",
                    "Progress:".bold(),
                    progress.consumption,
                    threshold,
                    progress.percent
                ),
                None => println!("  {} {}/Max RMB", "Progress:".bold(), progress.consumption),
            }
        }

        Commands::Logs {
            file,
            consumption,
            discount,
        } => {
            let logs = read_play_logs(&file)
                .await
                .with_context(|| format!("Failed to load play logs from {}", file.display()))?;
            let standing = AccountStanding::new(consumption, discount)?;
            let service = EstimatorService::new(Arc::new(SystemTimeProvider));

            let mut rows = Vec::with_capacity(logs.len());
            for entry in &logs {
                let projected = entry.projected_cost(service.estimator(), &standing)?;
                rows.push(PlayLogRow {
                    id: entry.id,
                    enter: local_time(entry.enter_local()),
                    exit: if entry.is_unclosed() {
                        UNCLOSED_LABEL.to_string()
                    } else {
                        local_time(entry.exit_local())
                    },
                    duration: entry.duration_label(),
                    recorded: entry.cost_label(),
                    projected: projected
                        .map(|estimate| format!("{:.2}", estimate.amount_due))
                        .unwrap_or_else(|| "-".to_string()),
                });
            }

            println!("{}", format!("Play logs ({})", rows.len()).cyan().bold());
            println!("{}", Table::new(rows));
        }

        Commands::Card { snapshot } => {
            let provider = JsonFileStandingProvider::new(snapshot);
            let account = provider.fetch().await.with_context(|| {
                format!("Failed to read snapshot {}", provider.path().display())
            })?;
            let service = EstimatorService::new(Arc::new(SystemTimeProvider));
            let card = MemberCard::project(&account, &service)?;
            print_card(&card);
        }

        Commands::Watch {
            snapshot,
            interval_secs,
            poll_secs,
        } => {
            run_watch(snapshot, interval_secs, poll_secs).await?;
        }
    }

    Ok(())
}

async fn run_watch(snapshot: PathBuf, interval_secs: u64, poll_secs: u64) -> Result<()> {
    if interval_secs == 0 || poll_secs == 0 {
        anyhow::bail!("refresh and poll intervals must be at least 1 second");
    }

    let provider: Arc<dyn StandingProvider> = Arc::new(JsonFileStandingProvider::new(&snapshot));
    let (poller, standing_rx) =
        StandingPoller::bootstrap(provider, Duration::from_secs(poll_secs))
            .await
            .with_context(|| format!("Failed to read snapshot {}", snapshot.display()))?;

    let service = Arc::new(EstimatorService::new(Arc::new(SystemTimeProvider)));
    let (refresher, mut estimates) =
        LiveEstimateRefresher::new(service, standing_rx, Duration::from_secs(interval_secs));

    let (view, token) = teardown_channel();
    let poller_handle = tokio::spawn(poller.run(token.clone()));
    let refresher_handle = tokio::spawn(refresher.run(token));

    println!("{}", "Watching live estimate (Ctrl+C to stop)".cyan().bold());

    loop {
        tokio::select! {
            changed = estimates.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = estimates.borrow_and_update().clone();
                match current {
                    LiveEstimate::Pending => {}
                    LiveEstimate::Open(estimate) => print_estimate(&estimate),
                    LiveEstimate::Rejected(reason) => {
                        println!("  {} {}", "✗".red(), reason);
                    }
                    LiveEstimate::Closed => {
                        println!("  {}", "Member not in venue".yellow());
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    view.teardown();
    let _ = tokio::time::timeout(TEARDOWN_GRACE_PERIOD, refresher_handle).await;
    let _ = tokio::time::timeout(TEARDOWN_GRACE_PERIOD, poller_handle).await;

    Ok(())
}

fn print_estimate(estimate: &CostEstimate) {
    println!(
        "  {} {}  {} {}  ({} h, VIP {})",
        "Play time:".bold(),
        estimate.elapsed_label,
        "Estimated:".bold(),
        estimate.display_amount().green(),
        estimate.billable_hours,
        estimate.vip_level
    );
}

fn print_card(card: &MemberCard) {
    let title = card.nickname.as_deref().unwrap_or("Member");
    println!("{}", title.cyan().bold());
    println!();
    if let Some(user_id) = &card.user_id {
        println!("  {} {}", "QQ:".bold(), user_id);
    }
    println!("  {} {}", "Discount:".bold(), card.discount_label);
    println!("  {} {}", "Balance:".bold(), card.balance_label());
    println!("  {} {}", "Consumption:".bold(), format_yuan(card.vip.consumption));
    if let Some(count) = card.play_count {
        println!("  {} {}", "Visits:".bold(), count);
    }
    println!("  {} VIP {}", "Level:".bold(), card.vip.level);
    println!("  {} {}", "Progress:".bold(), card.progress_label());

    let status = if card.in_venue {
        "IN VENUE".green()
    } else {
        "NOT IN VENUE".yellow()
    };
    println!("  {} {}", "Status:".bold(), status);
    if let Some(estimate) = &card.live_estimate {
        print_estimate(estimate);
    }
}

fn local_time(time: Option<chrono::DateTime<chrono::FixedOffset>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}
