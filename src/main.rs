//! DataPulse CLI
//!
//! Drives the refresh core against a running DataPulse backend.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use datapulse::{
    client::ApiClient, config::LoggingConfig, BackendApi, DashboardConfig, DashboardEvent,
    RefreshController, RefreshCoordinator, RefreshInterval, SourceId, ToastChannel,
    TracingReporter,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Command-line arguments
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, short, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Command to execute (defaults to `run`)
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Keep the dashboard data fresh until Ctrl+C
    Run {
        /// Enable auto-refresh regardless of the config file
        #[arg(long)]
        auto: bool,

        /// Auto-refresh interval in seconds (15, 30, 60 or 300)
        #[arg(long, value_parser = parse_interval)]
        interval: Option<RefreshInterval>,
    },
    /// Refresh every source once and print a summary
    Once,
    /// Print the backend health report
    Health,
    /// Print historical chart data for one asset
    History {
        kind: HistoryKind,

        symbol: String,

        /// Days of crypto history (e.g. 1, 7, 30) or stock period (1H, 1D, 1W, 1M, 3M, 1Y)
        #[arg(long)]
        range: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum HistoryKind {
    Crypto,
    Stock,
}

impl HistoryKind {
    fn default_range(&self) -> &'static str {
        match self {
            HistoryKind::Crypto => "1",
            HistoryKind::Stock => "1D",
        }
    }
}

fn parse_interval(raw: &str) -> Result<RefreshInterval, String> {
    let secs: u64 = raw
        .parse()
        .map_err(|_| format!("not a number of seconds: {}", raw))?;
    RefreshInterval::try_from(secs).map_err(|e| e.to_string())
}

/// Backend for one-shot commands; transport failures are logged as they happen
fn reporting_backend(config: &DashboardConfig) -> anyhow::Result<BackendApi> {
    let client = ApiClient::new(&config.api)?.with_reporter(Arc::new(TracingReporter));
    Ok(BackendApi::with_client(client))
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("datapulse={}", config.level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = DashboardConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    init_logging(&config.logging);
    tracing::info!(
        api = %config.api.base_url,
        "DataPulse v{}",
        env!("CARGO_PKG_VERSION")
    );

    match args.command.unwrap_or(Command::Run {
        auto: false,
        interval: None,
    }) {
        Command::Run { auto, interval } => run(config, auto, interval).await,
        Command::Once => once(config).await,
        Command::Health => {
            let backend = reporting_backend(&config)?;
            let report = backend.health().await.context("Health check failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::History {
            kind,
            symbol,
            range,
        } => {
            let backend = reporting_backend(&config)?;
            let range = range.unwrap_or_else(|| kind.default_range().to_string());
            let data = match kind {
                HistoryKind::Crypto => backend.crypto_history(&symbol, &range).await?,
                HistoryKind::Stock => {
                    backend
                        .stock_history(&symbol.to_uppercase(), &range)
                        .await?
                }
            };
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(())
        }
    }
}

async fn run(
    config: DashboardConfig,
    auto: bool,
    interval: Option<RefreshInterval>,
) -> anyhow::Result<()> {
    let toasts = Arc::new(ToastChannel::default());
    let coordinator = Arc::new(RefreshCoordinator::from_config(
        config.clone(),
        toasts.clone(),
    )?);

    let mut auto_refresh = config.auto_refresh;
    auto_refresh.enabled |= auto;
    if let Some(interval) = interval {
        auto_refresh.interval = interval;
    }

    let mut events = coordinator.subscribe();
    let mut toast_rx = toasts.subscribe();
    let controller = RefreshController::spawn(coordinator.clone(), &auto_refresh);
    let mut views = controller.subscribe();
    if !auto_refresh.enabled {
        controller.press().await?;
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut last_error: Option<String> = None;

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                }
                tracing::info!("Shutting down...");
                break;
            }
            event = events.recv() => match event {
                Ok(DashboardEvent::RefreshCompleted { .. }) => {
                    print_last_updated(&coordinator).await;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Dashboard event receiver lagged");
                }
                Err(RecvError::Closed) => break,
            },
            toast = toast_rx.recv() => {
                if let Ok(toast) = toast {
                    eprintln!("! {}", toast);
                }
            }
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let error = views.borrow_and_update().error_message().map(str::to_string);
                if error != last_error {
                    if let Some(message) = &error {
                        eprintln!(
                            "! Refresh failed: {} (press retry or wait for auto-refresh)",
                            message
                        );
                    }
                    last_error = error;
                }
            }
        }
    }

    controller.shutdown().await?;
    Ok(())
}

async fn once(config: DashboardConfig) -> anyhow::Result<()> {
    let coordinator = RefreshCoordinator::from_config(config, Arc::new(TracingReporter))?;
    let summary = coordinator
        .refresh_backend_then_all()
        .await
        .context("Backend refresh failed")?;

    for outcome in &summary.outcomes {
        match &outcome.result {
            Ok(payload) => println!(
                "{:<13} ok     {:>3} items  {:>5}ms",
                outcome.source.name(),
                payload.len(),
                outcome.latency.as_millis()
            ),
            Err(e) => println!("{:<13} failed {}", outcome.source.name(), e),
        }
    }

    if summary.all_failed() {
        anyhow::bail!("every data source failed");
    }
    Ok(())
}

async fn print_last_updated(coordinator: &RefreshCoordinator) {
    let state = coordinator.refresh_state().await;
    for source in SourceId::all() {
        let marker = if state.has_error(*source) { "  (error)" } else { "" };
        println!(
            "{:<13} Last updated: {}{}",
            source.name(),
            datapulse::format_elapsed_now(state.last_updated(*source)),
            marker
        );
    }
}
