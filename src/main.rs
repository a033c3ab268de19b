//! speedwatch - periodic network speed and service reachability monitor

mod api;
mod config;
mod error;
mod history;
mod measurement;
mod probe;
mod scheduler;

use anyhow::{Context, Result};
use clap::Parser;
use scheduler::SchedulerEvent;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "speedwatch")]
#[command(version)]
#[command(about = "Periodic network speed and service reachability monitoring", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "speedwatch.conf")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = if args.config.exists() {
        config::Config::load(&args.config)?
    } else {
        config::Config::default()
    };

    // Initialize logging at the configured level
    let level = config
        .logging
        .level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    info!("Starting speedwatch v{}", env!("CARGO_PKG_VERSION"));
    if args.config.exists() {
        info!("Loaded configuration from {:?}", args.config);
    } else {
        info!("No config file at {:?}, using built-in defaults", args.config);
    }

    let interval = Duration::from_secs(config.general.test_interval_min * 60);
    let history = Arc::new(history::HistoryStore::with_capacity(
        config.general.max_history,
    ));

    let probe = match config.general.probe {
        config::ProbeKind::Simulated => probe::Probe::Simulated(probe::SimulatedProbe),
        config::ProbeKind::Icmp => probe::Probe::Icmp(
            probe::IcmpProbe::new().context("Failed to initialize ICMP probe")?,
        ),
    };
    let engine = probe::MeasurementEngine::new(probe);

    let target_count: usize = config.categories.iter().map(|c| c.services.len()).sum();
    info!(
        "Catalogue: {} categories, {} targets",
        config.categories.len(),
        target_count
    );
    info!("Measurement interval: {} minutes", config.general.test_interval_min);
    info!("History capacity: {} records", config.general.max_history);

    let scheduler = Arc::new(scheduler::Scheduler::new(
        engine,
        history.clone(),
        config.categories.clone(),
        interval,
    ));

    // Log completion outcomes
    let mut events = scheduler.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SchedulerEvent::Completed { trigger, record }) => {
                    info!(
                        "{} measurement complete: down {:.1} Mbps, up {:.1} Mbps, ping {:.1} ms",
                        trigger, record.download, record.upload, record.ping
                    );
                }
                Ok(SchedulerEvent::Failed { trigger, error }) => {
                    warn!("{} measurement failed: {}", trigger, error);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("dropped {} scheduler events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Periodic drive loop: one immediate run, then one per interval
    tokio::spawn(scheduler.clone().run());

    let app = api::create_router(api::ApiState { history, scheduler });
    let bind_addr = format!(
        "{}:{}",
        config.general.bind_address, config.general.bind_port
    );
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context(format!("Failed to bind to {}", bind_addr))?;
    info!("API listening on {}", bind_addr);

    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
