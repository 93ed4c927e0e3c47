use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use spotlight::{Clock, Config, Scheduler, Spotlight, SystemClock};

#[derive(Parser, Debug)]
#[command(name = "spotlight", about = "Daily spotlight rotation service")]
struct Args {
    /// Shards per metric per day
    #[arg(long, default_value_t = 10)]
    shards: usize,

    /// Seconds between aggregation passes
    #[arg(long, default_value_t = 300)]
    aggregate_secs: u64,

    /// Commit-race retries before a bid reports a conflict
    #[arg(long, default_value_t = 5)]
    max_bid_retries: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let config = Config::new()
        .shard_count(args.shards)
        .aggregate_interval(Duration::from_secs(args.aggregate_secs))
        .max_bid_retries(args.max_bid_retries);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let service = Arc::new(Spotlight::new(&config, clock));

    // Provision today on the spot; both triggers are idempotent, so a
    // restart mid-day changes nothing.
    service.on_daily_rollover().await;
    service.on_auction_open().await;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = tokio::spawn(Scheduler::new(Arc::clone(&service), config).run(shutdown_rx));

    shutdown_signal().await;
    shutdown_tx.send(true).ok();
    scheduler.await?;

    info!("spotlight shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
