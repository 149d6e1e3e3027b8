//! # Bus Runtime
//!
//! Drives one message bus from a fixed-rate tick loop.
//!
//! ```text
//! interval ──tick──► BusRuntime::tick()
//!                       ├─ producer.post(..)
//!                       ├─ bus.drain_and_publish()
//!                       └─ consumers get_message() + release()
//! Ctrl+C / tick limit ──► final metrics ──► exit
//! ```

use anyhow::{Context, Result};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use bus_runtime::{load_config, BusRuntime};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = load_config().context("Failed to load configuration")?;
    info!(?config, "Configuration loaded");

    let mut runtime = BusRuntime::new(&config)?;

    let mut interval = tokio::time::interval(config.tick_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Bus runtime is running. Press Ctrl+C to stop.");
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                }
                info!("Shutdown requested");
                break;
            }
            _ = interval.tick() => {
                let summary = runtime.tick();
                if summary.dropped > 0 || summary.rejected > 0 {
                    warn!(tick = runtime.ticks_run(), ?summary, "Messages dropped this tick");
                }
                if config.ticks.is_some_and(|limit| runtime.ticks_run() >= limit) {
                    info!(ticks = runtime.ticks_run(), "Tick limit reached");
                    break;
                }
            }
        }
    }

    let metrics = serde_json::to_string(&runtime.metrics())?;
    info!(ticks = runtime.ticks_run(), %metrics, "Final bus metrics");
    info!("Inbox state at shutdown:\n{}", runtime.dump_inboxes());

    Ok(())
}
