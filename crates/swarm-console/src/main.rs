//! Headless fleet console: streams telemetry and logs fleet summaries.

use anyhow::Result;
use swarm_console::{Config, FleetStore, StoreEvent, TelemetryLink};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("swarm_console=debug".parse()?),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("fleet console starting (telemetry: {})", config.ws_url);

    let store = FleetStore::new();
    let link = TelemetryLink::new(config.ws_url.clone()).spawn(store.clone());

    let mut events = store.subscribe();
    let summary = store.clone();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(StoreEvent::Fleet) => {
                    let counts = summary.status_counts();
                    let total: usize = counts.values().sum();
                    tracing::debug!("fleet snapshot: {} drones {:?}", total, counts);
                }
                Ok(StoreEvent::Link) => {
                    let label = if summary.connected() {
                        "connected"
                    } else {
                        "disconnected"
                    };
                    tracing::info!("telemetry {}", label);
                }
                Ok(StoreEvent::Selection) => {}
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    link.stop().await;

    Ok(())
}
