//! Background health-monitor task: periodically inspects every registered
//! network and drives fault isolation/recovery.
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use super::registry::NetworkRegistry;
use super::NetworkStatus;

/// Minimum backoff before attempting to bring a faulted/isolated network
/// back online.
const RECOVERY_BACKOFF: Duration = Duration::from_secs(1);

/// Spawn the health-monitor task. Runs until `cancelled` resolves, checking
/// every registered network once per `interval`.
pub fn spawn_health_monitor(
    registry: Arc<NetworkRegistry>,
    interval: Duration,
    mut cancelled: tokio::sync::watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    check_all(&registry).await;
                }
                _ = cancelled.changed() => {
                    if *cancelled.borrow() {
                        log::info!("health monitor shutting down");
                        return;
                    }
                }
            }
        }
    })
}

async fn check_all(registry: &NetworkRegistry) {
    for node in registry.all().await {
        let health = node.health().await;
        match health.status {
            NetworkStatus::Faulted | NetworkStatus::Isolated => {
                sleep(RECOVERY_BACKOFF).await;
                log::info!("attempting recovery for network '{}'", node.network_id);
                node.mark_recovered().await;
            }
            NetworkStatus::Degraded => {
                log::debug!(
                    "network '{}' degraded: {:?}",
                    node.network_id,
                    health.last_error
                );
            }
            _ => {}
        }
    }
}
