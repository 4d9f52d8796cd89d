//! Health/status interface: read-only, serializable snapshots of the
//! network registry and feature manager, for an external collaborator to
//! expose however it likes (HTTP endpoint, CLI, log line).
use serde::Serialize;

use crate::feature::FeatureState;
use crate::j1939::bridge::BridgeStatsSnapshot;
use crate::network::{NetworkPriority, NetworkRegistry, NetworkStatus};

#[derive(Debug, Clone, Serialize)]
pub struct NetworkStatusSnapshot {
    pub network_id: String,
    pub status: NetworkStatus,
    pub priority: NetworkPriority,
    pub message_count: u64,
    pub error_count: u64,
    pub bus_off_count: u64,
    pub uptime_seconds: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureStatusSnapshot {
    pub feature: String,
    pub state: FeatureState,
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayStatusSnapshot {
    pub networks: Vec<NetworkStatusSnapshot>,
    pub bridge: BridgeStatsSnapshot,
    pub entity_count: usize,
}

pub async fn snapshot_networks(registry: &NetworkRegistry) -> Vec<NetworkStatusSnapshot> {
    let mut snapshots = Vec::new();
    for node in registry.all().await {
        let health = node.health().await;
        snapshots.push(NetworkStatusSnapshot {
            network_id: node.network_id.clone(),
            status: health.status,
            priority: node.priority,
            message_count: health.message_count,
            error_count: health.error_count,
            bus_off_count: health.bus_off_count,
            uptime_seconds: node.uptime().as_secs_f64(),
        });
    }
    snapshots
}
