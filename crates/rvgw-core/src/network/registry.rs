//! `NetworkNode`/`NetworkRegistry`: the single-mutex-guarded map of
//! registered CAN networks, mirroring the registry discipline used
//! elsewhere in this crate for concurrently-accessed, infrequently-mutated
//! state.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

use super::{NetworkHealth, NetworkPriority, NetworkStatus, ProtocolFamily};
use crate::error::GatewayError;
use crate::transport::Bus;

pub struct NetworkNode {
    pub network_id: String,
    pub protocol: ProtocolFamily,
    pub priority: NetworkPriority,
    pub isolation_enabled: bool,
    pub bus: Arc<dyn Bus>,
    health: Mutex<NetworkHealth>,
    start_time: Instant,
}

impl NetworkNode {
    pub fn new(
        network_id: impl Into<String>,
        protocol: ProtocolFamily,
        priority: NetworkPriority,
        isolation_enabled: bool,
        bus: Arc<dyn Bus>,
    ) -> Self {
        Self {
            network_id: network_id.into(),
            protocol,
            priority,
            isolation_enabled,
            bus,
            health: Mutex::new(NetworkHealth::default()),
            start_time: Instant::now(),
        }
    }

    pub async fn health(&self) -> NetworkHealth {
        self.health.lock().await.clone()
    }

    pub async fn record_message(&self) {
        let mut health = self.health.lock().await;
        health.message_count += 1;
        health.last_message_age = std::time::Duration::ZERO;
        if matches!(health.status, NetworkStatus::Initializing | NetworkStatus::Degraded) {
            health.status = NetworkStatus::Healthy;
        }
    }

    pub async fn record_transient_error(&self, detail: impl Into<String>) {
        let mut health = self.health.lock().await;
        health.error_count += 1;
        health.last_error = Some(detail.into());
        if health.status == NetworkStatus::Healthy {
            health.status = NetworkStatus::Degraded;
        }
    }

    pub async fn record_bus_fault(&self, reason: impl Into<String>) {
        let mut health = self.health.lock().await;
        health.bus_off_count += 1;
        health.last_error = Some(reason.into());
        health.status = if self.isolation_enabled {
            NetworkStatus::Isolated
        } else {
            NetworkStatus::Faulted
        };
    }

    pub async fn mark_recovered(&self) {
        let mut health = self.health.lock().await;
        if matches!(health.status, NetworkStatus::Faulted | NetworkStatus::Isolated) {
            health.fault_recoveries += 1;
        }
        health.status = NetworkStatus::Healthy;
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}

/// Registry of all configured networks, keyed by network id, with an
/// inverse lookup from the underlying interface name.
pub struct NetworkRegistry {
    networks: Mutex<HashMap<String, Arc<NetworkNode>>>,
    interface_mapping: Mutex<HashMap<String, String>>,
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self {
            networks: Mutex::new(HashMap::new()),
            interface_mapping: Mutex::new(HashMap::new()),
        }
    }

    pub async fn register(
        &self,
        node: NetworkNode,
        interface_name: impl Into<String>,
    ) -> Result<Arc<NetworkNode>, GatewayError> {
        let interface_name = interface_name.into();
        let mut networks = self.networks.lock().await;
        if networks.contains_key(&node.network_id) {
            return Err(GatewayError::ConfigError(format!(
                "network '{}' is already registered",
                node.network_id
            )));
        }
        let mut interfaces = self.interface_mapping.lock().await;
        if interfaces.contains_key(&interface_name) {
            return Err(GatewayError::ConfigError(format!(
                "interface '{interface_name}' is already mapped to another network"
            )));
        }
        let node = Arc::new(node);
        interfaces.insert(interface_name, node.network_id.clone());
        networks.insert(node.network_id.clone(), node.clone());
        Ok(node)
    }

    pub async fn unregister(&self, network_id: &str) -> Result<(), GatewayError> {
        let mut networks = self.networks.lock().await;
        networks
            .remove(network_id)
            .ok_or_else(|| GatewayError::NetworkNotFound(network_id.to_string()))?;
        let mut interfaces = self.interface_mapping.lock().await;
        interfaces.retain(|_, id| id != network_id);
        Ok(())
    }

    pub async fn get(&self, network_id: &str) -> Option<Arc<NetworkNode>> {
        self.networks.lock().await.get(network_id).cloned()
    }

    pub async fn all(&self) -> Vec<Arc<NetworkNode>> {
        self.networks.lock().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use async_trait::async_trait;

    struct NullBus;

    #[async_trait]
    impl Bus for NullBus {
        async fn send(&self, _frame: Frame) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn recv(&self) -> Result<Frame, GatewayError> {
            Err(GatewayError::CancellationError)
        }
    }

    #[tokio::test]
    async fn duplicate_network_id_is_rejected() {
        let registry = NetworkRegistry::new();
        let node = NetworkNode::new("can0", ProtocolFamily::Rvc, NetworkPriority::Normal, true, Arc::new(NullBus));
        registry.register(node, "vcan0").await.unwrap();

        let dup = NetworkNode::new("can0", ProtocolFamily::Rvc, NetworkPriority::Normal, true, Arc::new(NullBus));
        assert!(registry.register(dup, "vcan1").await.is_err());
    }

    #[tokio::test]
    async fn duplicate_interface_name_is_rejected() {
        let registry = NetworkRegistry::new();
        let node = NetworkNode::new("can0", ProtocolFamily::Rvc, NetworkPriority::Normal, true, Arc::new(NullBus));
        registry.register(node, "vcan0").await.unwrap();

        let other = NetworkNode::new("can1", ProtocolFamily::J1939, NetworkPriority::Normal, true, Arc::new(NullBus));
        assert!(registry.register(other, "vcan0").await.is_err());
        assert!(registry.get("can1").await.is_none());
    }

    #[tokio::test]
    async fn bus_fault_isolates_when_isolation_enabled() {
        let node = NetworkNode::new("can0", ProtocolFamily::J1939, NetworkPriority::Critical, true, Arc::new(NullBus));
        node.record_bus_fault("bus-off").await;
        assert_eq!(node.health().await.status, NetworkStatus::Isolated);
    }
}
