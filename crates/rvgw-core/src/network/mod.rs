//! Multi-network CAN manager: network registration, health monitoring,
//! fault isolation and recovery.
mod health;
mod registry;

pub use health::spawn_health_monitor;
pub use registry::{NetworkNode, NetworkRegistry};

use serde::Serialize;
use std::time::Duration;

/// Which decoder table family a network's frames should be routed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolFamily {
    Rvc,
    J1939,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NetworkStatus {
    Initializing,
    Healthy,
    Degraded,
    Faulted,
    Isolated,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NetworkPriority {
    Critical,
    High,
    Normal,
    Low,
    Background,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkHealth {
    pub status: NetworkStatus,
    pub message_count: u64,
    pub error_count: u64,
    pub bus_off_count: u64,
    pub fault_recoveries: u64,
    pub last_error: Option<String>,
    #[serde(skip)]
    pub last_message_age: Duration,
}

impl Default for NetworkHealth {
    fn default() -> Self {
        Self {
            status: NetworkStatus::Initializing,
            message_count: 0,
            error_count: 0,
            bus_off_count: 0,
            fault_recoveries: 0,
            last_error: None,
            last_message_age: Duration::ZERO,
        }
    }
}

impl NetworkHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status, NetworkStatus::Healthy)
    }

    pub fn is_operational(&self) -> bool {
        matches!(self.status, NetworkStatus::Healthy | NetworkStatus::Degraded)
    }
}
