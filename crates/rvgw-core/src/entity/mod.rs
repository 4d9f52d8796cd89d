//! Entity registry and vehicle state snapshot.
mod registry;
mod vehicle_state;

pub use registry::EntityRegistry;
pub use vehicle_state::VehicleState;

use crate::signal::SignalValue;
use std::collections::BTreeMap;

/// How strictly a degraded or missing entity should be treated by anything
/// gating on its state. Mirrors the five-way classification the coach
/// mapping table assigns at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyClassification {
    /// Brakes, steering: loss of this entity must halt dependent operation.
    Critical,
    /// Engine, vehicle speed: degraded operation is tolerated, never silent.
    SafetyRelated,
    /// Slides, leveling: position must be known before it is safe to move.
    PositionCritical,
    Operational,
    Maintenance,
}

/// A logical device (tank, light, engine, ...) tracked by signal name.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Entity {
    pub entity_id: String,
    pub device_type: String,
    pub protocol: String,
    pub network_id: Option<String>,
    pub area: Option<String>,
    pub capabilities: Vec<String>,
    pub groups: Vec<String>,
    pub safety_classification: SafetyClassification,
    pub signals: BTreeMap<String, SignalValueDto>,
    pub last_updated: f64,
    pub last_seen: f64,
    pub source_dgn: Option<u32>,
    pub source_instance: Option<u8>,
}

/// `serde`-friendly mirror of `SignalValue`; `SignalValue` itself stays
/// internal to the hot decode path.
#[derive(Debug, Clone, Copy, serde::Serialize)]
#[serde(untagged)]
pub enum SignalValueDto {
    Number(f64),
    Bool(bool),
}

impl From<SignalValue> for SignalValueDto {
    fn from(value: SignalValue) -> Self {
        match value {
            SignalValue::F64(v) => SignalValueDto::Number(v),
            SignalValue::Bool(v) => SignalValueDto::Bool(v),
        }
    }
}

impl Entity {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        entity_id: impl Into<String>,
        device_type: impl Into<String>,
        protocol: impl Into<String>,
        area: Option<&str>,
        capabilities: &[&str],
        groups: &[&str],
        safety_classification: SafetyClassification,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            device_type: device_type.into(),
            protocol: protocol.into(),
            network_id: None,
            area: area.map(|s| s.to_string()),
            capabilities: capabilities.iter().map(|s| s.to_string()).collect(),
            groups: groups.iter().map(|s| s.to_string()).collect(),
            safety_classification,
            signals: BTreeMap::new(),
            last_updated: 0.0,
            last_seen: 0.0,
            source_dgn: None,
            source_instance: None,
        }
    }

    pub fn apply(&mut self, name: impl Into<String>, value: SignalValue, timestamp: f64) {
        self.signals.insert(name.into(), value.into());
        if timestamp > self.last_updated {
            self.last_updated = timestamp;
        }
        if timestamp > self.last_seen {
            self.last_seen = timestamp;
        }
    }
}
