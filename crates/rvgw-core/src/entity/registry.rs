//! Concurrent, entity-id-keyed registry. Uses a lock-free concurrent map
//! rather than one coarse mutex, since entity updates arrive from many
//! decoder tasks concurrently and should not serialize on unrelated
//! entities.
//!
//! Entities are not synthesized on first sight: they are registered at
//! startup from a fixed coach-mapping table, the way a real coach's
//! device list is known ahead of time from its build sheet. A decoded
//! message whose DGN/PGN (and, where relevant, instance) has no table
//! entry is an unmapped device and is dropped rather than given an
//! ad-hoc identity.
use dashmap::DashMap;

use super::{Entity, SafetyClassification};
use crate::error::GatewayError;
use crate::message::DecodedMessage;

struct DeviceRecord {
    dgn: u32,
    instance: Option<u8>,
    entity_id: &'static str,
    device_type: &'static str,
    protocol: &'static str,
    area: Option<&'static str>,
    capabilities: &'static [&'static str],
    groups: &'static [&'static str],
    safety_classification: SafetyClassification,
}

/// The coach-mapping table. Several DGN/PGN rows can share an `entity_id`:
/// a raw J1939 PGN and its RV-C bridge counterpart both describe the same
/// physical device and should update the same entity.
static DEVICE_TABLE: &[DeviceRecord] = &[
    DeviceRecord {
        dgn: 0x1FFB7,
        instance: None,
        entity_id: "tanks.status",
        device_type: "tank_bank",
        protocol: "RV-C",
        area: Some("house"),
        capabilities: &["level_percent", "level_gallons"],
        groups: &["tanks"],
        safety_classification: SafetyClassification::Operational,
    },
    DeviceRecord {
        dgn: 0x1FFFD,
        instance: None,
        entity_id: "power.dc_source_1",
        device_type: "dc_source",
        protocol: "RV-C",
        area: Some("house"),
        capabilities: &["voltage", "current"],
        groups: &["power"],
        safety_classification: SafetyClassification::Operational,
    },
    DeviceRecord {
        dgn: 0x1FFE2,
        instance: None,
        entity_id: "climate.thermostat_1",
        device_type: "thermostat",
        protocol: "RV-C",
        area: Some("house"),
        capabilities: &["setpoint_celsius", "ambient_celsius"],
        groups: &["climate"],
        safety_classification: SafetyClassification::Operational,
    },
    DeviceRecord {
        dgn: 0x1F100,
        instance: None,
        entity_id: "lighting.zone",
        device_type: "light",
        protocol: "Firefly",
        area: Some("house"),
        capabilities: &["on_off", "dimming"],
        groups: &["lighting"],
        safety_classification: SafetyClassification::Operational,
    },
    DeviceRecord {
        dgn: 0x1F101,
        instance: None,
        entity_id: "climate.zone",
        device_type: "hvac_zone",
        protocol: "Firefly",
        area: Some("house"),
        capabilities: &["setpoint", "fan_speed"],
        groups: &["climate"],
        safety_classification: SafetyClassification::Operational,
    },
    DeviceRecord {
        dgn: 0x1F102,
        instance: None,
        entity_id: "slides.main",
        device_type: "slide",
        protocol: "Firefly",
        area: Some("house"),
        capabilities: &["extend", "retract", "position"],
        groups: &["slides"],
        safety_classification: SafetyClassification::PositionCritical,
    },
    DeviceRecord {
        dgn: 0x1F103,
        instance: None,
        entity_id: "power.management",
        device_type: "power_management",
        protocol: "Firefly",
        area: Some("house"),
        capabilities: &["battery_soc", "shore_power", "inverter", "generator"],
        groups: &["power"],
        safety_classification: SafetyClassification::Maintenance,
    },
    DeviceRecord {
        dgn: 0x1F104,
        instance: None,
        entity_id: "diagnostics.module",
        device_type: "diagnostic",
        protocol: "Firefly",
        area: None,
        capabilities: &["fault_code"],
        groups: &["diagnostics"],
        safety_classification: SafetyClassification::Maintenance,
    },
    DeviceRecord {
        dgn: 0xF004,
        instance: None,
        entity_id: "engine_primary",
        device_type: "engine",
        protocol: "J1939",
        area: Some("chassis"),
        capabilities: &["engine_speed"],
        groups: &["engine"],
        safety_classification: SafetyClassification::SafetyRelated,
    },
    DeviceRecord {
        dgn: 0x1F004,
        instance: None,
        entity_id: "engine_primary",
        device_type: "engine",
        protocol: "RV-C",
        area: Some("chassis"),
        capabilities: &["engine_speed"],
        groups: &["engine"],
        safety_classification: SafetyClassification::SafetyRelated,
    },
    DeviceRecord {
        dgn: 0xFEF1,
        instance: None,
        entity_id: "vehicle.speed",
        device_type: "vehicle_speed_sensor",
        protocol: "J1939",
        area: Some("chassis"),
        capabilities: &["vehicle_speed"],
        groups: &["chassis"],
        safety_classification: SafetyClassification::SafetyRelated,
    },
    DeviceRecord {
        dgn: 0x1FEF1,
        instance: None,
        entity_id: "vehicle.speed",
        device_type: "vehicle_speed_sensor",
        protocol: "RV-C",
        area: Some("chassis"),
        capabilities: &["vehicle_speed"],
        groups: &["chassis"],
        safety_classification: SafetyClassification::SafetyRelated,
    },
    DeviceRecord {
        dgn: 0xFF00,
        instance: None,
        entity_id: "chassis.brakes",
        device_type: "brakes",
        protocol: "Spartan K2",
        area: Some("chassis"),
        capabilities: &["brake_pressure", "abs_active"],
        groups: &["brakes"],
        safety_classification: SafetyClassification::Critical,
    },
    DeviceRecord {
        dgn: 0xFE41,
        instance: None,
        entity_id: "chassis.suspension",
        device_type: "suspension",
        protocol: "Spartan K2",
        area: Some("chassis"),
        capabilities: &["front_level", "rear_level", "air_pressure"],
        groups: &["suspension"],
        safety_classification: SafetyClassification::PositionCritical,
    },
    DeviceRecord {
        dgn: 0xFE42,
        instance: None,
        entity_id: "chassis.steering",
        device_type: "steering",
        protocol: "Spartan K2",
        area: Some("chassis"),
        capabilities: &["ps_pressure", "steering_angle"],
        groups: &["steering"],
        safety_classification: SafetyClassification::Critical,
    },
];

fn lookup_device(dgn: u32, instance: Option<u8>) -> Option<&'static DeviceRecord> {
    DEVICE_TABLE
        .iter()
        .find(|d| d.dgn == dgn && (d.instance.is_none() || d.instance == instance))
}

pub struct EntityRegistry {
    entities: DashMap<String, Entity>,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    /// Registers one entity per unique `entity_id` in the coach-mapping
    /// table, the way a coach's device list is known before the first
    /// frame is ever decoded.
    pub fn new() -> Self {
        let entities = DashMap::new();
        for device in DEVICE_TABLE {
            entities.entry(device.entity_id.to_string()).or_insert_with(|| {
                Entity::new(
                    device.entity_id,
                    device.device_type,
                    device.protocol,
                    device.area,
                    device.capabilities,
                    device.groups,
                    device.safety_classification,
                )
            });
        }
        Self { entities }
    }

    /// Apply a decoded message's signals onto the entity its DGN/PGN maps
    /// to. Returns `None`, and logs a warning, when the message's id has
    /// no coach-mapping entry: the message is dropped rather than given an
    /// ad-hoc entity.
    pub fn update_from_message(&self, message: &DecodedMessage) -> Option<String> {
        let instance = message
            .signal("instance")
            .and_then(|v| v.as_f64())
            .map(|v| v as u8);
        let Some(device) = lookup_device(message.message_id, instance) else {
            log::warn!(
                "unmapped device for {} dgn 0x{:X} instance {:?}, dropping",
                message.protocol,
                message.message_id,
                instance
            );
            return None;
        };

        let mut entry = self.entities.get_mut(device.entity_id)?;
        entry.protocol = message.protocol.to_string();
        entry.network_id = Some(message.source_network_id.clone());
        entry.source_dgn = Some(message.message_id);
        entry.source_instance = instance;
        for (name, value) in message.signals() {
            entry.apply(name.clone(), *value, message.timestamp);
        }
        Some(device.entity_id.to_string())
    }

    pub fn get(&self, entity_id: &str) -> Result<Entity, GatewayError> {
        self.entities
            .get(entity_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| GatewayError::EntityNotFound(entity_id.to_string()))
    }

    pub fn snapshot(&self) -> Vec<Entity> {
        self.entities.iter().map(|e| e.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Protocol;
    use crate::signal::SignalValue;

    #[test]
    fn first_update_creates_the_entity() {
        let registry = EntityRegistry::new();
        let mut msg = DecodedMessage::new(Protocol::Rvc, 0x1FFB7, "can0", 10.0);
        msg.push_signal("tanks.fresh_water.level_percent", SignalValue::F64(80.0));

        let entity_id = registry.update_from_message(&msg).unwrap();
        let entity = registry.get(&entity_id).unwrap();
        assert_eq!(entity.last_updated, 10.0);
        assert_eq!(entity.signals.len(), 1);
    }

    #[test]
    fn later_update_bumps_last_updated_monotonically() {
        let registry = EntityRegistry::new();
        let mut first = DecodedMessage::new(Protocol::Rvc, 0x1FFB7, "can0", 10.0);
        first.push_signal("tanks.fresh_water.level_percent", SignalValue::F64(80.0));
        let entity_id = registry.update_from_message(&first).unwrap();

        let mut second = DecodedMessage::new(Protocol::Rvc, 0x1FFB7, "can0", 5.0);
        second.push_signal("tanks.fresh_water.level_percent", SignalValue::F64(90.0));
        registry.update_from_message(&second);

        let entity = registry.get(&entity_id).unwrap();
        // an out-of-order, earlier timestamp never regresses last_updated
        assert_eq!(entity.last_updated, 10.0);
    }

    #[test]
    fn unmapped_dgn_is_dropped_not_synthesized() {
        let registry = EntityRegistry::new();
        let msg = DecodedMessage::new(Protocol::Rvc, 0xABCDE, "can0", 1.0);
        assert!(registry.update_from_message(&msg).is_none());
    }
}
