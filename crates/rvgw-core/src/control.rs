//! Entity control interface: the inbound counterpart to the observer hub,
//! letting an external collaborator (the HTTP surface, a CLI) request a
//! state change on an entity without reaching into the registry directly.
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::entity::EntityRegistry;
use crate::error::{GatewayError, Protocol};
use crate::frame::Frame;
use crate::network::NetworkRegistry;
use crate::signal::SignalDef;

#[derive(Debug, Clone)]
pub struct ControlCommand {
    pub entity_id: String,
    pub command: String,
    pub parameters: Value,
}

#[async_trait]
pub trait ControlInterface: Send + Sync {
    async fn control(&self, command: ControlCommand) -> Result<(), GatewayError>;
}

/// The VehicleState-relevant signals interlock evaluators care about,
/// published by the entity updater per its step 3.
#[derive(Debug, Clone, Copy, Default)]
pub struct VehicleSafetyState {
    pub park_brake_set: bool,
    pub engine_running: bool,
    pub vehicle_speed: f64,
}

/// The result of attempting to encode a control command into outbound
/// frames: either the frames to queue, or a non-empty violation list with
/// `frames` left empty — never both populated.
#[derive(Debug, Default)]
pub struct EncodeOutcome {
    pub frames: Vec<Frame>,
    pub violations: Vec<String>,
}

impl EncodeOutcome {
    fn rejected(violations: Vec<String>) -> Self {
        Self {
            frames: Vec::new(),
            violations,
        }
    }

    fn accepted(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            violations: Vec::new(),
        }
    }
}

/// A single named command: which DGN it targets, the protocol that DGN
/// belongs to, the optional numeric parameter signal it packs, and the
/// interlock check that must clear before it is encoded.
struct CommandDef {
    command: &'static str,
    dgn: u32,
    protocol: Protocol,
    param_signal: Option<SignalDef>,
    interlock: fn(&VehicleSafetyState) -> Vec<String>,
}

fn no_interlock(_safety: &VehicleSafetyState) -> Vec<String> {
    Vec::new()
}

/// The parking-brake/vehicle-motion interlock every slide/awning command
/// is gated on, carried over verbatim from the chassis OEM's own check.
fn slide_interlock(safety: &VehicleSafetyState) -> Vec<String> {
    let mut violations = Vec::new();
    if !safety.park_brake_set && safety.engine_running {
        violations.push("Slide/awning operation requires parking brake set or engine off".to_string());
    }
    if safety.vehicle_speed > 0.5 {
        violations.push("Slide/awning operation rejected while vehicle in motion".to_string());
    }
    violations
}

static COMMAND_TABLE: &[CommandDef] = &[
    CommandDef {
        command: "slides.extend",
        dgn: 0x1F102,
        protocol: Protocol::Firefly,
        param_signal: None,
        interlock: slide_interlock,
    },
    CommandDef {
        command: "slides.retract",
        dgn: 0x1F102,
        protocol: Protocol::Firefly,
        param_signal: None,
        interlock: slide_interlock,
    },
    CommandDef {
        command: "lights.set",
        dgn: 0x1F100,
        protocol: Protocol::Firefly,
        param_signal: Some(SignalDef::new("brightness_percent", 8, 8)),
        interlock: no_interlock,
    },
    CommandDef {
        command: "thermostat.set_setpoint",
        dgn: 0x1F101,
        protocol: Protocol::Firefly,
        param_signal: Some(SignalDef::new("setpoint_celsius", 8, 8).scaled(0.5, -20.0)),
        interlock: no_interlock,
    },
];

fn lookup_command(command: &str) -> Option<&'static CommandDef> {
    COMMAND_TABLE.iter().find(|c| c.command == command)
}

/// Encode a command into the frame(s) it should be transmitted as,
/// rejecting it outright if its interlock condition is not satisfied.
/// Commands with no table entry are rejected rather than silently dropped.
pub fn encode_command(command: &ControlCommand, safety: &VehicleSafetyState) -> EncodeOutcome {
    let Some(def) = lookup_command(&command.command) else {
        return EncodeOutcome::rejected(vec![format!("unknown command '{}'", command.command)]);
    };

    let violations = (def.interlock)(safety);
    if !violations.is_empty() {
        return EncodeOutcome::rejected(violations);
    }

    let mut payload = [0u8; 8];
    if let Some(signal) = &def.param_signal {
        if let Some(value) = command.parameters.as_f64() {
            if let Err(err) = signal.encode(&mut payload, value) {
                return EncodeOutcome::rejected(vec![err.to_string()]);
            }
        }
    }

    EncodeOutcome::accepted(vec![Frame::new(def.dgn, &payload, true, 0.0, "control")])
}

/// Concrete `ControlInterface` wiring a command up to its owning entity's
/// network and encoding/transmitting it, or rejecting it with an
/// `InterlockViolation` error the caller surfaces to whoever asked.
pub struct GatewayControlInterface {
    entities: Arc<EntityRegistry>,
    networks: Arc<NetworkRegistry>,
    safety: Arc<RwLock<VehicleSafetyState>>,
    default_network: String,
}

impl GatewayControlInterface {
    pub fn new(
        entities: Arc<EntityRegistry>,
        networks: Arc<NetworkRegistry>,
        safety: Arc<RwLock<VehicleSafetyState>>,
        default_network: impl Into<String>,
    ) -> Self {
        Self {
            entities,
            networks,
            safety,
            default_network: default_network.into(),
        }
    }
}

#[async_trait]
impl ControlInterface for GatewayControlInterface {
    async fn control(&self, command: ControlCommand) -> Result<(), GatewayError> {
        let network_id = self
            .entities
            .get(&command.entity_id)
            .ok()
            .and_then(|entity| entity.network_id)
            .unwrap_or_else(|| self.default_network.clone());

        let safety = *self.safety.read().await;
        let outcome = encode_command(&command, &safety);
        if !outcome.violations.is_empty() {
            return Err(GatewayError::InterlockViolation {
                system: command.command,
                message: outcome.violations.join("; "),
            });
        }

        let node = self
            .networks
            .get(&network_id)
            .await
            .ok_or_else(|| GatewayError::NetworkNotFound(network_id.clone()))?;
        for frame in outcome.frames {
            node.bus.send(frame).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slide_extend_is_rejected_with_park_brake_off_and_engine_running() {
        let command = ControlCommand {
            entity_id: "slides.main".into(),
            command: "slides.extend".into(),
            parameters: Value::Null,
        };
        let safety = VehicleSafetyState {
            park_brake_set: false,
            engine_running: true,
            vehicle_speed: 0.0,
        };
        let outcome = encode_command(&command, &safety);
        assert!(outcome.frames.is_empty());
        assert!(!outcome.violations.is_empty());
    }

    #[test]
    fn slide_extend_is_accepted_with_park_brake_set() {
        let command = ControlCommand {
            entity_id: "slides.main".into(),
            command: "slides.extend".into(),
            parameters: Value::Null,
        };
        let safety = VehicleSafetyState {
            park_brake_set: true,
            engine_running: true,
            vehicle_speed: 0.0,
        };
        let outcome = encode_command(&command, &safety);
        assert!(outcome.violations.is_empty());
        assert_eq!(outcome.frames.len(), 1);
        assert_eq!(outcome.frames[0].arbitration_id, 0x1F102);
    }

    #[test]
    fn lights_set_has_no_interlock_and_packs_brightness() {
        let command = ControlCommand {
            entity_id: "lighting.zone".into(),
            command: "lights.set".into(),
            parameters: Value::from(75),
        };
        let outcome = encode_command(&command, &VehicleSafetyState::default());
        assert!(outcome.violations.is_empty());
        assert_eq!(outcome.frames.len(), 1);
        assert_eq!(outcome.frames[0].payload()[1], 75);
    }

    #[test]
    fn unknown_command_is_rejected() {
        let command = ControlCommand {
            entity_id: "lighting.zone".into(),
            command: "lights.disco_mode".into(),
            parameters: Value::Null,
        };
        let outcome = encode_command(&command, &VehicleSafetyState::default());
        assert!(outcome.frames.is_empty());
        assert!(!outcome.violations.is_empty());
    }
}
