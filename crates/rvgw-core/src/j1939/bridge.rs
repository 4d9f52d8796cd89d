//! Translates decoded J1939 messages into RV-C-shaped entity updates.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{GatewayError, Protocol};
use crate::message::DecodedMessage;
use crate::signal::SignalValue;

/// One static J1939 PGN to RV-C entity mapping.
///
/// `0xFEFF` historically appears in source data dictionaries as both a
/// transmission-parameters PGN and an alternate engine-temperature
/// grouping; `j1939::table` resolves that collision by keeping transmission
/// parameters on `0xFEFF` and moving engine temperature to `0xFEEE`, so the
/// bridge table below only ever sees one PGN per entry.
pub struct EntityMapping {
    pub j1939_pgn: u32,
    pub rvc_dgn: u32,
    pub entity_id: &'static str,
    pub system_type: &'static str,
    /// (j1939_signal_name, rvc_signal_name) renames.
    pub signal_renames: &'static [(&'static str, &'static str)],
    /// Additional scale applied on top of the J1939 signal's own scale,
    /// for units that differ between the two protocol families.
    pub scaling: &'static [(&'static str, f64)],
}

static BRIDGE_TABLE: &[EntityMapping] = &[
    EntityMapping {
        j1939_pgn: 0xFEF1,
        rvc_dgn: 0x1FEF1,
        entity_id: "vehicle.speed",
        system_type: "chassis",
        signal_renames: &[("vehicle_speed", "speed")],
        scaling: &[],
    },
    EntityMapping {
        j1939_pgn: 0xF004,
        rvc_dgn: 0x1F004,
        entity_id: "engine_primary",
        system_type: "engine",
        signal_renames: &[("engine_torque_percent", "torque_percent")],
        scaling: &[],
    },
];

/// Bidirectional translation counters, mirroring the original bridge's
/// stats dict (`messages_bridged`, `translation_errors`, `entity_updates`,
/// `commands_translated`).
#[derive(Default)]
pub struct BridgeStats {
    pub messages_bridged: AtomicU64,
    pub translation_errors: AtomicU64,
    pub entity_updates: AtomicU64,
    pub commands_translated: AtomicU64,
}

impl BridgeStats {
    pub fn snapshot(&self) -> BridgeStatsSnapshot {
        BridgeStatsSnapshot {
            messages_bridged: self.messages_bridged.load(Ordering::Relaxed),
            translation_errors: self.translation_errors.load(Ordering::Relaxed),
            entity_updates: self.entity_updates.load(Ordering::Relaxed),
            commands_translated: self.commands_translated.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct BridgeStatsSnapshot {
    pub messages_bridged: u64,
    pub translation_errors: u64,
    pub entity_updates: u64,
    pub commands_translated: u64,
}

pub struct J1939ProtocolBridge {
    by_pgn: HashMap<u32, &'static EntityMapping>,
    by_rvc_dgn: HashMap<u32, &'static EntityMapping>,
    pub stats: BridgeStats,
}

impl Default for J1939ProtocolBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl J1939ProtocolBridge {
    pub fn new() -> Self {
        let by_pgn = BRIDGE_TABLE.iter().map(|m| (m.j1939_pgn, m)).collect();
        let by_rvc_dgn = BRIDGE_TABLE.iter().map(|m| (m.rvc_dgn, m)).collect();
        Self {
            by_pgn,
            by_rvc_dgn,
            stats: BridgeStats::default(),
        }
    }

    /// Translate a decoded J1939 message into an RV-C-shaped
    /// `DecodedMessage` ready for entity updating, if a mapping exists.
    pub fn bridge_j1939_to_rvc(
        &self,
        message: &DecodedMessage,
    ) -> Result<Option<DecodedMessage>, GatewayError> {
        let Some(mapping) = self.by_pgn.get(&message.message_id) else {
            self.stats.translation_errors.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        };
        let mut bridged = DecodedMessage::new(
            Protocol::Rvc,
            mapping.rvc_dgn,
            &message.source_network_id,
            message.timestamp,
        );
        for (name, value) in message.signals() {
            let renamed = mapping
                .signal_renames
                .iter()
                .find(|(j1939_name, _)| j1939_name == name)
                .map(|(_, rvc_name)| *rvc_name)
                .unwrap_or_else(|| {
                    self.stats.translation_errors.fetch_add(1, Ordering::Relaxed);
                    name.as_str()
                });
            let scaled = match value {
                SignalValue::F64(v) => {
                    let extra_scale = mapping
                        .scaling
                        .iter()
                        .find(|(n, _)| *n == renamed)
                        .map(|(_, s)| *s)
                        .unwrap_or(1.0);
                    SignalValue::F64(v * extra_scale)
                }
                other => *other,
            };
            bridged.push_signal(renamed, scaled);
        }
        self.stats.messages_bridged.fetch_add(1, Ordering::Relaxed);
        self.stats.entity_updates.fetch_add(1, Ordering::Relaxed);
        Ok(Some(bridged))
    }

    /// The reverse direction: translate an RV-C-shaped command/status
    /// message back into its J1939 PGN, undoing the signal renames and
    /// scale factor. Reverse-then-forward (or forward-then-reverse) is the
    /// identity modulo scale-factor rounding.
    pub fn bridge_rvc_to_j1939(
        &self,
        message: &DecodedMessage,
    ) -> Result<Option<DecodedMessage>, GatewayError> {
        let Some(mapping) = self.by_rvc_dgn.get(&message.message_id) else {
            self.stats.translation_errors.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        };
        let mut bridged = DecodedMessage::new(
            Protocol::J1939,
            mapping.j1939_pgn,
            &message.source_network_id,
            message.timestamp,
        );
        for (name, value) in message.signals() {
            let renamed = mapping
                .signal_renames
                .iter()
                .find(|(_, rvc_name)| rvc_name == name)
                .map(|(j1939_name, _)| *j1939_name)
                .unwrap_or_else(|| {
                    self.stats.translation_errors.fetch_add(1, Ordering::Relaxed);
                    name.as_str()
                });
            let scaled = match value {
                SignalValue::F64(v) => {
                    let extra_scale = mapping
                        .scaling
                        .iter()
                        .find(|(n, _)| *n == renamed)
                        .map(|(_, s)| *s)
                        .unwrap_or(1.0);
                    SignalValue::F64(if extra_scale != 0.0 { v / extra_scale } else { v })
                }
                other => *other,
            };
            bridged.push_signal(renamed, scaled);
        }
        self.stats.messages_bridged.fetch_add(1, Ordering::Relaxed);
        self.stats.commands_translated.fetch_add(1, Ordering::Relaxed);
        Ok(Some(bridged))
    }

    pub fn entity_id_for_pgn(&self, pgn: u32) -> Option<&'static str> {
        self.by_pgn.get(&pgn).map(|m| m.entity_id)
    }
}
