//! Integration tests for the six concrete end-to-end scenarios the core is
//! built to satisfy.
mod simulator;

use std::sync::Arc;
use std::time::Duration;

use rvgw_core::control::{encode_command, ControlCommand, VehicleSafetyState};
use rvgw_core::entity::EntityRegistry;
use rvgw_core::firefly::FireflyReassembler;
use rvgw_core::frame::Frame;
use rvgw_core::j1939::bridge::J1939ProtocolBridge;
use rvgw_core::network::{NetworkNode, NetworkPriority, NetworkRegistry, NetworkStatus, ProtocolFamily};
use rvgw_core::{dispatch, firefly, j1939, spartan_k2};

use simulator::SimulatedBus;

#[test]
fn scenario_1_engine_speed_pass_through() {
    let frame = Frame::new(
        61444,
        &[0x00, 0x80, 0x00, 0xE0, 0x2E, 0xF9, 0x00, 0x80],
        true,
        0.0,
        "chassis",
    );
    let pgn = j1939::pgn_from_arbitration_id(61444 << 8);
    let msg = j1939::decode(pgn, &frame).unwrap();
    let engine_speed = msg.signal("engine_speed").unwrap().as_f64().unwrap();
    assert!((engine_speed - 1500.0).abs() < 0.1);
}

#[test]
fn scenario_2_firefly_multiplex_reassembly() {
    let reassembler = FireflyReassembler::default();
    let part0 = Frame::new(0x1FFB7, &[0x12, 0x00, 0x00, 0x64, 0x00, 0x64], true, 0.0, "house");
    let part1 = Frame::new(0x1FFB7, &[0x12, 0x01, 0x01, 0x32, 0x00, 0x32], true, 0.0, "house");

    assert!(firefly::decode(0x1FFB7, &part0, &reassembler).unwrap().is_none());
    let msg = firefly::decode(0x1FFB7, &part1, &reassembler).unwrap().unwrap();

    assert_eq!(
        msg.signal("tanks.fresh_water.level_percent").unwrap().as_f64().unwrap(),
        100.0
    );
    assert_eq!(
        msg.signal("tanks.gray_water.level_percent").unwrap().as_f64().unwrap(),
        50.0
    );
}

#[test]
fn scenario_3_brake_safety_interlock() {
    // brake_pressure=50 psi (raw 500 * 0.1), ABS bit=0, parking-brake bit=0, engine_running bit=0.
    let raw_pressure: u16 = 500;
    let mut payload = [0u8; 8];
    payload[0..2].copy_from_slice(&raw_pressure.to_le_bytes());
    // byte 2 bits: abs_active=0 (bit0), parking_brake=0 (bit1), engine_running=0 (bit2)
    payload[2] = 0;

    let frame = Frame::new(0xFF00 << 8, &payload, true, 0.0, "chassis");
    let msg = spartan_k2::decode(0xFF00, &frame).unwrap();

    assert!(msg
        .safety_violations
        .iter()
        .any(|v| v.contains("Low brake pressure detected")));
    assert!(msg
        .safety_violations
        .iter()
        .any(|v| v.contains("Parking brake not engaged with engine off")));
}

#[test]
fn scenario_4_j1939_to_rvc_bridge() {
    let frame = Frame::new(
        0x0CF00400,
        &[0x00, 0x80, 0x00, 0xE0, 0x2E, 0xF9, 0x00, 0x80],
        true,
        0.0,
        "chassis",
    );
    let pgn = j1939::pgn_from_arbitration_id(frame.arbitration_id);
    let decoded = j1939::decode(pgn, &frame).unwrap();

    let bridge = J1939ProtocolBridge::new();
    let bridged = bridge.bridge_j1939_to_rvc(&decoded).unwrap().unwrap();

    assert_eq!(bridge.entity_id_for_pgn(pgn), Some("engine_primary"));
    let speed = bridged.signal("engine_speed").unwrap().as_f64().unwrap();
    assert!((speed - 1500.0).abs() < 0.1);
}

#[tokio::test]
async fn scenario_5_network_recovery() {
    let bus = Arc::new(SimulatedBus::new());
    let node = NetworkNode::new("house", ProtocolFamily::Rvc, NetworkPriority::Normal, true, bus);
    let registry = NetworkRegistry::new();
    let node = registry.register(node, "vcan-house").await.unwrap();

    assert_eq!(node.health().await.status, NetworkStatus::Initializing);

    node.record_bus_fault("attach failed").await;
    assert_eq!(node.health().await.status, NetworkStatus::Isolated);

    node.mark_recovered().await;
    let health = node.health().await;
    assert_eq!(health.status, NetworkStatus::Healthy);
    assert_eq!(health.fault_recoveries, 1);
}

#[test]
fn scenario_6_interlocked_command_rejection() {
    let command = ControlCommand {
        entity_id: "slides.main".into(),
        command: "slides.extend".into(),
        parameters: serde_json::Value::Null,
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
fn dispatch_routes_through_oem_tables_before_standard_ones() {
    let reassembler = FireflyReassembler::default();
    let entity_registry = EntityRegistry::new();

    let frame = Frame::new(0x1F100, &[2, 75, 1, 0, 0, 0, 0, 0], true, 1.0, "house");
    let msg = dispatch::dispatch(ProtocolFamily::Rvc, &frame, &reassembler)
        .unwrap()
        .unwrap();
    let entity_id = entity_registry.update_from_message(&msg).unwrap();
    assert_eq!(entity_registry.get(&entity_id).unwrap().signals.len(), 3);
}
