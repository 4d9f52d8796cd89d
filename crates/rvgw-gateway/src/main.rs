//! Composition-root demo binary: wires the network manager, feature
//! lifecycle manager, and entity model together over a small set of
//! canned frames so the gateway's behavior can be observed end to end
//! without a physical CAN interface attached.
//!
//! This is not a production entry point: a real deployment supplies its
//! own `Bus` implementations (SocketCAN, a recorded-trace player, ...)
//! and its own HTTP/notification surface on top of `rvgw_core`.
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{error, info, warn};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use rvgw_core::control::{encode_command, ControlCommand, VehicleSafetyState};
use rvgw_core::dispatch::dispatch;
use rvgw_core::entity::{EntityRegistry, VehicleState};
use rvgw_core::error::GatewayError;
use rvgw_core::feature::{Feature, FeatureId, FeatureManager, SafetyClass};
use rvgw_core::firefly::FireflyReassembler;
use rvgw_core::frame::Frame;
use rvgw_core::health;
use rvgw_core::j1939::bridge::J1939ProtocolBridge;
use rvgw_core::network::{
    spawn_health_monitor, NetworkNode, NetworkPriority, NetworkRegistry, ProtocolFamily,
};
use rvgw_core::observer::{GatewayEvent, ObserverHub};
use rvgw_core::transport::Bus;

/// A `Bus` backed by a fixed, pre-loaded queue of frames. Once the queue is
/// drained, `recv` suspends indefinitely rather than returning an error, the
/// same way a real transport blocks waiting for the next frame.
struct DemoBus {
    queue: Mutex<VecDeque<Frame>>,
}

impl DemoBus {
    fn new(frames: Vec<Frame>) -> Self {
        Self {
            queue: Mutex::new(frames.into_iter().collect()),
        }
    }
}

#[async_trait]
impl Bus for DemoBus {
    async fn send(&self, frame: Frame) -> Result<(), GatewayError> {
        info!("[bus] would transmit frame 0x{:X}", frame.arbitration_id);
        Ok(())
    }

    async fn recv(&self) -> Result<Frame, GatewayError> {
        loop {
            if let Some(frame) = self.queue.lock().await.pop_front() {
                return Ok(frame);
            }
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    }
}

/// A feature that does nothing on its own besides log its lifecycle
/// transitions. The decoders themselves are plain functions dispatched
/// from `run_network`; this stands in for the startup/shutdown hook a
/// feature with actual state (a background task, an open file) would use.
struct LoggingFeature {
    id: FeatureId,
    dependencies: Vec<FeatureId>,
    safety_class: SafetyClass,
}

impl LoggingFeature {
    fn new(id: FeatureId, dependencies: Vec<FeatureId>, safety_class: SafetyClass) -> Self {
        Self {
            id,
            dependencies,
            safety_class,
        }
    }
}

#[async_trait]
impl Feature for LoggingFeature {
    fn id(&self) -> FeatureId {
        self.id
    }

    fn dependencies(&self) -> &[FeatureId] {
        &self.dependencies
    }

    fn safety_class(&self) -> SafetyClass {
        self.safety_class
    }

    async fn start(&self) -> Result<(), GatewayError> {
        info!("starting feature '{}'", self.id);
        Ok(())
    }

    async fn stop(&self) -> Result<(), GatewayError> {
        info!("stopping feature '{}'", self.id);
        Ok(())
    }
}

fn demo_feature_manager() -> FeatureManager {
    let mut manager = FeatureManager::new();
    manager.register(Box::new(LoggingFeature::new(
        FeatureId::CanManager,
        vec![],
        SafetyClass::Critical,
    )));
    manager.register(Box::new(LoggingFeature::new(
        FeatureId::RvcDecoder,
        vec![FeatureId::CanManager],
        SafetyClass::Operational,
    )));
    manager.register(Box::new(LoggingFeature::new(
        FeatureId::J1939Decoder,
        vec![FeatureId::CanManager],
        SafetyClass::Operational,
    )));
    manager.register(Box::new(LoggingFeature::new(
        FeatureId::FireflyDecoder,
        vec![FeatureId::RvcDecoder],
        SafetyClass::Maintenance,
    )));
    manager.register(Box::new(LoggingFeature::new(
        FeatureId::SpartanK2Decoder,
        vec![FeatureId::J1939Decoder],
        SafetyClass::SafetyRelated,
    )));
    manager.register(Box::new(LoggingFeature::new(
        FeatureId::J1939Bridge,
        vec![FeatureId::J1939Decoder, FeatureId::RvcDecoder],
        SafetyClass::SafetyRelated,
    )));
    manager.register(Box::new(LoggingFeature::new(
        FeatureId::EntityManager,
        vec![FeatureId::RvcDecoder, FeatureId::J1939Bridge],
        SafetyClass::Critical,
    )));
    manager.register(Box::new(LoggingFeature::new(
        FeatureId::ObserverHub,
        vec![FeatureId::EntityManager],
        SafetyClass::Maintenance,
    )));
    manager
}

fn house_demo_frames() -> Vec<Frame> {
    vec![
        // Firefly multiplexed tank-level status, split across two parts.
        Frame::new(0x1FFB7, &[0x12, 0x00, 0x00, 0x64, 0x00, 0x64], true, 0.0, "house"),
        Frame::new(0x1FFB7, &[0x12, 0x01, 0x01, 0x32, 0x00, 0x32], true, 0.0, "house"),
    ]
}

fn chassis_demo_frames() -> Vec<Frame> {
    vec![
        // J1939 EEC1: engine speed 1500 rpm, bridged into the RV-C entity model.
        Frame::new(
            0x0CF00400,
            &[0x00, 0x80, 0x00, 0xE0, 0x2E, 0xF9, 0x00, 0x80],
            true,
            0.0,
            "chassis",
        ),
        // Spartan K2 brake status: 50 psi, no faults.
        Frame::new(0xFF00 << 8, &[0xF4, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], true, 0.0, "chassis"),
    ]
}

#[allow(clippy::too_many_arguments)]
fn spawn_network_reader(
    node: Arc<NetworkNode>,
    entities: Arc<EntityRegistry>,
    vehicle_state: Arc<VehicleState>,
    observer: Arc<ObserverHub>,
    bridge: Arc<J1939ProtocolBridge>,
    reassembler: Arc<FireflyReassembler>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                result = node.bus.recv() => {
                    match result {
                        Ok(frame) => {
                            node.record_message().await;
                            handle_frame(&node, &frame, &entities, &vehicle_state, &observer, &bridge, &reassembler).await;
                        }
                        Err(err) => {
                            warn!("network '{}' bus error: {err}", node.network_id);
                            node.record_bus_fault(err.to_string()).await;
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("network reader for '{}' shutting down", node.network_id);
                        return;
                    }
                }
            }
        }
    })
}

async fn handle_frame(
    node: &NetworkNode,
    frame: &Frame,
    entities: &EntityRegistry,
    vehicle_state: &VehicleState,
    observer: &ObserverHub,
    bridge: &J1939ProtocolBridge,
    reassembler: &FireflyReassembler,
) {
    let decoded = match dispatch(node.protocol, frame, reassembler) {
        Ok(Some(msg)) => msg,
        Ok(None) => return, // a multiplex part still awaiting its siblings
        Err(err) => {
            warn!("network '{}' decode error: {err}", node.network_id);
            node.record_transient_error(err.to_string()).await;
            return;
        }
    };

    observer.publish(GatewayEvent::MessageDecoded(decoded.clone()));
    if let Some(entity_id) = entities.update_from_message(&decoded) {
        vehicle_state.refresh().await;
        if let Ok(entity) = entities.get(&entity_id) {
            observer.publish(GatewayEvent::EntityUpdated(entity));
        }
    }

    if node.protocol == ProtocolFamily::J1939 {
        match bridge.bridge_j1939_to_rvc(&decoded) {
            Ok(Some(bridged)) => {
                if let Some(bridged_id) = entities.update_from_message(&bridged) {
                    vehicle_state.refresh().await;
                    if let Ok(entity) = entities.get(&bridged_id) {
                        observer.publish(GatewayEvent::EntityUpdated(entity));
                    }
                }
            }
            Ok(None) => {}
            Err(err) => warn!("bridge translation error: {err}"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let network_registry = Arc::new(NetworkRegistry::new());
    let house_bus: Arc<dyn Bus> = Arc::new(DemoBus::new(house_demo_frames()));
    let chassis_bus: Arc<dyn Bus> = Arc::new(DemoBus::new(chassis_demo_frames()));

    let house = network_registry
        .register(
            NetworkNode::new("house", ProtocolFamily::Rvc, NetworkPriority::Normal, true, house_bus),
            "vcan-house",
        )
        .await?;
    let chassis = network_registry
        .register(
            NetworkNode::new("chassis", ProtocolFamily::J1939, NetworkPriority::Critical, true, chassis_bus),
            "vcan-chassis",
        )
        .await?;

    let mut feature_manager = demo_feature_manager();
    feature_manager.start_all().await?;

    let entities = Arc::new(EntityRegistry::new());
    let vehicle_state = Arc::new(VehicleState::new(entities.clone()));
    let observer = Arc::new(ObserverHub::default());
    let bridge = Arc::new(J1939ProtocolBridge::new());
    let reassembler = Arc::new(FireflyReassembler::default());

    let mut status_rx = observer.subscribe();
    let status_task = tokio::spawn(async move {
        while let Ok(event) = status_rx.recv().await {
            info!("event: {event:?}");
        }
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let health_task = spawn_health_monitor(network_registry.clone(), Duration::from_secs(5), shutdown_rx.clone());

    let readers = vec![
        spawn_network_reader(house, entities.clone(), vehicle_state.clone(), observer.clone(), bridge.clone(), reassembler.clone(), shutdown_rx.clone()),
        spawn_network_reader(chassis, entities.clone(), vehicle_state.clone(), observer.clone(), bridge.clone(), reassembler.clone(), shutdown_rx.clone()),
    ];

    // Give the readers time to drain the demo queues, then exercise the
    // interlock-gated control path and print a final status snapshot.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let slide_command = ControlCommand {
        entity_id: "slides.main".into(),
        command: "slides.extend".into(),
        parameters: serde_json::Value::Null,
    };
    let safety = VehicleSafetyState {
        park_brake_set: false,
        engine_running: true,
        vehicle_speed: 0.0,
    };
    let outcome = encode_command(&slide_command, &safety);
    if !outcome.violations.is_empty() {
        for violation in &outcome.violations {
            warn!("command rejected: {violation}");
        }
    }

    let networks = health::snapshot_networks(&network_registry).await;
    for network in &networks {
        info!(
            "network '{}': {:?}, {} messages, {} errors",
            network.network_id, network.status, network.message_count, network.error_count
        );
    }
    for entity in vehicle_state.entities().await {
        info!("entity '{}': {:?}", entity.entity_id, entity.signals);
    }

    let _ = shutdown_tx.send(true);
    health_task.abort();
    status_task.abort();
    for reader in readers {
        if let Err(err) = reader.await {
            error!("network reader task panicked: {err}");
        }
    }

    Ok(())
}
