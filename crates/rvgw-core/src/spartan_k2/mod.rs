//! Spartan K2 chassis decoding and safety-interlock evaluation.
mod interlock;
mod table;

pub use interlock::{
    BrakeReading, SafetyInterlock, SteeringReading, SuspensionReading, evaluate_brake_interlock,
    evaluate_steering_interlock, evaluate_suspension_interlock,
};
pub use table::{SpartanPgnDef, SpartanSystemType, lookup_pgn};

use crate::error::{GatewayError, Protocol};
use crate::frame::Frame;
use crate::message::DecodedMessage;
use crate::signal::SignalValue;

pub fn decode(pgn: u32, frame: &Frame) -> Result<DecodedMessage, GatewayError> {
    let def = lookup_pgn(pgn).ok_or(GatewayError::UnknownMessage {
        protocol: Protocol::SpartanK2,
        id: pgn,
    })?;
    let mut msg = DecodedMessage::new(
        Protocol::SpartanK2,
        pgn,
        &frame.source_network_id,
        frame.timestamp,
    )
    .with_source_address((frame.arbitration_id & 0xFF) as u8)
    .with_priority(crate::j1939::priority(frame.arbitration_id))
    .with_manufacturer("Spartan Motors");
    for signal in def.signals {
        let (raw, value) = signal.decode_raw(frame.payload())?;
        msg.push_signal(signal.name, SignalValue::F64(value));
        msg.push_raw_signal(signal.name, raw);
    }

    let violations = evaluate_interlocks(def.system_type, &msg);
    for violation in &violations {
        log::warn!("spartan k2 interlock violation on pgn 0x{pgn:X}: {violation}");
    }
    msg.safety_violations = violations;

    Ok(msg)
}

fn signal_f64(msg: &DecodedMessage, name: &str) -> f64 {
    msg.signal(name).and_then(SignalValue::as_f64).unwrap_or(0.0)
}

fn signal_bool(msg: &DecodedMessage, name: &str) -> bool {
    msg.signal(name).and_then(SignalValue::as_f64).map(|v| v != 0.0).unwrap_or(false)
}

/// Build the reading the system type's validator expects and run it. A
/// system type with no validator of its own (leveling, electrical,
/// diagnostics, safety, unknown) raises nothing here.
fn evaluate_interlocks(system_type: SpartanSystemType, msg: &DecodedMessage) -> Vec<String> {
    match system_type {
        SpartanSystemType::Brakes => evaluate_brake_interlock(&BrakeReading {
            brake_pressure: signal_f64(msg, "brake_pressure"),
            abs_active: signal_bool(msg, "abs_active"),
            vehicle_speed: signal_f64(msg, "vehicle_speed"),
            parking_brake: signal_bool(msg, "parking_brake"),
            engine_running: signal_bool(msg, "engine_running"),
        }),
        SpartanSystemType::Suspension => evaluate_suspension_interlock(&SuspensionReading {
            front_level: signal_f64(msg, "front_level"),
            rear_level: signal_f64(msg, "rear_level"),
            air_pressure: signal_f64(msg, "air_pressure"),
            leveling_active: signal_bool(msg, "leveling_active"),
            vehicle_speed: signal_f64(msg, "vehicle_speed"),
        }),
        SpartanSystemType::Steering => evaluate_steering_interlock(&SteeringReading {
            ps_pressure: signal_f64(msg, "ps_pressure"),
            steering_angle: signal_f64(msg, "steering_angle"),
            vehicle_speed: signal_f64(msg, "vehicle_speed"),
        }),
        SpartanSystemType::Leveling
        | SpartanSystemType::Electrical
        | SpartanSystemType::Diagnostics
        | SpartanSystemType::Safety
        | SpartanSystemType::Unknown => Vec::new(),
    }
}
