//! Decoders for Firefly's reassembled multiplexed status payloads.
use crate::error::{GatewayError, Protocol};
use crate::frame::Frame;
use crate::message::DecodedMessage;
use crate::signal::SignalValue;

const TANK_NAMES: &[(u8, &str)] = &[
    (0, "fresh_water"),
    (1, "gray_water"),
    (2, "black_water"),
    (3, "lpg"),
];

fn tank_name(tank_id: u8) -> String {
    TANK_NAMES
        .iter()
        .find(|(id, _)| *id == tank_id)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("tank_{tank_id}"))
}

/// 4-byte groups: tank_id, level_percent, capacity_gallons (big-endian
/// u16). `0xFF`/`0xFFFF` is the "not installed" sentinel.
pub fn decode_tank_levels(payload: &[u8], frame: &Frame) -> Result<DecodedMessage, GatewayError> {
    let mut msg = DecodedMessage::new(
        Protocol::Firefly,
        0x1FFB7,
        &frame.source_network_id,
        frame.timestamp,
    ).with_manufacturer("Firefly Integrations");
    for group in payload.chunks_exact(4) {
        let tank_id = group[0];
        let level_percent = group[1];
        let capacity_gallons = u16::from_be_bytes([group[2], group[3]]);
        if tank_id == 0xFF {
            continue;
        }
        let name = tank_name(tank_id);
        if level_percent != 0xFF {
            msg.push_signal(
                format!("tanks.{name}.level_percent"),
                SignalValue::F64(level_percent as f64),
            );
        }
        if capacity_gallons != 0xFFFF {
            let gallons = level_percent as f64 * capacity_gallons as f64 / 100.0;
            msg.push_signal(
                format!("tanks.{name}.level_gallons"),
                SignalValue::F64(gallons),
            );
        }
    }
    Ok(msg)
}

/// 3-byte groups: sensor_id, temp_raw (big-endian u16). Firefly's own
/// scaling: `(temp_raw - 8736) / 128.0` celsius.
pub fn decode_temperature_data(payload: &[u8], frame: &Frame) -> Result<DecodedMessage, GatewayError> {
    let mut msg = DecodedMessage::new(
        Protocol::Firefly,
        0x1FFB6,
        &frame.source_network_id,
        frame.timestamp,
    ).with_manufacturer("Firefly Integrations");
    for group in payload.chunks_exact(3) {
        let sensor_id = group[0];
        if sensor_id == 0xFF {
            continue;
        }
        let temp_raw = u16::from_be_bytes([group[1], group[2]]);
        if temp_raw == 0xFFFF {
            continue;
        }
        let celsius = (temp_raw as f64 - 8736.0) / 128.0;
        msg.push_signal(format!("sensors.{sensor_id}.temp_celsius"), SignalValue::F64(celsius));
    }
    Ok(msg)
}

/// Fixed layout: system_health, power_status, communication_health,
/// last_error_code, uptime_hours (big-endian u16 across the remaining
/// bytes).
pub fn decode_generic_status(payload: &[u8], frame: &Frame) -> Result<DecodedMessage, GatewayError> {
    let mut msg = DecodedMessage::new(
        Protocol::Firefly,
        0x1FEF5,
        &frame.source_network_id,
        frame.timestamp,
    ).with_manufacturer("Firefly Integrations");
    if payload.len() < 6 {
        return Err(GatewayError::DecodeError {
            protocol: Protocol::Firefly,
            detail: "generic status payload shorter than 6 bytes".into(),
        });
    }
    msg.push_signal("system_health", SignalValue::F64(payload[0] as f64));
    msg.push_signal("power_status", SignalValue::F64(payload[1] as f64));
    msg.push_signal("communication_health", SignalValue::F64(payload[2] as f64));
    msg.push_signal("last_error_code", SignalValue::F64(payload[3] as f64));
    let uptime_hours = u16::from_be_bytes([payload[4], payload[5]]);
    msg.push_signal("uptime_hours", SignalValue::F64(uptime_hours as f64));
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_two_tank_groups() {
        let frame = Frame::new(0x1FFB7, &[0, 0, 0, 0, 0, 0, 0, 0], true, 1.0, "can0");
        let payload = [0u8, 100, 0, 100, 1u8, 50, 0, 100];
        let msg = decode_tank_levels(&payload, &frame).unwrap();
        assert_eq!(
            msg.signal("tanks.fresh_water.level_percent").unwrap().as_f64().unwrap(),
            100.0
        );
        assert_eq!(
            msg.signal("tanks.gray_water.level_percent").unwrap().as_f64().unwrap(),
            50.0
        );
    }
}
