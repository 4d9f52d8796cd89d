//! Decoders for Firefly's vendor-private custom-DGN control/status
//! messages (lighting, climate, slide/awning, power management,
//! diagnostics). Each occupies a fixed 8-byte payload.
use crate::error::{GatewayError, Protocol};
use crate::frame::Frame;
use crate::message::DecodedMessage;
use crate::signal::SignalValue;

pub fn decode_custom(dgn: u32, frame: &Frame) -> Result<DecodedMessage, GatewayError> {
    match dgn {
        0x1F100 => decode_lighting_control(frame),
        0x1F101 => decode_climate_control(frame),
        0x1F102 => decode_slide_awning_control(frame),
        0x1F103 => decode_power_management(frame),
        0x1F104 => decode_diagnostic_extended(frame),
        _ => Err(GatewayError::UnknownMessage {
            protocol: Protocol::Firefly,
            id: dgn,
        }),
    }
}

fn decode_lighting_control(frame: &Frame) -> Result<DecodedMessage, GatewayError> {
    let p = frame.payload();
    let mut msg = DecodedMessage::new(Protocol::Firefly, 0x1F100, &frame.source_network_id, frame.timestamp)
        .with_manufacturer("Firefly Integrations");
    msg.push_signal("zone", SignalValue::F64(p[0] as f64));
    msg.push_signal("brightness_percent", SignalValue::F64(p[1] as f64));
    msg.push_signal("on", SignalValue::Bool(p[2] != 0));
    Ok(msg)
}

fn decode_climate_control(frame: &Frame) -> Result<DecodedMessage, GatewayError> {
    let p = frame.payload();
    let mut msg = DecodedMessage::new(Protocol::Firefly, 0x1F101, &frame.source_network_id, frame.timestamp)
        .with_manufacturer("Firefly Integrations");
    msg.push_signal("zone", SignalValue::F64(p[0] as f64));
    msg.push_signal("setpoint_celsius", SignalValue::F64(p[1] as f64 * 0.5 - 20.0));
    msg.push_signal("fan_speed_percent", SignalValue::F64(p[2] as f64));
    msg.push_signal("mode", SignalValue::F64(p[3] as f64));
    Ok(msg)
}

fn decode_slide_awning_control(frame: &Frame) -> Result<DecodedMessage, GatewayError> {
    let p = frame.payload();
    let mut msg = DecodedMessage::new(Protocol::Firefly, 0x1F102, &frame.source_network_id, frame.timestamp)
        .with_manufacturer("Firefly Integrations");
    msg.push_signal("device_id", SignalValue::F64(p[0] as f64));
    msg.push_signal("position_percent", SignalValue::F64(p[1] as f64));
    msg.push_signal("moving", SignalValue::Bool(p[2] != 0));
    msg.push_signal("fault", SignalValue::Bool(p[3] != 0));
    Ok(msg)
}

fn decode_power_management(frame: &Frame) -> Result<DecodedMessage, GatewayError> {
    let p = frame.payload();
    let mut msg = DecodedMessage::new(Protocol::Firefly, 0x1F103, &frame.source_network_id, frame.timestamp)
        .with_manufacturer("Firefly Integrations");
    msg.push_signal("battery_soc_percent", SignalValue::F64(p[0] as f64));
    msg.push_signal("shore_power_connected", SignalValue::Bool(p[1] != 0));
    msg.push_signal("inverter_on", SignalValue::Bool(p[2] != 0));
    msg.push_signal("generator_running", SignalValue::Bool(p[3] != 0));
    Ok(msg)
}

fn decode_diagnostic_extended(frame: &Frame) -> Result<DecodedMessage, GatewayError> {
    let p = frame.payload();
    let mut msg = DecodedMessage::new(Protocol::Firefly, 0x1F104, &frame.source_network_id, frame.timestamp)
        .with_manufacturer("Firefly Integrations");
    msg.push_signal("module_id", SignalValue::F64(p[0] as f64));
    msg.push_signal("fault_code", SignalValue::F64(u16::from_be_bytes([p[1], p[2]]) as f64));
    msg.push_signal("severity", SignalValue::F64(p[3] as f64));
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_lighting_control() {
        let frame = Frame::new(0x1F100, &[2, 75, 1, 0, 0, 0, 0, 0], true, 1.0, "can0");
        let msg = decode_custom(0x1F100, &frame).unwrap();
        assert_eq!(msg.signal("zone").unwrap().as_f64().unwrap(), 2.0);
        assert_eq!(msg.signal("on").unwrap().as_f64().unwrap(), 1.0);
    }
}
