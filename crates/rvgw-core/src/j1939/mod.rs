//! J1939 decoding: standard SAE PGN table, priority classification, and
//! (via [`bridge`]) translation into the RV-C entity model.
pub mod bridge;
mod table;

use crate::error::{GatewayError, Protocol};
use crate::frame::Frame;
use crate::message::DecodedMessage;
use crate::signal::SignalValue;

pub use table::{PgnDef, lookup_pgn};

/// J1939 29-bit identifiers encode priority in the top 3 bits.
pub fn priority(arbitration_id: u32) -> u8 {
    ((arbitration_id >> 26) & 0x7) as u8
}

/// The PGN is the middle 18 bits (PDU format + PDU specific), independent
/// of source address and priority.
pub fn pgn_from_arbitration_id(arbitration_id: u32) -> u32 {
    (arbitration_id >> 8) & 0x3FFFF
}

pub fn decode(pgn: u32, frame: &Frame) -> Result<DecodedMessage, GatewayError> {
    let def = lookup_pgn(pgn).ok_or(GatewayError::UnknownMessage {
        protocol: Protocol::J1939,
        id: pgn,
    })?;
    let mut msg = DecodedMessage::new(
        Protocol::J1939,
        pgn,
        &frame.source_network_id,
        frame.timestamp,
    )
    .with_source_address((frame.arbitration_id & 0xFF) as u8)
    .with_priority(priority(frame.arbitration_id));
    if let Some(manufacturer) = def.manufacturer {
        msg = msg.with_manufacturer(manufacturer);
    }
    for signal in def.signals {
        let (raw, value) = signal.decode_raw(frame.payload())?;
        msg.push_signal(signal.name, SignalValue::F64(value));
        msg.push_raw_signal(signal.name, raw);
    }
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_is_the_top_three_bits() {
        // priority 3 (0b011) << 26 | pgn 0xF004 << 8 | source 0x17
        let id = (0b011u32 << 26) | (0xF004 << 8) | 0x17;
        assert_eq!(priority(id), 3);
        assert_eq!(pgn_from_arbitration_id(id), 0xF004);
    }

    #[test]
    fn decodes_engine_speed() {
        let frame = Frame::new(0x0CF00400, &[0, 0, 0, 0x40, 0x1F, 0, 0, 0], true, 1.0, "can1");
        let msg = decode(0xF004, &frame).unwrap();
        let rpm = msg.signal("engine_speed").unwrap().as_f64().unwrap();
        assert!((rpm - 1000.0).abs() < 0.5);
    }
}
