//! RV-C decoding: DGN table lookup, signal extraction, `DecodedMessage`
//! construction.
mod table;

use crate::error::{GatewayError, Protocol};
use crate::frame::Frame;
use crate::message::DecodedMessage;
use crate::signal::SignalValue;

pub use table::{DgnDef, lookup_dgn};

/// Decode a frame already classified as carrying the given RV-C DGN.
pub fn decode(dgn: u32, frame: &Frame) -> Result<DecodedMessage, GatewayError> {
    let def = lookup_dgn(dgn).ok_or(GatewayError::UnknownMessage {
        protocol: Protocol::Rvc,
        id: dgn,
    })?;
    let mut msg = DecodedMessage::new(Protocol::Rvc, dgn, &frame.source_network_id, frame.timestamp);
    for signal in def.signals {
        let (raw, value) = signal.decode_raw(frame.payload())?;
        if is_sentinel_unavailable(raw, signal.length) {
            continue;
        }
        msg.push_signal(signal.name, SignalValue::F64(value));
        msg.push_raw_signal(signal.name, raw);
    }
    Ok(msg)
}

/// RV-C convention: an all-ones raw value of the signal's own width means
/// "data not available", and the signal is omitted rather than reported as
/// a spurious reading.
fn is_sentinel_unavailable(raw: u64, length: u16) -> bool {
    if length == 0 || length > 63 {
        return false;
    }
    raw == (1u64 << length) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_tank_level_dgn() {
        // DGN 0x1FFB7 shape mirrors the Firefly tank table but under the
        // plain RV-C instance used by non-OEM tanks.
        let frame = Frame::new(0x1FFB7, &[0, 100, 0, 0, 0, 0, 0, 0], true, 1.0, "can0");
        let msg = decode(0x1FFB7, &frame).unwrap();
        assert!(msg.signal("level_percent").is_some());
    }

    #[test]
    fn omits_sentinel_unavailable_signals() {
        let frame = Frame::new(0x1FFB7, &[0, 0xFF, 0, 0, 0, 0, 0, 0], true, 1.0, "can0");
        let msg = decode(0x1FFB7, &frame).unwrap();
        assert!(msg.signal("level_percent").is_none());
    }

    #[test]
    fn unknown_dgn_is_an_error() {
        let frame = Frame::new(0x12345, &[0; 8], true, 1.0, "can0");
        let err = decode(0x12345, &frame).unwrap_err();
        assert!(matches!(err, GatewayError::UnknownMessage { .. }));
    }
}
