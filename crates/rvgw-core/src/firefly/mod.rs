//! Firefly proprietary DGN decoding: classification, multiplexed message
//! reassembly, and the custom-DGN control/status decoders.
mod controls;
mod multiplex;
mod status;

pub use multiplex::{FireflyReassembler, MultiplexBuffer};

use crate::error::{GatewayError, Protocol};
use crate::frame::Frame;
use crate::message::DecodedMessage;

/// How a Firefly DGN should be handled before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireflyDgnKind {
    /// A regular, single-frame status/control DGN.
    Standard,
    /// Split across several frames via the multiplex header.
    Multiplexed,
    /// Carries a safety-relevant reading (handled like Standard here; the
    /// interlock layer lives in `spartan_k2` for chassis systems, Firefly's
    /// own safety DGNs are informational tank/leak sensors).
    Safety,
    /// A Firefly custom control/status DGN in the vendor-private range.
    Custom,
}

const MULTIPLEXED_DGNS: &[u32] = &[0x1FFB7, 0x1FFB6, 0x1FEF5];
const SAFETY_DGNS: &[u32] = &[0x1FECA, 0x1FED9];
const CUSTOM_DGN_RANGE: std::ops::RangeInclusive<u32> = 0x1F100..=0x1F104;

pub fn classify_dgn(dgn: u32) -> FireflyDgnKind {
    if CUSTOM_DGN_RANGE.contains(&dgn) {
        FireflyDgnKind::Custom
    } else if MULTIPLEXED_DGNS.contains(&dgn) {
        FireflyDgnKind::Multiplexed
    } else if SAFETY_DGNS.contains(&dgn) {
        FireflyDgnKind::Safety
    } else {
        FireflyDgnKind::Standard
    }
}

/// Decode a single, already-classified-as-Firefly frame. For multiplexed
/// DGNs this returns `Ok(None)` until the reassembler has collected every
/// part, at which point the caller should re-invoke with the reassembled
/// payload via [`decode_reassembled`].
pub fn decode(
    dgn: u32,
    frame: &Frame,
    reassembler: &FireflyReassembler,
) -> Result<Option<DecodedMessage>, GatewayError> {
    match classify_dgn(dgn) {
        FireflyDgnKind::Multiplexed => {
            match reassembler.ingest(dgn, &frame.source_network_id, frame.payload())? {
                Some(payload) => Ok(Some(decode_payload(dgn, &payload, frame)?)),
                None => Ok(None),
            }
        }
        FireflyDgnKind::Custom => Ok(Some(controls::decode_custom(dgn, frame)?)),
        FireflyDgnKind::Standard | FireflyDgnKind::Safety => {
            Ok(Some(decode_payload(dgn, frame.payload(), frame)?))
        }
    }
}

fn decode_payload(dgn: u32, payload: &[u8], frame: &Frame) -> Result<DecodedMessage, GatewayError> {
    match dgn {
        0x1FFB7 => status::decode_tank_levels(payload, frame),
        0x1FFB6 => status::decode_temperature_data(payload, frame),
        0x1FEF5 => status::decode_generic_status(payload, frame),
        _ => Err(GatewayError::UnknownMessage {
            protocol: Protocol::Firefly,
            id: dgn,
        }),
    }
}
