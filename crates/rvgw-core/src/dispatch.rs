//! Frame classification: routes an incoming [`Frame`] to the right
//! protocol decoder based on the network's declared protocol family, with
//! OEM extensions (Spartan K2, Firefly) checked before the corresponding
//! standard table.
use crate::error::GatewayError;
use crate::firefly::{self, FireflyReassembler};
use crate::frame::Frame;
use crate::j1939;
use crate::message::DecodedMessage;
use crate::network::ProtocolFamily;
use crate::rvc;
use crate::spartan_k2;

/// Classify and decode one frame according to the protocol family declared
/// for its source network.
pub fn dispatch(
    family: ProtocolFamily,
    frame: &Frame,
    firefly_reassembler: &FireflyReassembler,
) -> Result<Option<DecodedMessage>, GatewayError> {
    match family {
        ProtocolFamily::Rvc => {
            let dgn = frame.arbitration_id & 0x3FFFF;
            if firefly::classify_dgn(dgn) != firefly::FireflyDgnKind::Standard
                || rvc::lookup_dgn(dgn).is_none()
            {
                firefly::decode(dgn, frame, firefly_reassembler)
            } else {
                rvc::decode(dgn, frame).map(Some)
            }
        }
        ProtocolFamily::J1939 => {
            let pgn = j1939::pgn_from_arbitration_id(frame.arbitration_id);
            if spartan_k2::lookup_pgn(pgn).is_some() {
                spartan_k2::decode(pgn, frame).map(Some)
            } else {
                j1939::decode(pgn, frame).map(Some)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_spartan_pgn_ahead_of_standard_j1939() {
        let reassembler = FireflyReassembler::default();
        let frame = Frame::new(0xFF00 << 8, &[0x90, 0x03, 1, 1, 1, 0, 0, 0], true, 1.0, "chassis-0");
        let msg = dispatch(ProtocolFamily::J1939, &frame, &reassembler)
            .unwrap()
            .unwrap();
        assert_eq!(msg.message_id, 0xFF00);
    }

    #[test]
    fn routes_firefly_custom_dgn_ahead_of_rvc() {
        let reassembler = FireflyReassembler::default();
        let frame = Frame::new(0x1F100, &[2, 75, 1, 0, 0, 0, 0, 0], true, 1.0, "rvc-0");
        let msg = dispatch(ProtocolFamily::Rvc, &frame, &reassembler)
            .unwrap()
            .unwrap();
        assert_eq!(msg.message_id, 0x1F100);
    }
}
