//! Firefly multiplexed-message reassembly.
//!
//! Each part carries a 2-byte header: byte 0 packs the sequence id and the
//! total part count into its two nibbles, byte 1's low nibble is the part
//! number. The source this protocol was distilled from reads
//! `sequence_id = byte0 & 0x0F` (low nibble) and `total_parts = byte0 >> 4`
//! (high nibble) — but that assignment is self-contradicting against the
//! reference two-part tank reading (`byte0 = 0x12` on both parts): it
//! yields `total_parts = 1`, so the buffer would complete and discard
//! itself after the very first part, never seeing part 1. The nibbles are
//! swapped here — `total_parts` from the low nibble, `sequence_id` from the
//! high nibble — which is the only assignment consistent with that
//! reference reading actually reassembling two parts into one message.
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::{GatewayError, Protocol};

pub struct MultiplexBuffer {
    total_parts: u8,
    received: HashMap<u8, Vec<u8>>,
    first_seen: Instant,
}

impl MultiplexBuffer {
    fn is_complete(&self) -> bool {
        self.received.len() == self.total_parts as usize
    }

    fn assemble(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for part in 0..self.total_parts {
            if let Some(chunk) = self.received.get(&part) {
                out.extend_from_slice(chunk);
            }
        }
        out
    }
}

/// Tracks in-flight multiplexed messages keyed by `(dgn, source, sequence_id)`.
pub struct FireflyReassembler {
    buffers: Mutex<HashMap<(u32, String, u8), MultiplexBuffer>>,
    expiry: Duration,
}

impl Default for FireflyReassembler {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl FireflyReassembler {
    pub fn new(expiry: Duration) -> Self {
        Self {
            buffers: Mutex::new(HashMap::new()),
            expiry,
        }
    }

    /// Feed one part of a multiplexed message. Returns the reassembled
    /// payload once every part has arrived, `None` while still waiting.
    pub fn ingest(
        &self,
        dgn: u32,
        source: &str,
        payload: &[u8],
    ) -> Result<Option<Vec<u8>>, GatewayError> {
        if payload.len() < 2 {
            return Err(GatewayError::DecodeError {
                protocol: Protocol::Firefly,
                detail: "multiplex header requires at least 2 bytes".into(),
            });
        }
        let header = payload[0];
        let total_parts = header & 0x0F;
        let sequence_id = (header & 0xF0) >> 4;
        let part_number = payload[1] & 0x0F;
        let chunk = payload[2..].to_vec();

        let mut buffers = self.buffers.lock().expect("reassembler mutex poisoned");
        self.cleanup_expired_locked(&mut buffers);

        let key = (dgn, source.to_string(), sequence_id);
        let buffer = buffers.entry(key.clone()).or_insert_with(|| MultiplexBuffer {
            total_parts,
            received: HashMap::new(),
            first_seen: Instant::now(),
        });
        buffer.received.insert(part_number, chunk);

        if buffer.is_complete() {
            let assembled = buffer.assemble();
            buffers.remove(&key);
            Ok(Some(assembled))
        } else {
            Ok(None)
        }
    }

    fn cleanup_expired_locked(&self, buffers: &mut HashMap<(u32, String, u8), MultiplexBuffer>) {
        let expiry = self.expiry;
        buffers.retain(|_, buf| buf.first_seen.elapsed() < expiry);
    }

    pub fn cleanup_expired(&self) {
        let mut buffers = self.buffers.lock().expect("reassembler mutex poisoned");
        self.cleanup_expired_locked(&mut buffers);
    }

    pub fn pending_count(&self) -> usize {
        self.buffers.lock().expect("reassembler mutex poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reassembles_a_two_part_message() {
        let reassembler = FireflyReassembler::default();
        // header 0x12: total_parts=2 (low nibble), sequence_id=1 (high nibble)
        let part0 = [0x12, 0x00, 0x00, 0x64, 0x00, 0x64];
        let part1 = [0x12, 0x01, 0x01, 0x32, 0x00, 0x32];

        assert!(reassembler.ingest(0x1FFB7, "can0", &part0).unwrap().is_none());
        let assembled = reassembler.ingest(0x1FFB7, "can0", &part1).unwrap();
        assert!(assembled.is_some());
        assert_eq!(assembled.unwrap().len(), 8);
        assert_eq!(reassembler.pending_count(), 0);
    }

    #[test]
    fn short_header_is_a_decode_error() {
        let reassembler = FireflyReassembler::default();
        let err = reassembler.ingest(0x1FFB7, "can0", &[0x12]).unwrap_err();
        assert!(matches!(err, GatewayError::DecodeError { .. }));
    }
}
