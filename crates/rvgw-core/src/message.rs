//! The protocol-agnostic result of decoding a [`Frame`](crate::frame::Frame).
use crate::error::Protocol;
use crate::signal::SignalValue;

/// A decoded CAN message: the protocol it came from, the PGN/DGN that
/// identified it, its signals in definition order, and the safety/
/// diagnostic observations a decoder attached along the way.
#[derive(Debug, Clone)]
pub struct DecodedMessage {
    pub protocol: Protocol,
    pub message_id: u32,
    pub source_network_id: String,
    pub timestamp: f64,
    /// The sending node's address, where the protocol's arbitration id
    /// encodes one (J1939 and its chassis OEM extensions). Zero when the
    /// protocol has no such concept.
    pub source_address: u8,
    /// The arbitration priority the frame carried (J1939's top three id
    /// bits). Zero when the protocol has no priority concept.
    pub priority: u8,
    /// The OEM a decoding table attributes this message to (Cummins,
    /// Allison, a chassis body builder, Spartan Motors, Firefly). `None`
    /// for plain SAE/RV-C entries.
    pub manufacturer: Option<String>,
    /// Safety-interlock violations raised while decoding this message
    /// (Spartan K2 chassis systems). Empty for protocols with no interlock
    /// evaluation of their own.
    pub safety_violations: Vec<String>,
    /// Diagnostic trouble codes carried by this message, where the
    /// protocol/DGN encodes them.
    pub diagnostic_codes: Vec<u16>,
    signals: Vec<(String, SignalValue)>,
    raw_signals: Vec<(String, u64)>,
}

impl DecodedMessage {
    pub fn new(
        protocol: Protocol,
        message_id: u32,
        source_network_id: impl Into<String>,
        timestamp: f64,
    ) -> Self {
        Self {
            protocol,
            message_id,
            source_network_id: source_network_id.into(),
            timestamp,
            source_address: 0,
            priority: 0,
            manufacturer: None,
            safety_violations: Vec::new(),
            diagnostic_codes: Vec::new(),
            signals: Vec::new(),
            raw_signals: Vec::new(),
        }
    }

    pub fn with_source_address(mut self, source_address: u8) -> Self {
        self.source_address = source_address;
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn push_signal(&mut self, name: impl Into<String>, value: SignalValue) {
        self.signals.push((name.into(), value));
    }

    /// Record the pre-scale, pre-clamp bits a signal was extracted from,
    /// alongside its scaled value pushed via [`push_signal`].
    pub fn push_raw_signal(&mut self, name: impl Into<String>, raw: u64) {
        self.raw_signals.push((name.into(), raw));
    }

    pub fn push_diagnostic_code(&mut self, code: u16) {
        self.diagnostic_codes.push(code);
    }

    pub fn signals(&self) -> &[(String, SignalValue)] {
        &self.signals
    }

    pub fn raw_signals(&self) -> &[(String, u64)] {
        &self.raw_signals
    }

    pub fn signal(&self, name: &str) -> Option<&SignalValue> {
        self.signals.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn raw_signal(&self, name: &str) -> Option<u64> {
        self.raw_signals.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }
}
