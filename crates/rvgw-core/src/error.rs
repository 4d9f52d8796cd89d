//! Crate-wide error type for the gateway core.
use std::fmt;

/// The protocol family a decode operation was attempted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Rvc,
    J1939,
    Firefly,
    SpartanK2,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Protocol::Rvc => "RV-C",
            Protocol::J1939 => "J1939",
            Protocol::Firefly => "Firefly",
            Protocol::SpartanK2 => "Spartan K2",
        };
        write!(f, "{s}")
    }
}

/// Every error kind the gateway core can produce.
///
/// One flat enum spans bus I/O, decoding, safety interlocks, feature
/// lifecycle, and configuration, mirroring a single crate-wide error type
/// rather than per-module error hierarchies.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// A recoverable bus-level error (timeout, short read, retryable I/O).
    TransientBusError { network_id: String, detail: String },
    /// A non-recoverable bus fault requiring isolation/recovery handling.
    BusFault { network_id: String, reason: String },
    /// A frame could not be decoded under the named protocol.
    DecodeError { protocol: Protocol, detail: String },
    /// A signal's bit range falls outside the frame's payload.
    SignalOutOfBounds {
        start_bit: u16,
        length: u16,
        frame_bits: u16,
    },
    /// No table entry exists for the given PGN/DGN.
    UnknownMessage { protocol: Protocol, id: u32 },
    /// A Spartan K2 safety interlock rejected a message.
    InterlockViolation { system: String, message: String },
    /// An invalid or contradictory configuration value.
    ConfigError(String),
    /// A feature failed to start.
    FeatureStartupError { feature: String, reason: String },
    /// The feature dependency graph is not acyclic.
    FeatureDependencyCycle { feature: String },
    /// An entity id with no registered entry was referenced.
    EntityNotFound(String),
    /// A network id with no registered node was referenced.
    NetworkNotFound(String),
    /// The operation was cancelled during shutdown. Never logged.
    CancellationError,
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::TransientBusError { network_id, detail } => {
                write!(f, "transient bus error on network '{network_id}': {detail}")
            }
            GatewayError::BusFault { network_id, reason } => {
                write!(f, "bus fault on network '{network_id}': {reason}")
            }
            GatewayError::DecodeError { protocol, detail } => {
                write!(f, "{protocol} decode error: {detail}")
            }
            GatewayError::SignalOutOfBounds {
                start_bit,
                length,
                frame_bits,
            } => write!(
                f,
                "signal at bit {start_bit} len {length} exceeds frame of {frame_bits} bits"
            ),
            GatewayError::UnknownMessage { protocol, id } => {
                write!(f, "unknown {protocol} message id 0x{id:X}")
            }
            GatewayError::InterlockViolation { system, message } => {
                write!(f, "{system} interlock violation: {message}")
            }
            GatewayError::ConfigError(detail) => write!(f, "configuration error: {detail}"),
            GatewayError::FeatureStartupError { feature, reason } => {
                write!(f, "feature '{feature}' failed to start: {reason}")
            }
            GatewayError::FeatureDependencyCycle { feature } => write!(
                f,
                "feature dependency graph contains a cycle at '{feature}'"
            ),
            GatewayError::EntityNotFound(id) => write!(f, "no entity registered with id '{id}'"),
            GatewayError::NetworkNotFound(id) => write!(f, "no network registered with id '{id}'"),
            GatewayError::CancellationError => write!(f, "operation cancelled"),
        }
    }
}

impl std::error::Error for GatewayError {}
