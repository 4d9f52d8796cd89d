//! Protocol engine for multi-network RV-C/J1939/Firefly/Spartan K2 CAN
//! gateways: frame classification, decoding, the entity model, and the
//! feature lifecycle manager.

pub mod config;
pub mod control;
pub mod dispatch;
pub mod entity;
pub mod error;
pub mod feature;
pub mod firefly;
pub mod frame;
pub mod health;
pub mod j1939;
pub mod message;
pub mod network;
pub mod observer;
pub mod rvc;
pub mod signal;
pub mod spartan_k2;
pub mod transport;

pub use error::GatewayError;
pub use frame::Frame;
pub use message::DecodedMessage;
pub use transport::Bus;
