//! Abstract CAN transport. The gateway core never talks to a physical bus
//! directly; a collaborator supplies a [`Bus`] implementation (SocketCAN,
//! simulated, recorded trace playback, ...).
use crate::error::GatewayError;
use crate::frame::Frame;
use async_trait::async_trait;

/// A transport carrying CAN frames in and out of one physical or virtual
/// network. Implementations are expected to be cheap to clone/share behind
/// an `Arc` and safe to drive from a single reader task and a single
/// writer task concurrently.
#[async_trait]
pub trait Bus: Send + Sync {
    /// Send a frame. Returns `TransientBusError` on a recoverable failure
    /// (arbitration loss, short write) and `BusFault` on a condition the
    /// caller must treat as requiring isolation (bus-off).
    async fn send(&self, frame: Frame) -> Result<(), GatewayError>;

    /// Receive the next frame, suspending the calling task until one is
    /// available or the transport is closed.
    async fn recv(&self) -> Result<Frame, GatewayError>;
}
