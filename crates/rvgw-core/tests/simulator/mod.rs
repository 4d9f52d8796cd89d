//! A virtual CAN network for integration tests: an in-memory `Bus`
//! implementation with a per-network inbox queue, the same shape as a
//! real transport without any physical I/O.
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use rvgw_core::error::GatewayError;
use rvgw_core::frame::Frame;
use rvgw_core::transport::Bus;
use tokio::sync::{mpsc, Mutex};

/// One end of a simulated bus: feed frames in with [`push`](SimulatedBus::push),
/// drain decoded-ready frames out with [`Bus::recv`].
pub struct SimulatedBus {
    inbox: Mutex<mpsc::UnboundedReceiver<Frame>>,
    inbox_tx: mpsc::UnboundedSender<Frame>,
    sent: StdMutex<Vec<Frame>>,
}

impl Default for SimulatedBus {
    fn default() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            inbox: Mutex::new(rx),
            inbox_tx: tx,
            sent: StdMutex::new(Vec::new()),
        }
    }
}

impl SimulatedBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a frame as if it had arrived from the physical network.
    pub fn push(&self, frame: Frame) {
        self.inbox_tx.send(frame).expect("simulated bus inbox closed");
    }

    pub fn sent_frames(&self) -> Vec<Frame> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Bus for SimulatedBus {
    async fn send(&self, frame: Frame) -> Result<(), GatewayError> {
        self.sent.lock().unwrap().push(frame);
        Ok(())
    }

    async fn recv(&self) -> Result<Frame, GatewayError> {
        let mut rx = self.inbox.lock().await;
        rx.recv().await.ok_or(GatewayError::CancellationError)
    }
}
