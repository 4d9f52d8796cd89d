//! Outbound observer push interface: a best-effort, non-blocking fan-out
//! of decoded messages and entity updates to external consumers, feeding
//! (for example) an HTTP/WebSocket surface that lives outside this crate.
use tokio::sync::broadcast;

use crate::entity::Entity;
use crate::message::DecodedMessage;
use crate::network::NetworkStatus;

/// Outbound gateway events. Clone is cheap; `DecodedMessage`/`Entity` are
/// the only non-trivial payloads and are already per-event allocations.
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    MessageDecoded(DecodedMessage),
    EntityUpdated(Entity),
    NetworkStatusChanged {
        network_id: String,
        status: NetworkStatus,
    },
    InterlockViolation {
        system: String,
        message: String,
    },
}

/// Wraps a `tokio::sync::broadcast` channel. A slow or absent subscriber
/// never blocks publishers: `broadcast` drops the oldest buffered message
/// for a lagging receiver rather than applying backpressure to the sender.
pub struct ObserverHub {
    tx: broadcast::Sender<GatewayEvent>,
}

impl ObserverHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Returns how many subscribers received it; zero is
    /// not an error, it just means nobody is currently listening.
    pub fn publish(&self, event: GatewayEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }
}

impl Default for ObserverHub {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Protocol;

    #[tokio::test]
    async fn publish_with_no_subscribers_does_not_error() {
        let hub = ObserverHub::default();
        let delivered = hub.publish(GatewayEvent::MessageDecoded(DecodedMessage::new(
            Protocol::Rvc,
            0x1FFB7,
            "can0",
            1.0,
        )));
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn a_subscriber_receives_published_events() {
        let hub = ObserverHub::default();
        let mut rx = hub.subscribe();
        hub.publish(GatewayEvent::NetworkStatusChanged {
            network_id: "can0".into(),
            status: NetworkStatus::Healthy,
        });
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, GatewayEvent::NetworkStatusChanged { .. }));
    }
}
