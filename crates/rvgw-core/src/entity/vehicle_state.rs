//! The single-writer/many-reader aggregate snapshot of every entity.
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Entity, EntityRegistry};

/// Holds the authoritative snapshot readers consume. Only the entity
/// update task ever takes the write lock; every external reader
/// (health/status interface, observer hub) takes the read lock.
pub struct VehicleState {
    registry: Arc<EntityRegistry>,
    snapshot: RwLock<Vec<Entity>>,
}

impl VehicleState {
    pub fn new(registry: Arc<EntityRegistry>) -> Self {
        Self {
            registry,
            snapshot: RwLock::new(Vec::new()),
        }
    }

    /// Refresh the read-optimized snapshot from the live registry. Called
    /// by the single writer task after each batch of entity updates.
    pub async fn refresh(&self) {
        let entities = self.registry.snapshot();
        *self.snapshot.write().await = entities;
    }

    pub async fn entities(&self) -> Vec<Entity> {
        self.snapshot.read().await.clone()
    }

    pub async fn entity(&self, entity_id: &str) -> Option<Entity> {
        self.snapshot
            .read()
            .await
            .iter()
            .find(|e| e.entity_id == entity_id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Protocol;
    use crate::message::DecodedMessage;
    use crate::signal::SignalValue;

    #[tokio::test]
    async fn refresh_pulls_from_the_live_registry() {
        let registry = Arc::new(EntityRegistry::new());
        let mut msg = DecodedMessage::new(Protocol::Rvc, 0x1FFB7, "can0", 1.0);
        msg.push_signal("tanks.fresh_water.level_percent", SignalValue::F64(42.0));
        registry.update_from_message(&msg);

        let state = VehicleState::new(registry);
        assert!(state.entities().await.is_empty());
        state.refresh().await;
        // the registry pre-populates one entity per coach-mapping entry at
        // startup, so the snapshot holds every device, not just the one
        // this test fed a signal into
        assert!(state.entities().await.len() > 1);
        let tanks = state.entity("tanks.status").await.unwrap();
        assert_eq!(tanks.signals.len(), 1);
    }
}
