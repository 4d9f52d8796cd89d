//! Feature/lifecycle manager: dependency-ordered startup/shutdown and
//! safety-classification-driven degradation.
mod lifecycle;

pub use lifecycle::{FeatureState, FeatureStateMachine};

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::error::GatewayError;

/// Identifies one of the gateway's internal subsystems. A fixed,
/// tagged-variant registry rather than a string-keyed lookup table, so a
/// typo in a dependency list is a compile error, not a runtime surprise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureId {
    CanManager,
    RvcDecoder,
    J1939Decoder,
    FireflyDecoder,
    SpartanK2Decoder,
    J1939Bridge,
    EntityManager,
    ObserverHub,
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// How the manager should react when this feature fails to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyClass {
    /// The gateway cannot run without it; a startup failure aborts the
    /// whole startup sequence.
    Critical,
    /// Tied to a safety interlock (the J1939 bridge feeding Spartan K2
    /// readings, say); a startup failure applies the configured
    /// degradation policy rather than aborting or being absorbed silently.
    SafetyRelated,
    /// Feeds a control surface whose target must have a known position
    /// before it is safe to move (slides, leveling); treated the same as
    /// `SafetyRelated` on failure.
    PositionCritical,
    /// Run degraded without it; a startup failure is logged and the
    /// feature is marked `Failed`, but startup continues.
    Operational,
    /// Purely best-effort; a startup failure is logged at a lower level
    /// and otherwise ignored.
    Maintenance,
}

#[async_trait]
pub trait Feature: Send + Sync {
    fn id(&self) -> FeatureId;
    fn dependencies(&self) -> &[FeatureId];
    fn safety_class(&self) -> SafetyClass;
    async fn start(&self) -> Result<(), GatewayError>;
    async fn stop(&self) -> Result<(), GatewayError>;
}

struct FeatureEntry {
    feature: Box<dyn Feature>,
    state_machine: FeatureStateMachine,
}

/// Owns every registered feature and drives dependency-ordered
/// startup/shutdown.
pub struct FeatureManager {
    entries: HashMap<FeatureId, FeatureEntry>,
    /// Features currently running under the degradation policy after a
    /// `SafetyRelated`/`PositionCritical` startup failure.
    degraded: HashSet<FeatureId>,
}

impl Default for FeatureManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureManager {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            degraded: HashSet::new(),
        }
    }

    /// Features currently running under the degradation policy.
    pub fn degraded_features(&self) -> impl Iterator<Item = &FeatureId> {
        self.degraded.iter()
    }

    pub fn register(&mut self, feature: Box<dyn Feature>) {
        let id = feature.id();
        self.entries.insert(
            id,
            FeatureEntry {
                feature,
                state_machine: FeatureStateMachine::new(),
            },
        );
    }

    pub fn state_of(&self, id: FeatureId) -> Option<FeatureState> {
        self.entries.get(&id).map(|e| e.state_machine.state())
    }

    /// Topologically order every registered feature so each starts after
    /// all of its dependencies.
    fn topological_order(&self) -> Result<Vec<FeatureId>, GatewayError> {
        let mut order = Vec::with_capacity(self.entries.len());
        let mut visited: HashSet<FeatureId> = HashSet::new();
        let mut in_progress: HashSet<FeatureId> = HashSet::new();

        fn visit(
            id: FeatureId,
            entries: &HashMap<FeatureId, FeatureEntry>,
            visited: &mut HashSet<FeatureId>,
            in_progress: &mut HashSet<FeatureId>,
            order: &mut Vec<FeatureId>,
        ) -> Result<(), GatewayError> {
            if visited.contains(&id) {
                return Ok(());
            }
            if !in_progress.insert(id) {
                return Err(GatewayError::FeatureDependencyCycle {
                    feature: id.to_string(),
                });
            }
            if let Some(entry) = entries.get(&id) {
                for dep in entry.feature.dependencies() {
                    visit(*dep, entries, visited, in_progress, order)?;
                }
            }
            in_progress.remove(&id);
            visited.insert(id);
            order.push(id);
            Ok(())
        }

        for id in self.entries.keys() {
            visit(*id, &self.entries, &mut visited, &mut in_progress, &mut order)?;
        }
        Ok(order)
    }

    /// Start every feature in dependency order. A `Critical` failure
    /// aborts the whole sequence; `Standard`/`Optional` failures are
    /// logged and the feature is left `Failed` while startup continues.
    pub async fn start_all(&mut self) -> Result<(), GatewayError> {
        let order = self.topological_order()?;
        for id in order {
            let Some(entry) = self.entries.get_mut(&id) else {
                continue;
            };
            entry.state_machine.request_start();
            match entry.feature.start().await {
                Ok(()) => entry.state_machine.start_succeeded(),
                Err(err) => {
                    entry.state_machine.start_failed();
                    match entry.feature.safety_class() {
                        SafetyClass::Critical => {
                            log::error!("critical feature '{id}' failed to start: {err}");
                            return Err(GatewayError::FeatureStartupError {
                                feature: id.to_string(),
                                reason: err.to_string(),
                            });
                        }
                        SafetyClass::SafetyRelated | SafetyClass::PositionCritical => {
                            log::warn!("applying degradation policy to '{id}' after startup failure: {err}");
                            self.degraded.insert(id);
                        }
                        SafetyClass::Operational => {
                            log::warn!("feature '{id}' failed to start, continuing degraded: {err}");
                        }
                        SafetyClass::Maintenance => {
                            log::debug!("optional feature '{id}' failed to start: {err}");
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Stop every feature in reverse dependency order.
    pub async fn stop_all(&mut self) -> Result<(), GatewayError> {
        let mut order = self.topological_order()?;
        order.reverse();
        for id in order {
            let Some(entry) = self.entries.get_mut(&id) else {
                continue;
            };
            if entry.state_machine.state() != FeatureState::Running {
                continue;
            }
            entry.state_machine.request_stop();
            match entry.feature.stop().await {
                Ok(()) => entry.state_machine.stop_succeeded(),
                Err(err) => {
                    log::warn!("feature '{id}' failed to stop cleanly: {err}");
                    entry.state_machine.stop_succeeded();
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct StubFeature {
        id: FeatureId,
        deps: Vec<FeatureId>,
        class: SafetyClass,
        fail: bool,
        started: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Feature for StubFeature {
        fn id(&self) -> FeatureId {
            self.id
        }
        fn dependencies(&self) -> &[FeatureId] {
            &self.deps
        }
        fn safety_class(&self) -> SafetyClass {
            self.class
        }
        async fn start(&self) -> Result<(), GatewayError> {
            if self.fail {
                return Err(GatewayError::FeatureStartupError {
                    feature: self.id.to_string(),
                    reason: "stub failure".into(),
                });
            }
            self.started.store(true, Ordering::SeqCst);
            Ok(())
        }
        async fn stop(&self) -> Result<(), GatewayError> {
            self.started.store(false, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn starts_dependencies_before_dependents() {
        let can_started = Arc::new(AtomicBool::new(false));
        let mut manager = FeatureManager::new();
        manager.register(Box::new(StubFeature {
            id: FeatureId::RvcDecoder,
            deps: vec![FeatureId::CanManager],
            class: SafetyClass::Operational,
            fail: false,
            started: Arc::new(AtomicBool::new(false)),
        }));
        manager.register(Box::new(StubFeature {
            id: FeatureId::CanManager,
            deps: vec![],
            class: SafetyClass::Critical,
            fail: false,
            started: can_started.clone(),
        }));

        manager.start_all().await.unwrap();
        assert_eq!(manager.state_of(FeatureId::CanManager), Some(FeatureState::Running));
        assert_eq!(manager.state_of(FeatureId::RvcDecoder), Some(FeatureState::Running));
        assert!(can_started.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn critical_failure_aborts_startup() {
        let mut manager = FeatureManager::new();
        manager.register(Box::new(StubFeature {
            id: FeatureId::CanManager,
            deps: vec![],
            class: SafetyClass::Critical,
            fail: true,
            started: Arc::new(AtomicBool::new(false)),
        }));
        assert!(manager.start_all().await.is_err());
    }

    #[tokio::test]
    async fn optional_failure_is_absorbed() {
        let mut manager = FeatureManager::new();
        manager.register(Box::new(StubFeature {
            id: FeatureId::ObserverHub,
            deps: vec![],
            class: SafetyClass::Maintenance,
            fail: true,
            started: Arc::new(AtomicBool::new(false)),
        }));
        manager.start_all().await.unwrap();
        assert_eq!(manager.state_of(FeatureId::ObserverHub), Some(FeatureState::Failed));
    }

    #[tokio::test]
    async fn safety_related_failure_applies_degradation_policy() {
        let mut manager = FeatureManager::new();
        manager.register(Box::new(StubFeature {
            id: FeatureId::J1939Bridge,
            deps: vec![],
            class: SafetyClass::SafetyRelated,
            fail: true,
            started: Arc::new(AtomicBool::new(false)),
        }));
        manager.start_all().await.unwrap();
        assert_eq!(manager.state_of(FeatureId::J1939Bridge), Some(FeatureState::Failed));
        assert!(manager.degraded_features().any(|id| *id == FeatureId::J1939Bridge));
    }
}
