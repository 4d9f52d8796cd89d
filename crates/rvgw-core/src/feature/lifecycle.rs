//! Per-feature lifecycle state machine:
//! `stopped -> starting -> running -> stopping -> stopped`, with `failed`
//! reachable from either `starting` or `running`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum FeatureState {
    Stopped,
    Starting,
    Running,
    Stopping,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeatureEvent {
    StartRequested,
    StartSucceeded,
    StartFailed,
    StopRequested,
    StopSucceeded,
    Crashed,
}

pub struct FeatureStateMachine {
    state: FeatureState,
}

impl Default for FeatureStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureStateMachine {
    pub fn new() -> Self {
        Self {
            state: FeatureState::Stopped,
        }
    }

    pub fn state(&self) -> FeatureState {
        self.state
    }

    fn process_event(&mut self, event: FeatureEvent) {
        self.state = match (self.state, event) {
            (FeatureState::Stopped, FeatureEvent::StartRequested) => FeatureState::Starting,
            (FeatureState::Starting, FeatureEvent::StartSucceeded) => FeatureState::Running,
            (FeatureState::Starting, FeatureEvent::StartFailed) => FeatureState::Failed,
            (FeatureState::Running, FeatureEvent::StopRequested) => FeatureState::Stopping,
            (FeatureState::Running, FeatureEvent::Crashed) => FeatureState::Failed,
            (FeatureState::Stopping, FeatureEvent::StopSucceeded) => FeatureState::Stopped,
            (FeatureState::Failed, FeatureEvent::StartRequested) => FeatureState::Starting,
            // any other (state, event) pair is a no-op: log and hold state.
            (state, event) => {
                log::warn!("unexpected event {event:?} in feature state {state:?}");
                state
            }
        };
    }

    pub fn request_start(&mut self) {
        self.process_event(FeatureEvent::StartRequested);
    }

    pub fn start_succeeded(&mut self) {
        self.process_event(FeatureEvent::StartSucceeded);
    }

    pub fn start_failed(&mut self) {
        self.process_event(FeatureEvent::StartFailed);
    }

    pub fn request_stop(&mut self) {
        self.process_event(FeatureEvent::StopRequested);
    }

    pub fn stop_succeeded(&mut self) {
        self.process_event(FeatureEvent::StopSucceeded);
    }

    pub fn crashed(&mut self) {
        self.process_event(FeatureEvent::Crashed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_start_stop() {
        let mut sm = FeatureStateMachine::new();
        sm.request_start();
        assert_eq!(sm.state(), FeatureState::Starting);
        sm.start_succeeded();
        assert_eq!(sm.state(), FeatureState::Running);
        sm.request_stop();
        assert_eq!(sm.state(), FeatureState::Stopping);
        sm.stop_succeeded();
        assert_eq!(sm.state(), FeatureState::Stopped);
    }

    #[test]
    fn failed_feature_can_be_restarted() {
        let mut sm = FeatureStateMachine::new();
        sm.request_start();
        sm.start_failed();
        assert_eq!(sm.state(), FeatureState::Failed);
        sm.request_start();
        assert_eq!(sm.state(), FeatureState::Starting);
    }

    #[test]
    fn a_crash_while_running_fails_the_feature() {
        let mut sm = FeatureStateMachine::new();
        sm.request_start();
        sm.start_succeeded();
        sm.crashed();
        assert_eq!(sm.state(), FeatureState::Failed);
    }

    #[test]
    fn unexpected_event_is_a_no_op() {
        let mut sm = FeatureStateMachine::new();
        sm.stop_succeeded();
        assert_eq!(sm.state(), FeatureState::Stopped);
    }
}
