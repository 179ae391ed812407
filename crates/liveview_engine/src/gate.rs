use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum GateState {
    #[default]
    Idle,
    Running,
    /// Running, and at least one more request arrived meanwhile.
    RunningWithFollowUp,
}

/// Per-subject single-flight guard. Requests that arrive while a refresh is
/// running collapse into one follow-up refresh.
#[derive(Debug, Default)]
pub(crate) struct RefreshGate {
    state: Mutex<GateState>,
}

impl RefreshGate {
    /// Returns `true` when the caller must start a refresh now.
    pub(crate) fn request(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match *state {
            GateState::Idle => {
                *state = GateState::Running;
                true
            }
            GateState::Running | GateState::RunningWithFollowUp => {
                *state = GateState::RunningWithFollowUp;
                false
            }
        }
    }

    /// Marks the running refresh done. Returns `true` when a follow-up must
    /// run; the gate then stays held by the caller.
    pub(crate) fn finish(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match *state {
            GateState::RunningWithFollowUp => {
                *state = GateState::Running;
                true
            }
            GateState::Running | GateState::Idle => {
                *state = GateState::Idle;
                false
            }
        }
    }

    pub(crate) fn is_busy(&self) -> bool {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) != GateState::Idle
    }
}
