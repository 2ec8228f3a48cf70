//! Coarse daemon lifecycle state

use bitflags::bitflags;
use tracing::info;

use crate::inform::target;

bitflags! {
    /// Phases the daemon has reached. Generic code asserts on these.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DaemonState: u32 {
        const CONFIGURED = 1 << 0;
        const CONNECTED = 1 << 1;
        const INITIALIZED = 1 << 2;
        const EVENT = 1 << 3;
        const TIMEOUT = 1 << 4;
        const RECONFIGURE = 1 << 5;
        /// Not yet supported
        const MULTIHEAD = 1 << 6;
    }
}

impl DaemonState {
    pub fn enter(&mut self, state: DaemonState) {
        self.insert(state);
        assert!(self.contains(state));
        info!(target: target::STATE, state = ?state, current = ?*self, "state set");
    }

    pub fn leave(&mut self, state: DaemonState) {
        self.remove(state);
        assert!(!self.intersects(state));
        info!(target: target::STATE, state = ?state, current = ?*self, "state unset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_and_leave_only_touch_given_bits() {
        let mut state = DaemonState::default();
        assert!(state.is_empty());

        state.enter(DaemonState::CONFIGURED);
        state.enter(DaemonState::CONNECTED);
        assert_eq!(state, DaemonState::CONFIGURED | DaemonState::CONNECTED);

        // Clearing one phase must not wipe the others
        state.leave(DaemonState::CONNECTED);
        assert_eq!(state, DaemonState::CONFIGURED);
    }
}
