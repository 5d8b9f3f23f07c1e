//! Seam to the external protocol engine.
//!
//! The core never constructs wire messages or touches sockets; it hands
//! an [`ActionSequence`] to a [`ProtocolExecutor`] and gets back either
//! the wall-clock time the prefix took or a [`ProtocolFault`]. The call
//! is synchronous and may block for an arbitrary time; bounding a hang
//! is the executor's responsibility.

use std::collections::VecDeque;
use std::time::Duration;

use crate::error::ProtocolFault;
use crate::trace::ActionSequence;

/// Executes one action-sequence prefix against the peer.
pub trait ProtocolExecutor {
    /// Run the prefix to completion and report the elapsed wall-clock
    /// time, or a fault if the protocol flow did not complete.
    fn execute(&mut self, actions: &ActionSequence) -> Result<Duration, ProtocolFault>;
}

/// Scripted executor for tests and offline replay.
///
/// Pops one pre-recorded outcome per `execute` call, in order. An
/// exhausted script reports a fault rather than panicking, so a
/// mis-sized script shows up as sentinel samples in the dataset instead
/// of tearing the run down.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    outcomes: VecDeque<Result<Duration, ProtocolFault>>,
    calls: usize,
}

impl ScriptedExecutor {
    /// Create an executor with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor from elapsed times in nanoseconds.
    pub fn from_nanos(nanos: &[u64]) -> Self {
        let mut script = Self::new();
        for &n in nanos {
            script.push_elapsed_nanos(n);
        }
        script
    }

    /// Append a successful outcome with the given elapsed nanoseconds.
    pub fn push_elapsed_nanos(&mut self, nanos: u64) {
        self.outcomes.push_back(Ok(Duration::from_nanos(nanos)));
    }

    /// Append a faulted outcome.
    pub fn push_fault(&mut self, message: impl Into<String>) {
        self.outcomes.push_back(Err(ProtocolFault::new(message)));
    }

    /// How many times `execute` has been called.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// How many outcomes are still queued.
    pub fn remaining(&self) -> usize {
        self.outcomes.len()
    }
}

impl ProtocolExecutor for ScriptedExecutor {
    fn execute(&mut self, _actions: &ActionSequence) -> Result<Duration, ProtocolFault> {
        self.calls += 1;
        self.outcomes
            .pop_front()
            .unwrap_or_else(|| Err(ProtocolFault::new("script exhausted")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_outcomes_pop_in_order() {
        let mut exec = ScriptedExecutor::from_nanos(&[100, 200]);
        exec.push_fault("handshake aborted");

        let seq = ActionSequence::new();
        assert_eq!(exec.execute(&seq), Ok(Duration::from_nanos(100)));
        assert_eq!(exec.execute(&seq), Ok(Duration::from_nanos(200)));
        assert!(exec.execute(&seq).is_err());
        assert_eq!(exec.calls(), 3);
        assert_eq!(exec.remaining(), 0);
    }

    #[test]
    fn exhausted_script_faults_instead_of_panicking() {
        let mut exec = ScriptedExecutor::new();
        let outcome = exec.execute(&ActionSequence::new());
        assert_eq!(outcome, Err(ProtocolFault::new("script exhausted")));
    }
}
