// Copyright (c) 2025 - Cowboy AI, Inc.
//! Finite State Machine Abstractions
//!
//! Generic state machine types for modeling the reconcile control loop.
//! Transitions are pure functions; the reconciler performs the I/O and feeds
//! the outcome back in as the next input.
//!
//! # Mealy Machine
//!
//! Output depends on both current state and input:
//! ```text
//! (State, Input) → (State, Output)
//! ```
//!
//! The reconcile machine uses the output to tell the caller whether the
//! status sub-document must be written before returning.
//!
//! # Example
//!
//! ```rust
//! use org_controller::state_machine::{ReconcileInput, ReconcilePhase, StateMachine};
//!
//! let (phase, _) = ReconcilePhase::Fetching
//!     .transition(&ReconcileInput::Fetched { deleted: false })
//!     .unwrap();
//! assert_eq!(phase, ReconcilePhase::Live);
//! ```

pub mod reconcile_phase;

pub use reconcile_phase::{ReconcileInput, ReconcilePhase, TransitionOutput};

/// Result of a state transition
pub type TransitionResult<S> = Result<S, TransitionError>;

/// Errors that can occur during state transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// No transition defined for this (state, input) pair
    #[error("Invalid transition from {from} on {input}")]
    InvalidTransition { from: String, input: String },

    /// The machine already reached a terminal state
    #[error("State {0} is terminal")]
    Terminal(String),
}

/// Trait for finite state machines
///
/// Implement this trait to define a state machine with typed states,
/// inputs, and outputs.
pub trait StateMachine: Sized + Clone {
    /// Input type that triggers transitions
    type Input;

    /// Output type produced by transitions (use () if none)
    type Output;

    /// Attempt to transition to a new state given an input
    ///
    /// # Returns
    /// - Ok((new_state, output)) if transition is valid
    /// - Err(TransitionError) if transition is invalid
    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)>;

    /// Check if a transition is valid without performing it
    fn can_transition(&self, input: &Self::Input) -> bool {
        self.transition(input).is_ok()
    }

    /// True when no input is accepted any more
    fn is_terminal(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Simple test FSM: On/Off switch
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Switch {
        Off,
        On,
    }

    enum SwitchInput {
        Press,
    }

    impl StateMachine for Switch {
        type Input = SwitchInput;
        type Output = ();

        fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
            match (self, input) {
                (Switch::Off, SwitchInput::Press) => Ok((Switch::On, ())),
                (Switch::On, SwitchInput::Press) => Ok((Switch::Off, ())),
            }
        }

        fn is_terminal(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_simple_transition() {
        let switch = Switch::Off;
        let (new_state, _) = switch.transition(&SwitchInput::Press).unwrap();
        assert_eq!(new_state, Switch::On);
    }

    #[test]
    fn test_can_transition() {
        assert!(Switch::Off.can_transition(&SwitchInput::Press));
        assert!(!Switch::On.is_terminal());
    }
}
