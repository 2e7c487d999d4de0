// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reconcile Phase State Machine
//!
//! One reconcile pass of a single object, as a Mealy machine.
//!
//! # States
//!
//! ```text
//!              ┌──Vanished──> Gone
//!              │
//! Fetching ────┼──Fetched{deleted}──> Deleting ──FinalizerRemoved──> Released
//!              │                         └──CleanupPending──> Pending
//!              │
//!              └──Fetched{live}──> Live ──FinalizerAdded──> Guarded
//!                                  ──ResourceInitialized──> Initialized
//!                                  ──LogicApplied──> Applied
//!                                  ──StatusWritten──> Converged
//!
//! any non-terminal ──Failed──> Failed
//! ```
//!
//! # Outputs
//!
//! `persist_status` is set when the caller must write the status before
//! returning: on entering `Applied`, and on failures after the object was
//! fetched. A failure while fetching has no object to write; a failure in
//! `Applied` is the status write itself failing.

use std::fmt;

use super::{StateMachine, TransitionError, TransitionResult};

/// Phase of one reconcile pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReconcilePhase {
    Fetching,
    Deleting,
    Live,
    Guarded,
    Initialized,
    Applied,
    /// Status written, object converged (terminal)
    Converged,
    /// Finalizer removed, store completes the deletion (terminal)
    Released,
    /// Cleanup not finished yet, retry shortly (terminal)
    Pending,
    /// Object no longer exists (terminal)
    Gone,
    /// Pass aborted (terminal)
    Failed,
}

impl fmt::Display for ReconcilePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Outcome of a step performed by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileInput {
    Fetched { deleted: bool },
    Vanished,
    CleanupPending,
    FinalizerRemoved,
    FinalizerAdded,
    ResourceInitialized,
    LogicApplied,
    StatusWritten,
    Failed,
}

impl fmt::Display for ReconcileInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionOutput {
    /// Status must be written before the pass returns
    pub persist_status: bool,
}

impl TransitionOutput {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn persist() -> Self {
        Self {
            persist_status: true,
        }
    }
}

impl StateMachine for ReconcilePhase {
    type Input = ReconcileInput;
    type Output = TransitionOutput;

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use ReconcileInput as I;
        use ReconcilePhase::*;

        if self.is_terminal() {
            return Err(TransitionError::Terminal(self.to_string()));
        }

        match (self, input) {
            (Fetching, I::Fetched { deleted: true }) => Ok((Deleting, TransitionOutput::none())),
            (Fetching, I::Fetched { deleted: false }) => Ok((Live, TransitionOutput::none())),
            (Fetching, I::Vanished) => Ok((Gone, TransitionOutput::none())),
            (Fetching, I::Failed) => Ok((Failed, TransitionOutput::none())),

            (Deleting, I::CleanupPending) => Ok((Pending, TransitionOutput::none())),
            (Deleting, I::FinalizerRemoved) => Ok((Released, TransitionOutput::none())),

            (Live, I::FinalizerAdded) => Ok((Guarded, TransitionOutput::none())),
            (Guarded, I::ResourceInitialized) => Ok((Initialized, TransitionOutput::none())),
            (Initialized, I::LogicApplied) => Ok((Applied, TransitionOutput::persist())),
            (Applied, I::StatusWritten) => Ok((Converged, TransitionOutput::none())),
            (Applied, I::Failed) => Ok((Failed, TransitionOutput::none())),

            (_, I::Failed) => Ok((Failed, TransitionOutput::persist())),

            (from, input) => Err(TransitionError::InvalidTransition {
                from: from.to_string(),
                input: input.to_string(),
            }),
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReconcilePhase::Converged
                | ReconcilePhase::Released
                | ReconcilePhase::Pending
                | ReconcilePhase::Gone
                | ReconcilePhase::Failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn run(inputs: &[ReconcileInput]) -> (ReconcilePhase, Vec<bool>) {
        let mut phase = ReconcilePhase::Fetching;
        let mut persisted = Vec::new();
        for input in inputs {
            let (next, output) = phase.transition(input).unwrap();
            phase = next;
            persisted.push(output.persist_status);
        }
        (phase, persisted)
    }

    #[test]
    fn test_live_path_persists_once() {
        let (phase, persisted) = run(&[
            ReconcileInput::Fetched { deleted: false },
            ReconcileInput::FinalizerAdded,
            ReconcileInput::ResourceInitialized,
            ReconcileInput::LogicApplied,
            ReconcileInput::StatusWritten,
        ]);
        assert_eq!(phase, ReconcilePhase::Converged);
        assert_eq!(persisted, vec![false, false, false, true, false]);
    }

    #[test]
    fn test_deletion_path() {
        let (phase, _) = run(&[
            ReconcileInput::Fetched { deleted: true },
            ReconcileInput::FinalizerRemoved,
        ]);
        assert_eq!(phase, ReconcilePhase::Released);
    }

    #[test_case(&[ReconcileInput::Failed], false ; "fetch failure")]
    #[test_case(&[ReconcileInput::Fetched { deleted: true }, ReconcileInput::Failed], true ; "finalizer removal failure")]
    #[test_case(&[ReconcileInput::Fetched { deleted: false }, ReconcileInput::Failed], true ; "finalizer add failure")]
    #[test_case(&[ReconcileInput::Fetched { deleted: false }, ReconcileInput::FinalizerAdded, ReconcileInput::ResourceInitialized, ReconcileInput::Failed], true ; "app logic failure")]
    #[test_case(&[ReconcileInput::Fetched { deleted: false }, ReconcileInput::FinalizerAdded, ReconcileInput::ResourceInitialized, ReconcileInput::LogicApplied, ReconcileInput::Failed], false ; "status write failure")]
    fn test_failure_persistence(inputs: &[ReconcileInput], persist: bool) {
        let (phase, persisted) = run(inputs);
        assert_eq!(phase, ReconcilePhase::Failed);
        assert_eq!(persisted.last().copied(), Some(persist));
    }

    #[test]
    fn test_terminal_phases_reject_input() {
        let err = ReconcilePhase::Gone
            .transition(&ReconcileInput::Fetched { deleted: false })
            .unwrap_err();
        assert_eq!(err, TransitionError::Terminal("Gone".to_string()));
    }

    #[test]
    fn test_steps_cannot_be_skipped() {
        assert!(!ReconcilePhase::Live.can_transition(&ReconcileInput::LogicApplied));
        assert!(!ReconcilePhase::Deleting.can_transition(&ReconcileInput::FinalizerAdded));
    }
}
