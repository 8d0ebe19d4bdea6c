// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark run state machine with typed state transitions.
//!
//! Implements the run lifecycle: NotStarted → Preparing → Running → Completed,
//! with Running → Aborted for fail-fast stops and deadline expiry.
//! Invalid transitions result in StateTransitionError.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::StateTransitionError;

/// Run lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Created, nothing prepared yet.
    NotStarted,

    /// Trial inputs are being materialized (untimed).
    Preparing,

    /// Trials are executing (timed).
    Running,

    /// Every trial reported back.
    Completed,

    /// The run stopped before every trial reported back.
    Aborted,
}

impl RunState {
    /// Get the state name for error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::Preparing => "Preparing",
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Aborted => "Aborted",
        }
    }

    /// Check if transition to the target state is valid.
    pub fn can_transition_to(&self, target: RunState) -> bool {
        matches!(
            (self, target),
            (Self::NotStarted, Self::Preparing)
                | (Self::Preparing, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Aborted)
        )
    }

    /// Whether the run has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// State machine for one benchmark run.
#[derive(Debug)]
pub struct RunStateMachine {
    run: String,
    current_state: RunState,
    last_transition: Instant,
    transition_count: u64,
}

impl RunStateMachine {
    /// Create a new state machine for a named run.
    pub fn new(run: impl Into<String>) -> Self {
        Self {
            run: run.into(),
            current_state: RunState::NotStarted,
            last_transition: Instant::now(),
            transition_count: 0,
        }
    }

    /// Get the current state.
    pub fn state(&self) -> RunState {
        self.current_state
    }

    /// Get the run label.
    pub fn run(&self) -> &str {
        &self.run
    }

    /// Get total number of transitions.
    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    /// Attempt to transition to a new state.
    pub fn transition_to(&mut self, target: RunState) -> Result<(), StateTransitionError> {
        if !self.current_state.can_transition_to(target) {
            return Err(StateTransitionError::InvalidTransition {
                run: self.run.clone(),
                from: self.current_state.name(),
                to: target.name(),
            });
        }

        tracing::debug!(
            run = %self.run,
            from = self.current_state.name(),
            to = target.name(),
            elapsed_us = self.last_transition.elapsed().as_micros() as u64,
            "State transition"
        );

        self.current_state = target;
        self.last_transition = Instant::now();
        self.transition_count += 1;

        Ok(())
    }
}
