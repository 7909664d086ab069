//! Lifecycle of one timed exam attempt.
//!
//! A countdown expiry and a manual submit both call
//! [`ExamSession::submit_or_expire`]. Only the first call made while the
//! attempt is in progress is told to grade, so the score is computed and
//! persisted at most once per attempt.

use serde::{Deserialize, Serialize};

/// Where an attempt is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Answers may be toggled.
    #[default]
    InProgress,
    /// Answers are frozen and the score is being computed and saved.
    Grading,
    /// The outcome is final.
    Graded,
}

/// What ended the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    /// The user handed the attempt in.
    Submit,
    /// The countdown ran out.
    Expire,
}

/// What the caller must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Grade and persist now. Returned once per session.
    Grade(SessionEvent),
    /// Someone else already graded or is grading.
    Ignore,
}

/// Result of [`ExamSession::submit_or_expire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State after the event.
    pub state: SessionState,
    /// What the caller must do about it.
    pub effect: Effect,
}

/// Grading latch of one exam attempt.
#[derive(Debug, Clone, Default)]
pub struct ExamSession {
    state: SessionState,
    ended_by: Option<SessionEvent>,
}

impl ExamSession {
    /// A session in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Event that won the race to grade, once there is one.
    pub const fn ended_by(&self) -> Option<SessionEvent> {
        self.ended_by
    }

    /// Answers can still change.
    pub const fn is_open(&self) -> bool {
        matches!(self.state, SessionState::InProgress)
    }

    /// Feed a submit or an expiry. Only the first event seen in progress
    /// gets [`Effect::Grade`]; every later one gets [`Effect::Ignore`].
    pub fn submit_or_expire(&mut self, event: SessionEvent) -> Transition {
        let effect = match self.state {
            SessionState::InProgress => {
                self.state = SessionState::Grading;
                self.ended_by = Some(event);
                Effect::Grade(event)
            }
            SessionState::Grading | SessionState::Graded => Effect::Ignore,
        };

        Transition {
            state: self.state,
            effect,
        }
    }

    /// Mark grading as done. Returns `false` unless the session was grading.
    pub fn finish(&mut self) -> bool {
        if self.state == SessionState::Grading {
            self.state = SessionState::Graded;
            true
        } else {
            false
        }
    }
}
