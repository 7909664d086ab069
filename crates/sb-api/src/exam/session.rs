//! In-memory registry of running exam sessions.
//!
//! Each session owns its questions, the user's selections, the grading state
//! machine and the countdown task. Grading decisions are made under the
//! registry lock; persisting the result happens outside of it.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use chrono::{DateTime, Utc};
use sb_review::{
    Effect, ExamAttempt, ExamRecord, ExamResult, ExamSession, ExamType, Question,
    QuestionReview, Score, SessionEvent, SessionState, grade_exam, review_exam,
};
use serde::Serialize;
use thiserror::Error;
use tokio::{task::JoinHandle, time::Instant};
use uuid::Uuid;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("exam session not found")]
    NotFound,
    #[error("exam session is no longer accepting answers")]
    Closed,
    #[error("question {0} does not exist")]
    NoSuchQuestion(usize),
    #[error("option {option} does not exist on question {question}")]
    NoSuchOption { question: usize, option: usize },
    #[error("{answered} of {total} questions answered, answer every question before submitting")]
    Incomplete { answered: usize, total: usize },
}

/// Final result of a session, kept for display once grading is done.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOutcome {
    pub score: Score,
    pub ended_by: SessionEvent,
    pub time_elapsed_ms: i64,
    pub review: Vec<QuestionReview>,
    /// Best-of record after merging, `None` when saving failed
    pub record: Option<ExamRecord>,
}

/// Everything needed to persist one graded attempt.
#[derive(Debug, Clone)]
pub struct GradingTicket {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub exam_type: ExamType,
    pub exam_number: i32,
    pub result: ExamResult,
    pub ended_by: SessionEvent,
    pub review: Vec<QuestionReview>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    pub text: String,
}

/// A question as shown while the exam runs: correct flags stay hidden.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: Uuid,
    pub text: String,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub exam_type: ExamType,
    pub exam_number: i32,
    pub state: SessionState,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub questions: Vec<QuestionView>,
    /// Selected option indices, one list per question
    pub selections: Vec<Vec<usize>>,
    pub answered: usize,
    pub outcome: Option<SessionOutcome>,
}

#[derive(Debug)]
struct LiveSession {
    user_id: Uuid,
    exam_type: ExamType,
    exam_number: i32,
    attempt_id: Uuid,
    questions: Vec<Question>,
    attempt: ExamAttempt,
    machine: ExamSession,
    started: Instant,
    started_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    timer: Option<JoinHandle<()>>,
    outcome: Option<SessionOutcome>,
    finished: Option<Instant>,
}

impl LiveSession {
    fn view(&self, id: Uuid) -> SessionView {
        SessionView {
            id,
            exam_type: self.exam_type,
            exam_number: self.exam_number,
            state: self.machine.state(),
            started_at: self.started_at,
            expires_at: self.expires_at,
            questions: self
                .questions
                .iter()
                .map(|q| QuestionView {
                    id: q.id,
                    text: q.text.clone(),
                    options: q
                        .options
                        .iter()
                        .map(|o| OptionView {
                            text: o.text.clone(),
                        })
                        .collect(),
                })
                .collect(),
            selections: (0..self.questions.len())
                .map(|idx| self.attempt.selected(idx).iter().copied().collect())
                .collect(),
            answered: self.attempt.answered_count(),
            outcome: self.outcome.clone(),
        }
    }
}

/// Shared registry; cloning shares the same sessions.
#[derive(Clone, Debug, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<HashMap<Uuid, LiveSession>>>,
}

impl SessionRegistry {
    // Nothing in here panics while holding the lock, but a poisoned map is
    // still consistent enough to keep serving.
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, LiveSession>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new in-progress session and return its id.
    pub fn create(
        &self,
        user_id: Uuid,
        exam_type: ExamType,
        exam_number: i32,
        questions: Vec<Question>,
        duration: Duration,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let started_at = Utc::now();
        let expires_at = started_at
            + chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::hours(1));

        let session = LiveSession {
            user_id,
            exam_type,
            exam_number,
            attempt_id: Uuid::new_v4(),
            questions,
            attempt: ExamAttempt::new(),
            machine: ExamSession::new(),
            started: Instant::now(),
            started_at,
            expires_at,
            timer: None,
            outcome: None,
            finished: None,
        };

        self.lock().insert(id, session);
        id
    }

    /// Attach the countdown task. A task arriving after grading is dropped.
    pub fn set_timer(&self, id: Uuid, timer: JoinHandle<()>) {
        let mut sessions = self.lock();
        match sessions.get_mut(&id) {
            Some(session) if session.machine.is_open() => session.timer = Some(timer),
            _ => drop(timer),
        }
    }

    /// Session as seen by its owner. Other users get `NotFound`.
    pub fn view(&self, id: Uuid, user_id: Uuid) -> Result<SessionView, SessionError> {
        let sessions = self.lock();
        match sessions.get(&id) {
            Some(session) if session.user_id == user_id => Ok(session.view(id)),
            _ => Err(SessionError::NotFound),
        }
    }

    /// Toggle one option while the session is open.
    pub fn toggle_answer(
        &self,
        id: Uuid,
        user_id: Uuid,
        question: usize,
        option: usize,
    ) -> Result<SessionView, SessionError> {
        let mut sessions = self.lock();
        let session = match sessions.get_mut(&id) {
            Some(session) if session.user_id == user_id => session,
            _ => return Err(SessionError::NotFound),
        };

        if !session.machine.is_open() {
            return Err(SessionError::Closed);
        }
        let option_count = session
            .questions
            .get(question)
            .ok_or(SessionError::NoSuchQuestion(question))?
            .options
            .len();
        if option >= option_count {
            return Err(SessionError::NoSuchOption { question, option });
        }

        session.attempt.toggle(question, option);
        Ok(session.view(id))
    }

    /// Run the grading transition for `event`.
    ///
    /// Returns a ticket only for the first submit or expiry of a session; the
    /// caller then owns persisting it and must call [`Self::finish`]. Later
    /// calls return `Ok(None)`. `user_id` is `None` for the countdown.
    pub fn begin_grading(
        &self,
        id: Uuid,
        user_id: Option<Uuid>,
        event: SessionEvent,
    ) -> Result<Option<GradingTicket>, SessionError> {
        let mut sessions = self.lock();
        let session = match sessions.get_mut(&id) {
            Some(session) if user_id.is_none_or(|user| user == session.user_id) => session,
            _ => return Err(SessionError::NotFound),
        };

        if !session.machine.is_open() {
            return Ok(None);
        }

        let total = session.questions.len();
        if event == SessionEvent::Submit && !session.attempt.is_complete(total) {
            return Err(SessionError::Incomplete {
                answered: session.attempt.answered_count(),
                total,
            });
        }

        let transition = session.machine.submit_or_expire(event);
        let Effect::Grade(ended_by) = transition.effect else {
            return Ok(None);
        };

        match ended_by {
            SessionEvent::Submit => {
                if let Some(timer) = session.timer.take() {
                    timer.abort();
                }
            }
            // Called from inside the countdown task itself, which must keep running
            SessionEvent::Expire => drop(session.timer.take()),
        }

        let score = grade_exam(&session.questions, &session.attempt);
        let time_elapsed_ms = i64::try_from(session.started.elapsed().as_millis()).unwrap_or(i64::MAX);

        Ok(Some(GradingTicket {
            session_id: id,
            user_id: session.user_id,
            exam_type: session.exam_type,
            exam_number: session.exam_number,
            result: ExamResult {
                attempt_id: session.attempt_id,
                score,
                time_elapsed_ms,
            },
            ended_by,
            review: review_exam(&session.questions, &session.attempt),
        }))
    }

    /// Store the outcome and mark the session graded.
    pub fn finish(&self, id: Uuid, outcome: SessionOutcome) -> bool {
        let mut sessions = self.lock();
        let Some(session) = sessions.get_mut(&id) else {
            return false;
        };

        if !session.machine.finish() {
            return false;
        }
        session.outcome = Some(outcome);
        session.finished = Some(Instant::now());
        true
    }

    /// Drop graded sessions older than `retention` and sessions stuck past
    /// their deadline by more than `retention`. Returns how many were removed.
    pub fn prune(&self, retention: Duration, exam_duration: Duration) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();

        sessions.retain(|_, session| match session.finished {
            Some(finished) => finished.elapsed() < retention,
            None => session.started.elapsed() < exam_duration + retention,
        });

        let removed = before - sessions.len();
        for session in sessions.values_mut() {
            if session.finished.is_some() {
                session.timer.take();
            }
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
