//! Exam scores and the best-of record kept per user and exam.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of grading one exam attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    /// Questions whose selection matched the correct options exactly.
    pub correct_answers: i32,
    /// Questions in the attempt.
    pub total_questions: i32,
}

impl Score {
    /// Score of `correct_answers` out of `total_questions`.
    pub const fn new(correct_answers: i32, total_questions: i32) -> Self {
        Self {
            correct_answers,
            total_questions,
        }
    }

    /// Every question answered correctly. An empty exam is never perfect.
    pub const fn is_perfect(&self) -> bool {
        self.total_questions > 0 && self.correct_answers == self.total_questions
    }

    /// Share of correct answers in percent, `None` for an empty exam.
    pub fn percentage(&self) -> Option<f64> {
        (self.total_questions > 0)
            .then(|| f64::from(self.correct_answers) / f64::from(self.total_questions) * 100.0)
    }
}

/// A freshly graded attempt, ready to be merged into the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamResult {
    /// Identifies the attempt, so merging it twice is a no-op.
    pub attempt_id: Uuid,
    /// Graded score.
    pub score: Score,
    /// Time from the start of the attempt to grading, in milliseconds.
    pub time_elapsed_ms: i64,
}

/// Best-of record persisted per (user, exam type, exam number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamRecord {
    /// Best number of correct answers ever reached.
    pub score: i32,
    /// Question count of the most recently merged attempt.
    pub total_questions: i32,
    /// Time kept by the merge policy, in milliseconds.
    pub time_elapsed_ms: i64,
    /// Attempts needed to reach a perfect score. Frozen once perfect.
    pub tries: i32,
    /// Attempt most recently merged into this record.
    pub last_attempt_id: Uuid,
}

impl ExamRecord {
    /// Record created by the very first attempt.
    pub const fn first(result: &ExamResult) -> Self {
        Self {
            score: result.score.correct_answers,
            total_questions: result.score.total_questions,
            time_elapsed_ms: result.time_elapsed_ms,
            tries: 1,
            last_attempt_id: result.attempt_id,
        }
    }
}

/// Merge a new attempt into the stored best-of record.
///
/// # Policy
///
/// * Score: the best score ever is kept.
/// * Time: replaced by the new time when it is faster at an equal or better
///   score, or slower at a strictly better score. An exact time tie never
///   replaces the stored time. Times are in milliseconds, so a tie is
///   rare in practice.
/// * Tries: incremented only while neither the stored score nor the new
///   score is perfect.
///
/// Merging the attempt that was merged last returns the record unchanged,
/// so applying the same result twice equals applying it once.
pub fn merge_exam_result(existing: Option<&ExamRecord>, result: &ExamResult) -> ExamRecord {
    let Some(existing) = existing else {
        return ExamRecord::first(result);
    };

    if existing.last_attempt_id == result.attempt_id {
        return *existing;
    }

    let new_score = result.score.correct_answers;
    let new_time = result.time_elapsed_ms;

    let should_update_time = (new_time < existing.time_elapsed_ms && new_score >= existing.score)
        || (new_time > existing.time_elapsed_ms && new_score > existing.score);

    // The stored score is compared against the new attempt's question count
    let existing_is_perfect = existing.score == result.score.total_questions;
    let tries = if !result.score.is_perfect() && !existing_is_perfect {
        existing.tries + 1
    } else {
        existing.tries
    };

    ExamRecord {
        score: existing.score.max(new_score),
        total_questions: result.score.total_questions,
        time_elapsed_ms: if should_update_time {
            new_time
        } else {
            existing.time_elapsed_ms
        },
        tries,
        last_attempt_id: result.attempt_id,
    }
}
