//! Starting, timing and grading exam sessions.
//!
//! A session is graded exactly once, by whichever comes first: the user's
//! submit or the countdown. The grading decision is taken by the registry;
//! this module persists the result and records the outcome.

use sb_db::repositories::{exam_question, exam_score};
use sb_review::{
    ExamRecord, ExamType, Question, RngSource, SessionEvent, merge_exam_result, prepare_exam,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::session::{GradingTicket, SessionOutcome, SessionView};
use crate::{error::ApiError, metrics, profile::streak, state::ApiState};

/// Load the visible questions of an exam and open a session over them.
pub async fn start_session(
    state: &ApiState,
    user_id: Uuid,
    exam_type: ExamType,
    exam_number: i32,
) -> Result<SessionView, ApiError> {
    if !exam_type.accepts(exam_number) {
        return Err(ApiError::NotFound(format!(
            "There is no {exam_type} exam {exam_number}"
        )));
    }

    let pool: Vec<Question> = exam_question::list_visible(&state.pool, exam_type, exam_number)
        .await?
        .into_iter()
        .map(Question::from)
        .collect();
    if pool.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No questions available for {exam_type} exam {exam_number}"
        )));
    }

    open_session(state, user_id, exam_type, exam_number, pool)
}

/// Draw the session's questions from `pool` and start its countdown.
pub fn open_session(
    state: &ApiState,
    user_id: Uuid,
    exam_type: ExamType,
    exam_number: i32,
    pool: Vec<Question>,
) -> Result<SessionView, ApiError> {
    let available = pool.len();
    let questions = prepare_exam(
        pool,
        state.exam.question_count,
        &mut RngSource::from_entropy(),
    );

    let id = state.sessions.create(
        user_id,
        exam_type,
        exam_number,
        questions,
        state.exam.duration,
    );
    let timer = tokio::spawn(countdown(state.clone(), id));
    state.sessions.set_timer(id, timer);

    tracing::info!(
        session_id = %id,
        user_id = %user_id,
        exam_type = %exam_type,
        exam_number,
        available,
        "Exam session started"
    );

    Ok(state.sessions.view(id, user_id)?)
}

async fn countdown(state: ApiState, id: Uuid) {
    tokio::time::sleep(state.exam.duration).await;

    tracing::debug!(session_id = %id, "Exam time is up");
    if let Err(e) = complete_session(&state, id, None, SessionEvent::Expire).await {
        tracing::warn!(session_id = %id, error = %e, "Could not grade expired session");
    }
}

/// Grade and save the session if `event` is the first to end it.
///
/// `user_id` is the submitting user, or `None` for the countdown. A failed
/// save is logged and not retried; the session still moves to graded so the
/// user sees the score.
///
/// Once the grading ticket is issued, saving and finishing run in their own
/// task. A submit whose client disconnects still gets its attempt saved.
pub async fn complete_session(
    state: &ApiState,
    id: Uuid,
    user_id: Option<Uuid>,
    event: SessionEvent,
) -> Result<(), ApiError> {
    let Some(ticket) = state.sessions.begin_grading(id, user_id, event)? else {
        tracing::debug!(session_id = %id, ?event, "Session already graded");
        return Ok(());
    };

    tokio::spawn(save_and_finish(state.clone(), id, ticket))
        .await
        .map_err(|e| ApiError::Internal(format!("grading task for session {id} failed: {e}")))
}

async fn save_and_finish(state: ApiState, id: Uuid, ticket: GradingTicket) {
    let record = match save_result(&state.pool, &ticket).await {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::error!(
                session_id = %id,
                user_id = %ticket.user_id,
                error = %e,
                "Failed to save exam score"
            );
            None
        }
    };

    metrics::record_exam_graded(ticket.exam_type, ticket.ended_by, record.is_some());
    tracing::info!(
        session_id = %id,
        user_id = %ticket.user_id,
        ended_by = ?ticket.ended_by,
        correct = ticket.result.score.correct_answers,
        total = ticket.result.score.total_questions,
        elapsed_ms = ticket.result.time_elapsed_ms,
        "Exam session graded"
    );

    if record.is_some() {
        streak::record_study_day_best_effort(&state.pool, ticket.user_id).await;
    }

    state.sessions.finish(
        id,
        SessionOutcome {
            score: ticket.result.score,
            ended_by: ticket.ended_by,
            time_elapsed_ms: ticket.result.time_elapsed_ms,
            review: ticket.review,
            record,
        },
    );
}

/// Merge the attempt into the stored best-of record.
async fn save_result(pool: &PgPool, ticket: &GradingTicket) -> Result<ExamRecord, sqlx::Error> {
    let mut tx = pool.begin().await?;

    exam_score::lock_exam_score(
        &mut *tx,
        ticket.user_id,
        ticket.exam_type,
        ticket.exam_number,
    )
    .await?;
    let existing = exam_score::get_exam_score(
        &mut *tx,
        ticket.user_id,
        ticket.exam_type,
        ticket.exam_number,
    )
    .await?
    .as_ref()
    .map(ExamRecord::from);

    let merged = merge_exam_result(existing.as_ref(), &ticket.result);

    exam_score::upsert_exam_score(
        &mut *tx,
        ticket.user_id,
        ticket.exam_type,
        ticket.exam_number,
        &merged,
    )
    .await?;
    tx.commit().await?;

    Ok(merged)
}
