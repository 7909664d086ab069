use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use sb_db::{models::ExamScoreRow, repositories::exam_score};
use sb_review::{ExamType, Score, SessionEvent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{service, session::SessionView};
use crate::{ApiState, auth::AuthUser, error::ApiError, extract::ValidJson};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/exams/scores", get(list_scores))
        .route("/exams/{exam_type}/{exam_number}/score", get(get_score))
        .route("/exams/{exam_type}/{exam_number}/sessions", post(start_session))
        .route("/exam-sessions/{id}", get(get_session))
        .route("/exam-sessions/{id}/answers", put(toggle_answer))
        .route("/exam-sessions/{id}/submit", post(submit_session))
}

async fn start_session(
    State(state): State<ApiState>,
    user: AuthUser,
    Path((exam_type, exam_number)): Path<(ExamType, i32)>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let view = service::start_session(&state, user.user_id, exam_type, exam_number).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_session(
    State(state): State<ApiState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.sessions.view(id, user.user_id)?))
}

#[derive(Debug, Deserialize, Validate)]
struct AnswerRequest {
    question_index: usize,
    option_index: usize,
}

/// Select or unselect one option
async fn toggle_answer(
    State(state): State<ApiState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(body): ValidJson<AnswerRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let view =
        state
            .sessions
            .toggle_answer(id, user.user_id, body.question_index, body.option_index)?;
    Ok(Json(view))
}

/// Submitting a session that is already graded returns its outcome again
async fn submit_session(
    State(state): State<ApiState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    service::complete_session(&state, id, Some(user.user_id), SessionEvent::Submit).await?;
    Ok(Json(state.sessions.view(id, user.user_id)?))
}

#[derive(Debug, Serialize)]
struct ScoreView {
    #[serde(flatten)]
    record: ExamScoreRow,
    percentage: Option<f64>,
    perfect: bool,
}

impl From<ExamScoreRow> for ScoreView {
    fn from(record: ExamScoreRow) -> Self {
        let score = Score::new(record.score, record.total_questions);
        Self {
            percentage: score.percentage(),
            perfect: score.is_perfect(),
            record,
        }
    }
}

async fn list_scores(
    State(state): State<ApiState>,
    user: AuthUser,
) -> Result<Json<Vec<ScoreView>>, ApiError> {
    let scores = exam_score::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(scores.into_iter().map(ScoreView::from).collect()))
}

async fn get_score(
    State(state): State<ApiState>,
    user: AuthUser,
    Path((exam_type, exam_number)): Path<(ExamType, i32)>,
) -> Result<Json<ScoreView>, ApiError> {
    let score = exam_score::get_exam_score(&state.pool, user.user_id, exam_type, exam_number)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("No score yet for {exam_type} exam {exam_number}"))
        })?;
    Ok(Json(score.into()))
}
