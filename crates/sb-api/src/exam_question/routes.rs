use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use sb_db::{
    models::{ExamQuestion, ExamQuestionInput, Report},
    repositories::exam_question,
};
use sb_review::{ExamOption, ExamType};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    ApiState,
    auth::AuthUser,
    error::ApiError,
    extract::ValidJson,
    flash_card::ContentReportRequest,
    report::service::{self as report_service, ReportedItem},
    validation,
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/exam-questions", get(list_questions).post(create_question))
        .route("/exam-questions/{id}/report", post(report_question))
}

#[derive(Debug, Deserialize)]
struct QuestionFilter {
    exam_type: Option<ExamType>,
    exam_number: Option<i32>,
}

/// Authoring view: hidden questions and correct flags included
async fn list_questions(
    State(state): State<ApiState>,
    _user: AuthUser,
    Query(filter): Query<QuestionFilter>,
) -> Result<Json<Vec<ExamQuestion>>, ApiError> {
    let questions =
        exam_question::list_all(&state.pool, filter.exam_type, filter.exam_number).await?;
    Ok(Json(questions))
}

#[derive(Debug, Deserialize, Validate)]
struct QuestionRequest {
    exam_type: ExamType,
    exam_number: i32,
    #[validate(length(min = 1))]
    question: String,
    options: Vec<ExamOption>,
}

async fn create_question(
    State(state): State<ApiState>,
    user: AuthUser,
    ValidJson(body): ValidJson<QuestionRequest>,
) -> Result<(StatusCode, Json<ExamQuestion>), ApiError> {
    let input = validation::normalize_exam_question(ExamQuestionInput {
        exam_type: body.exam_type,
        exam_number: body.exam_number,
        question: body.question,
        options: body.options,
    })?;

    let question = exam_question::insert(&state.pool, user.user_id, &input).await?;

    tracing::info!(
        question_id = %question.id,
        exam_type = %input.exam_type,
        exam_number = input.exam_number,
        options = input.options.len(),
        "Exam question created"
    );
    Ok((StatusCode::CREATED, Json(question)))
}

async fn report_question(
    State(state): State<ApiState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(body): ValidJson<ContentReportRequest>,
) -> Result<(StatusCode, Json<Report>), ApiError> {
    let message = validation::normalize_report_message(body.message)?;
    let report =
        report_service::report_item(&state.pool, &user, ReportedItem::ExamQuestion(id), message)
            .await?;
    Ok((StatusCode::CREATED, Json(report)))
}
