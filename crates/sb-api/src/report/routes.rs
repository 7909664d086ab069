use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use sb_db::{models::Report, repositories::report};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use super::service::{self, ReportedItem};
use crate::{
    ApiState,
    auth::{AdminUser, AuthUser},
    error::ApiError,
    extract::ValidJson,
    middleware::rate_limit,
    validation,
};

pub fn routes() -> Router<ApiState> {
    let filing = rate_limit::apply_report_rate_limit(
        Router::new().route("/reports/bug", post(report_bug)),
    );

    let moderation = Router::new()
        .route("/reports", get(list_reports))
        .route("/reports/{id}", delete(dismiss_report))
        .route("/reports/{id}/restore", post(restore_item))
        .route("/reports/{id}/reported-item", delete(delete_item));

    Router::new().merge(filing).merge(moderation)
}

#[derive(Debug, Deserialize, Validate)]
struct BugReportRequest {
    #[validate(length(max = 2000))]
    message: String,
}

async fn report_bug(
    State(state): State<ApiState>,
    user: AuthUser,
    ValidJson(body): ValidJson<BugReportRequest>,
) -> Result<(StatusCode, Json<Report>), ApiError> {
    let message = validation::require_bug_message(&body.message)?;
    let report = service::report_bug(&state.pool, &user, message).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

async fn list_reports(
    State(state): State<ApiState>,
    _admin: AdminUser,
) -> Result<Json<Vec<Report>>, ApiError> {
    Ok(Json(report::list(&state.pool).await?))
}

async fn dismiss_report(
    State(state): State<ApiState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    service::dismiss_bug_report(&state.pool, id).await?;
    tracing::debug!(admin_id = %admin.user_id, report_id = %id, "Report dismissed by admin");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
enum ItemRef {
    FlashCard(Uuid),
    ExamQuestion(Uuid),
}

impl From<ReportedItem> for ItemRef {
    fn from(item: ReportedItem) -> Self {
        match item {
            ReportedItem::FlashCard(id) => Self::FlashCard(id),
            ReportedItem::ExamQuestion(id) => Self::ExamQuestion(id),
        }
    }
}

async fn restore_item(
    State(state): State<ApiState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let item = service::restore_reported_item(&state.pool, id).await?;
    Ok(Json(json!({
        "message": "Item restored and report closed",
        "item": ItemRef::from(item),
    })))
}

async fn delete_item(
    State(state): State<ApiState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let item = service::delete_reported_item(&state, id).await?;
    Ok(Json(json!({
        "message": "Item deleted and report closed",
        "item": ItemRef::from(item),
    })))
}
