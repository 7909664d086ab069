use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use crate::{
    exam, exam_question, flash_card, middleware::rate_limit, profile, report, state::ApiState,
};

pub fn router() -> Router<ApiState> {
    let api = Router::new()
        .merge(flash_card::routes())
        .merge(exam_question::routes())
        .merge(exam::routes())
        .merge(report::routes())
        .merge(profile::routes());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .merge(rate_limit::apply_general_rate_limit(api))
        .fallback(handler_404)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// Readiness: the database answers
async fn ready(State(state): State<ApiState>) -> StatusCode {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "The requested resource was not found" })),
    )
}
