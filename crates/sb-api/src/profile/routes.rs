use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, NaiveDate, Utc};
use sb_db::repositories::profile;
use serde::Serialize;
use uuid::Uuid;

use crate::{ApiState, auth::AuthUser, error::ApiError};

pub fn routes() -> Router<ApiState> {
    Router::new().route("/profile", get(get_profile))
}

#[derive(Debug, Serialize)]
struct ProfileResponse {
    id: Uuid,
    name: String,
    email: Option<String>,
    is_admin: bool,
    study_streak: i32,
    last_study_date: Option<NaiveDate>,
    updated_at: DateTime<Utc>,
}

async fn get_profile(
    State(state): State<ApiState>,
    user: AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = profile::ensure_profile(&state.pool, user.user_id).await?;

    Ok(Json(ProfileResponse {
        id: profile.id,
        name: user.display_name(),
        is_admin: state.auth.is_admin(user.user_id),
        email: user.email,
        study_streak: profile.study_streak,
        last_study_date: profile.last_study_date,
        updated_at: profile.updated_at,
    }))
}
