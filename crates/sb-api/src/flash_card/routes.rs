use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use sb_db::{
    models::{FlashCard, FlashCardInput, FlashCardWithProgress, Report},
    repositories::{flash_card, progress},
};
use sb_review::{
    BucketCounts, BucketFilter, CardProgress, Difficulty, ReviewBucket, RngSource, Reviewable,
    grade_percentage, group_by_bucket, select_for_review,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    ApiState,
    auth::AuthUser,
    blob,
    error::ApiError,
    extract::ValidJson,
    metrics,
    profile::streak,
    report::service::{self as report_service, ReportedItem},
    validation,
};

pub const DEFAULT_REVIEW_COUNT: usize = 20;
pub const MAX_REVIEW_COUNT: usize = 200;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/flash-cards", get(list_cards).post(create_card))
        .route("/flash-cards/review-session", post(review_session))
        .route("/flash-cards/progress/reset", post(reset_progress))
        .route("/flash-cards/{id}", get(get_card).put(update_card))
        .route("/flash-cards/{id}/review", post(review_card))
        .route("/flash-cards/{id}/report", post(report_card))
}

/// A card with the requesting user's progress and the bucket it falls in.
#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    #[serde(flatten)]
    pub card: FlashCardWithProgress,
    pub bucket: ReviewBucket,
    pub percentage: f64,
}

impl From<FlashCardWithProgress> for CardView {
    fn from(card: FlashCardWithProgress) -> Self {
        Self {
            bucket: card.bucket(),
            percentage: grade_percentage(card.grade, card.attempts),
            card,
        }
    }
}

#[derive(Debug, Serialize)]
struct BucketView {
    bucket: ReviewBucket,
    label: &'static str,
    cards: Vec<CardView>,
}

#[derive(Debug, Serialize)]
struct CardListResponse {
    total: usize,
    counts: BucketCounts,
    buckets: Vec<BucketView>,
}

#[derive(Debug, Deserialize)]
struct TopicQuery {
    topic: Option<String>,
}

impl TopicQuery {
    fn topic(&self) -> Option<&str> {
        self.topic.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Every visible card, grouped into review buckets
async fn list_cards(
    State(state): State<ApiState>,
    user: AuthUser,
    Query(query): Query<TopicQuery>,
) -> Result<Json<CardListResponse>, ApiError> {
    let cards = flash_card::list_with_progress(&state.pool, user.user_id, query.topic()).await?;
    let groups = group_by_bucket(cards);

    Ok(Json(CardListResponse {
        total: groups.len(),
        counts: groups.counts(),
        buckets: groups
            .iter()
            .map(|(bucket, cards)| BucketView {
                bucket,
                label: bucket.label(),
                cards: cards.iter().cloned().map(CardView::from).collect(),
            })
            .collect(),
    }))
}

#[derive(Debug, Deserialize, Validate)]
struct CardRequest {
    #[validate(length(min = 1, max = 100))]
    topic: String,
    front_text: Option<String>,
    back_text: Option<String>,
    #[validate(length(max = 2048))]
    front_image: Option<String>,
    #[validate(length(max = 2048))]
    back_image: Option<String>,
}

impl From<CardRequest> for FlashCardInput {
    fn from(req: CardRequest) -> Self {
        Self {
            topic: req.topic,
            front_text: req.front_text,
            back_text: req.back_text,
            front_image: req.front_image,
            back_image: req.back_image,
        }
    }
}

async fn create_card(
    State(state): State<ApiState>,
    user: AuthUser,
    ValidJson(body): ValidJson<CardRequest>,
) -> Result<(StatusCode, Json<FlashCard>), ApiError> {
    let input = validation::normalize_card_input(body.into())?;
    let card = flash_card::insert(&state.pool, user.user_id, &input).await?;

    tracing::info!(card_id = %card.id, user_id = %user.user_id, topic = %card.topic, "Flash card created");
    Ok((StatusCode::CREATED, Json(card)))
}

/// Hidden cards are only shown to their creator and to admins
async fn get_card(
    State(state): State<ApiState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FlashCard>, ApiError> {
    let card = flash_card::get(&state.pool, id)
        .await?
        .filter(|card| {
            !card.is_hidden || card.user_id == user.user_id || state.auth.is_admin(user.user_id)
        })
        .ok_or_else(|| ApiError::NotFound("Flash card not found".to_string()))?;

    Ok(Json(card))
}

async fn update_card(
    State(state): State<ApiState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(body): ValidJson<CardRequest>,
) -> Result<Json<FlashCard>, ApiError> {
    let existing = flash_card::get(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Flash card not found".to_string()))?;

    if existing.user_id != user.user_id {
        return Err(ApiError::Forbidden(
            "Only the creator can edit this flash card".to_string(),
        ));
    }

    let input = validation::normalize_card_input(body.into())?;
    let card = flash_card::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| ApiError::NotFound("Flash card not found".to_string()))?;

    // Images replaced or removed by the edit are no longer referenced
    let kept = card.image_urls();
    let orphaned: Vec<String> = existing
        .image_urls()
        .into_iter()
        .filter(|url| !kept.contains(url))
        .collect();
    blob::delete_images_best_effort(state.blob.as_ref(), &orphaned).await;

    tracing::info!(card_id = %id, "Flash card updated");
    Ok(Json(card))
}

#[derive(Debug, Deserialize, Validate)]
struct ReviewSessionRequest {
    topic: Option<String>,
    #[serde(default)]
    bucket: BucketFilter,
    #[serde(default = "default_review_count")]
    #[validate(range(min = 1, max = 200))]
    count: usize,
}

const fn default_review_count() -> usize {
    DEFAULT_REVIEW_COUNT
}

/// Draw a random set of cards to review, from one bucket or from all of them
async fn review_session(
    State(state): State<ApiState>,
    user: AuthUser,
    ValidJson(body): ValidJson<ReviewSessionRequest>,
) -> Result<Json<Vec<CardView>>, ApiError> {
    let topic = body.topic.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let cards = flash_card::list_with_progress(&state.pool, user.user_id, topic).await?;

    let picked = select_for_review(
        &cards,
        body.bucket,
        body.count.min(MAX_REVIEW_COUNT),
        &mut RngSource::from_entropy(),
    );

    tracing::debug!(
        available = cards.len(),
        picked = picked.len(),
        bucket = %String::from(body.bucket),
        "Review session drawn"
    );
    Ok(Json(picked.into_iter().map(CardView::from).collect()))
}

#[derive(Debug, Deserialize, Validate)]
struct ReviewRequest {
    difficulty: Difficulty,
}

#[derive(Debug, Serialize)]
struct ReviewResponse {
    card_id: Uuid,
    grade: f64,
    attempts: i32,
    bucket: ReviewBucket,
    percentage: f64,
}

async fn review_card(
    State(state): State<ApiState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(body): ValidJson<ReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let mut tx = state.pool.begin().await?;

    match flash_card::get_hidden_state(&mut *tx, id).await? {
        Some(false) => {}
        _ => return Err(ApiError::NotFound("Flash card not found".to_string())),
    }

    progress::lock_card_progress(&mut *tx, user.user_id, id).await?;
    let current = progress::get_card_progress(&mut *tx, user.user_id, id)
        .await?
        .map_or_else(CardProgress::default, |row| {
            CardProgress::new(row.grade, row.attempts)
        });
    let updated = current.record(body.difficulty);

    progress::upsert_card_progress(&mut *tx, user.user_id, id, updated.grade, updated.attempts)
        .await?;
    tx.commit().await?;

    metrics::record_card_review(body.difficulty);
    streak::record_study_day_best_effort(&state.pool, user.user_id).await;

    Ok(Json(ReviewResponse {
        card_id: id,
        grade: updated.grade,
        attempts: updated.attempts,
        bucket: updated.bucket(),
        percentage: grade_percentage(updated.grade, updated.attempts),
    }))
}

async fn reset_progress(
    State(state): State<ApiState>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let reset = progress::reset_all_progress(&state.pool, user.user_id).await?;

    tracing::info!(user_id = %user.user_id, reset, "Flash card progress reset");
    Ok(Json(json!({ "reset": reset })))
}

#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct ContentReportRequest {
    #[serde(default)]
    pub message: Option<String>,
}

async fn report_card(
    State(state): State<ApiState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(body): ValidJson<ContentReportRequest>,
) -> Result<(StatusCode, Json<Report>), ApiError> {
    let message = validation::normalize_report_message(body.message)?;
    let report =
        report_service::report_item(&state.pool, &user, ReportedItem::FlashCard(id), message)
            .await?;
    Ok((StatusCode::CREATED, Json(report)))
}
