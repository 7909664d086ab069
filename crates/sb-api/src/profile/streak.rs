use chrono::{NaiveDate, Utc};
use sb_db::repositories::profile;
use sb_review::advance_streak;
use sqlx::PgPool;
use uuid::Uuid;

/// Count `today` as a study day for the user. Returns the new streak, or
/// `None` when today was already counted.
pub async fn record_study_day(
    pool: &PgPool,
    user_id: Uuid,
    today: NaiveDate,
) -> Result<Option<i32>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let (last_study_date, current) = profile::get_study_state(&mut *tx, user_id)
        .await?
        .map_or((None, 0), |state| (state.last_study_date, state.study_streak));

    let Some(streak) = advance_streak(last_study_date, current, today) else {
        return Ok(None);
    };

    profile::update_study_state(&mut *tx, user_id, today, streak).await?;
    tx.commit().await?;

    Ok(Some(streak))
}

/// Streak bookkeeping never fails the request that triggered it.
pub async fn record_study_day_best_effort(pool: &PgPool, user_id: Uuid) {
    match record_study_day(pool, user_id, Utc::now().date_naive()).await {
        Ok(Some(streak)) => tracing::debug!(user_id = %user_id, streak, "Study streak advanced"),
        Ok(None) => {}
        Err(e) => tracing::error!(user_id = %user_id, error = %e, "Failed to update study streak"),
    }
}
