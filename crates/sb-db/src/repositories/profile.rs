use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{StudyState, UserProfile};

pub async fn get_study_state<'e, E>(
    executor: E,
    user_id: Uuid,
) -> Result<Option<StudyState>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT last_study_date, study_streak
            FROM user_profiles
            WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Fetch the profile, creating an empty one on first access.
pub async fn ensure_profile<'e, E>(executor: E, user_id: Uuid) -> Result<UserProfile, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO user_profiles (id)
            VALUES ($1)
            ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id
            RETURNING id, last_study_date, study_streak, updated_at
        "#,
    )
    .bind(user_id)
    .fetch_one(executor)
    .await
}

pub async fn update_study_state<'e, E>(
    executor: E,
    user_id: Uuid,
    last_study_date: NaiveDate,
    study_streak: i32,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO user_profiles (id, last_study_date, study_streak)
            VALUES ($1, $2, $3)
            ON CONFLICT (id)
            DO UPDATE SET
                last_study_date = $2,
                study_streak = $3,
                updated_at = NOW()
        "#,
    )
    .bind(user_id)
    .bind(last_study_date)
    .bind(study_streak)
    .execute(executor)
    .await?;
    Ok(())
}
