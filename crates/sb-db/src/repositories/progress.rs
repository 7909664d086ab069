use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::CardProgressRow;

/// Serialize reviews of one card by one user, including the first one when
/// there is no progress row to lock yet. Held until the surrounding
/// transaction ends; call it before [`get_card_progress`].
pub async fn lock_card_progress<'e, E>(
    executor: E,
    user_id: Uuid,
    card_id: Uuid,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            SELECT pg_advisory_xact_lock(hashtextextended('card_progress:' || $1::text || ':' || $2::text, 0))
        "#,
    )
    .bind(user_id)
    .bind(card_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Locks the row until the surrounding transaction ends.
pub async fn get_card_progress<'e, E>(
    executor: E,
    user_id: Uuid,
    card_id: Uuid,
) -> Result<Option<CardProgressRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT grade, attempts
            FROM user_flash_card_progress
            WHERE user_id = $1 AND card_id = $2
            FOR UPDATE
        "#,
    )
    .bind(user_id)
    .bind(card_id)
    .fetch_optional(executor)
    .await
}

pub async fn upsert_card_progress<'e, E>(
    executor: E,
    user_id: Uuid,
    card_id: Uuid,
    grade: f64,
    attempts: i32,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO user_flash_card_progress (user_id, card_id, grade, attempts)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, card_id)
            DO UPDATE SET
                grade = $3,
                attempts = $4,
                updated_at = NOW()
        "#,
    )
    .bind(user_id)
    .bind(card_id)
    .bind(grade)
    .bind(attempts)
    .execute(executor)
    .await?;
    Ok(())
}

/// Put every card of the user back into the new bucket. Returns the number of rows reset.
pub async fn reset_all_progress<'e, E>(executor: E, user_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE user_flash_card_progress
            SET grade = 0, attempts = 0, updated_at = NOW()
            WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
