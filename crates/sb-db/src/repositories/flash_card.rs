use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{FlashCard, FlashCardInput, FlashCardWithProgress};

/// Visible cards with the user's progress, optionally restricted to one topic.
pub async fn list_with_progress<'e, E>(
    executor: E,
    user_id: Uuid,
    topic: Option<&str>,
) -> Result<Vec<FlashCardWithProgress>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                f.id,
                f.user_id,
                f.topic,
                f.front_text,
                f.back_text,
                f.front_image,
                f.back_image,
                COALESCE(p.grade, 0) AS grade,
                COALESCE(p.attempts, 0) AS attempts
            FROM flash_cards f
            LEFT JOIN user_flash_card_progress p
                ON p.card_id = f.id AND p.user_id = $1
            WHERE f.is_hidden = FALSE
                AND ($2::TEXT IS NULL OR f.topic = $2)
            ORDER BY f.created_at
        "#,
    )
    .bind(user_id)
    .bind(topic)
    .fetch_all(executor)
    .await
}

pub async fn get<'e, E>(executor: E, card_id: Uuid) -> Result<Option<FlashCard>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, user_id, topic, front_text, back_text, front_image, back_image,
                   is_hidden, created_at, updated_at
            FROM flash_cards
            WHERE id = $1
        "#,
    )
    .bind(card_id)
    .fetch_optional(executor)
    .await
}

pub async fn insert<'e, E>(
    executor: E,
    user_id: Uuid,
    input: &FlashCardInput,
) -> Result<FlashCard, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO flash_cards (user_id, topic, front_text, back_text, front_image, back_image)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, topic, front_text, back_text, front_image, back_image,
                      is_hidden, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(&input.topic)
    .bind(&input.front_text)
    .bind(&input.back_text)
    .bind(&input.front_image)
    .bind(&input.back_image)
    .fetch_one(executor)
    .await
}

/// Overwrite the editable fields. Returns `None` when the card does not exist.
pub async fn update<'e, E>(
    executor: E,
    card_id: Uuid,
    input: &FlashCardInput,
) -> Result<Option<FlashCard>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE flash_cards
            SET topic = $2,
                front_text = $3,
                back_text = $4,
                front_image = $5,
                back_image = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, topic, front_text, back_text, front_image, back_image,
                      is_hidden, created_at, updated_at
        "#,
    )
    .bind(card_id)
    .bind(&input.topic)
    .bind(&input.front_text)
    .bind(&input.back_text)
    .bind(&input.front_image)
    .bind(&input.back_image)
    .fetch_optional(executor)
    .await
}

/// `Some(is_hidden)` for an existing card, `None` otherwise. Locks the row
/// until the surrounding transaction ends.
pub async fn get_hidden_state<'e, E>(executor: E, card_id: Uuid) -> Result<Option<bool>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT is_hidden FROM flash_cards WHERE id = $1 FOR UPDATE
        "#,
    )
    .bind(card_id)
    .fetch_optional(executor)
    .await
}

pub async fn set_hidden<'e, E>(executor: E, card_id: Uuid, hidden: bool) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE flash_cards
            SET is_hidden = $2, updated_at = NOW()
            WHERE id = $1
        "#,
    )
    .bind(card_id)
    .bind(hidden)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete<'e, E>(executor: E, card_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM flash_cards WHERE id = $1
        "#,
    )
    .bind(card_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
