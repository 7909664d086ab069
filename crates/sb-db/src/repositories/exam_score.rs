use sb_review::{ExamRecord, ExamType};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::ExamScoreRow;

/// Serialize read-merge-write cycles on one record, including the very first
/// one when no row exists yet for `FOR UPDATE` to lock. Held until the
/// surrounding transaction ends; call it before [`get_exam_score`].
pub async fn lock_exam_score<'e, E>(
    executor: E,
    user_id: Uuid,
    exam_type: ExamType,
    exam_number: i32,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            SELECT pg_advisory_xact_lock(hashtextextended('exam_scores:' || $1::text || ':' || $2::text || ':' || $3::text, 0))
        "#,
    )
    .bind(user_id)
    .bind(exam_type.as_str())
    .bind(exam_number)
    .execute(executor)
    .await?;
    Ok(())
}

/// Locks the row until the surrounding transaction ends.
pub async fn get_exam_score<'e, E>(
    executor: E,
    user_id: Uuid,
    exam_type: ExamType,
    exam_number: i32,
) -> Result<Option<ExamScoreRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT user_id, exam_type, exam_number, score, total_questions,
                   time_elapsed_ms, tries, last_attempt_id, updated_at
            FROM exam_scores
            WHERE user_id = $1 AND exam_type = $2 AND exam_number = $3
            FOR UPDATE
        "#,
    )
    .bind(user_id)
    .bind(exam_type.as_str())
    .bind(exam_number)
    .fetch_optional(executor)
    .await
}

/// Store the merged record, replacing any previous one for the same exam.
pub async fn upsert_exam_score<'e, E>(
    executor: E,
    user_id: Uuid,
    exam_type: ExamType,
    exam_number: i32,
    record: &ExamRecord,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO exam_scores
                (user_id, exam_type, exam_number, score, total_questions, time_elapsed_ms, tries, last_attempt_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id, exam_type, exam_number)
            DO UPDATE SET
                score = $4,
                total_questions = $5,
                time_elapsed_ms = $6,
                tries = $7,
                last_attempt_id = $8,
                updated_at = NOW()
        "#,
    )
    .bind(user_id)
    .bind(exam_type.as_str())
    .bind(exam_number)
    .bind(record.score)
    .bind(record.total_questions)
    .bind(record.time_elapsed_ms)
    .bind(record.tries)
    .bind(record.last_attempt_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn list_for_user<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<ExamScoreRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT user_id, exam_type, exam_number, score, total_questions,
                   time_elapsed_ms, tries, last_attempt_id, updated_at
            FROM exam_scores
            WHERE user_id = $1
            ORDER BY exam_type, exam_number
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}
