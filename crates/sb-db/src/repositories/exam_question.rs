use sb_review::ExamType;
use sqlx::{Executor, Postgres, types::Json};
use uuid::Uuid;

use crate::models::{ExamQuestion, ExamQuestionInput};

/// Questions an exam session may draw from: not hidden, not reported.
pub async fn list_visible<'e, E>(
    executor: E,
    exam_type: ExamType,
    exam_number: i32,
) -> Result<Vec<ExamQuestion>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, user_id, exam_type, exam_number, question, options,
                   is_hidden, created_at, updated_at
            FROM exam_questions
            WHERE exam_type = $1 AND exam_number = $2 AND is_hidden = FALSE
            ORDER BY created_at
        "#,
    )
    .bind(exam_type.as_str())
    .bind(exam_number)
    .fetch_all(executor)
    .await
}

/// Authoring view, hidden questions included. Filters are optional.
pub async fn list_all<'e, E>(
    executor: E,
    exam_type: Option<ExamType>,
    exam_number: Option<i32>,
) -> Result<Vec<ExamQuestion>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, user_id, exam_type, exam_number, question, options,
                   is_hidden, created_at, updated_at
            FROM exam_questions
            WHERE ($1::TEXT IS NULL OR exam_type = $1)
                AND ($2::INTEGER IS NULL OR exam_number = $2)
            ORDER BY exam_type, exam_number, created_at
        "#,
    )
    .bind(exam_type.map(ExamType::as_str))
    .bind(exam_number)
    .fetch_all(executor)
    .await
}

pub async fn insert<'e, E>(
    executor: E,
    user_id: Uuid,
    input: &ExamQuestionInput,
) -> Result<ExamQuestion, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO exam_questions (user_id, exam_type, exam_number, question, options)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, exam_type, exam_number, question, options,
                      is_hidden, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(input.exam_type.as_str())
    .bind(input.exam_number)
    .bind(input.question.trim())
    .bind(Json(&input.options))
    .fetch_one(executor)
    .await
}

pub async fn get_hidden_state<'e, E>(
    executor: E,
    question_id: Uuid,
) -> Result<Option<bool>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT is_hidden FROM exam_questions WHERE id = $1 FOR UPDATE
        "#,
    )
    .bind(question_id)
    .fetch_optional(executor)
    .await
}

pub async fn set_hidden<'e, E>(
    executor: E,
    question_id: Uuid,
    hidden: bool,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE exam_questions
            SET is_hidden = $2, updated_at = NOW()
            WHERE id = $1
        "#,
    )
    .bind(question_id)
    .bind(hidden)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete<'e, E>(executor: E, question_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM exam_questions WHERE id = $1
        "#,
    )
    .bind(question_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
