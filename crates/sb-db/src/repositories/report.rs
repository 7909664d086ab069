use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{NewReport, Report};

pub async fn insert<'e, E>(executor: E, report: &NewReport) -> Result<Report, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO reports (reporter_user_id, reporter_name, report_type, reported_item_id, report_message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, reporter_user_id, reporter_name, report_type, reported_item_id,
                      report_message, created_at
        "#,
    )
    .bind(report.reporter_user_id)
    .bind(&report.reporter_name)
    .bind(report.report_type.as_str())
    .bind(report.reported_item_id)
    .bind(&report.report_message)
    .fetch_one(executor)
    .await
}

/// Newest first.
pub async fn list<'e, E>(executor: E) -> Result<Vec<Report>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, reporter_user_id, reporter_name, report_type, reported_item_id,
                   report_message, created_at
            FROM reports
            ORDER BY created_at DESC
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn get<'e, E>(executor: E, report_id: Uuid) -> Result<Option<Report>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, reporter_user_id, reporter_name, report_type, reported_item_id,
                   report_message, created_at
            FROM reports
            WHERE id = $1
        "#,
    )
    .bind(report_id)
    .fetch_optional(executor)
    .await
}

pub async fn delete<'e, E>(executor: E, report_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM reports WHERE id = $1
        "#,
    )
    .bind(report_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
