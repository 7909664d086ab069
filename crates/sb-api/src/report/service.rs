//! Filing and moderating reports.
//!
//! Reporting a card or question hides it immediately. An admin then either
//! restores the item or deletes it; both close the report.

use sb_db::{
    models::{NewReport, Report, ReportType},
    repositories::{exam_question, flash_card, report},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{auth::AuthUser, blob, error::ApiError, metrics, state::ApiState};

/// Kinds of content that can be hidden by a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportedItem {
    FlashCard(Uuid),
    ExamQuestion(Uuid),
}

impl ReportedItem {
    pub const fn report_type(self) -> ReportType {
        match self {
            Self::FlashCard(_) => ReportType::FlashCard,
            Self::ExamQuestion(_) => ReportType::ExamQuestion,
        }
    }

    pub const fn id(self) -> Uuid {
        match self {
            Self::FlashCard(id) | Self::ExamQuestion(id) => id,
        }
    }

    const fn noun(self) -> &'static str {
        match self {
            Self::FlashCard(_) => "Flash card",
            Self::ExamQuestion(_) => "Exam question",
        }
    }

    /// The item a stored report points at. Bug reports have none.
    pub fn of_report(report: &Report) -> Result<Self, ApiError> {
        let id = report.reported_item_id;
        match (report.report_type.as_str(), id) {
            (t, Some(id)) if t == ReportType::FlashCard.as_str() => Ok(Self::FlashCard(id)),
            (t, Some(id)) if t == ReportType::ExamQuestion.as_str() => Ok(Self::ExamQuestion(id)),
            (t, _) if t == ReportType::Bug.as_str() => Err(ApiError::Validation(
                "Bug reports have no reported item".to_string(),
            )),
            _ => Err(ApiError::Internal(format!(
                "report {} has type {} and item {:?}",
                report.id, report.report_type, id
            ))),
        }
    }
}

/// Report an item and hide it in one transaction.
pub async fn report_item(
    pool: &PgPool,
    reporter: &AuthUser,
    item: ReportedItem,
    message: Option<String>,
) -> Result<Report, ApiError> {
    let mut tx = pool.begin().await?;

    let hidden = match item {
        ReportedItem::FlashCard(id) => flash_card::get_hidden_state(&mut *tx, id).await?,
        ReportedItem::ExamQuestion(id) => exam_question::get_hidden_state(&mut *tx, id).await?,
    };
    match hidden {
        None => return Err(ApiError::NotFound(format!("{} not found", item.noun()))),
        Some(true) => {
            return Err(ApiError::Validation(format!(
                "{} is already hidden",
                item.noun()
            )));
        }
        Some(false) => {}
    }

    let report = report::insert(
        &mut *tx,
        &NewReport {
            reporter_user_id: reporter.user_id,
            reporter_name: reporter.display_name(),
            report_type: item.report_type(),
            reported_item_id: Some(item.id()),
            report_message: message,
        },
    )
    .await?;

    set_item_hidden(&mut tx, item, true).await?;
    tx.commit().await?;

    metrics::record_report(item.report_type().as_str());
    tracing::info!(
        report_id = %report.id,
        item_id = %item.id(),
        report_type = item.report_type().as_str(),
        "Content reported and hidden"
    );

    Ok(report)
}

pub async fn report_bug(pool: &PgPool, reporter: &AuthUser, message: String) -> Result<Report, ApiError> {
    let report = report::insert(
        pool,
        &NewReport {
            reporter_user_id: reporter.user_id,
            reporter_name: reporter.display_name(),
            report_type: ReportType::Bug,
            reported_item_id: None,
            report_message: Some(message),
        },
    )
    .await?;

    metrics::record_report(ReportType::Bug.as_str());
    tracing::info!(report_id = %report.id, "Bug reported");

    Ok(report)
}

async fn set_item_hidden(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    item: ReportedItem,
    hidden: bool,
) -> Result<bool, sqlx::Error> {
    match item {
        ReportedItem::FlashCard(id) => flash_card::set_hidden(&mut **tx, id, hidden).await,
        ReportedItem::ExamQuestion(id) => exam_question::set_hidden(&mut **tx, id, hidden).await,
    }
}

async fn find_report(pool: &PgPool, report_id: Uuid) -> Result<Report, ApiError> {
    report::get(pool, report_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Report not found".to_string()))
}

/// Delete a bug report. Content reports are closed through restore or delete.
pub async fn dismiss_bug_report(pool: &PgPool, report_id: Uuid) -> Result<(), ApiError> {
    let found = find_report(pool, report_id).await?;
    if !found.is_type(ReportType::Bug) {
        return Err(ApiError::Validation(
            "Only bug reports can be deleted directly, restore or delete the reported item instead"
                .to_string(),
        ));
    }

    report::delete(pool, report_id).await?;
    tracing::info!(report_id = %report_id, "Bug report dismissed");
    Ok(())
}

/// Unhide the reported item and close the report.
pub async fn restore_reported_item(pool: &PgPool, report_id: Uuid) -> Result<ReportedItem, ApiError> {
    let found = find_report(pool, report_id).await?;
    let item = ReportedItem::of_report(&found)?;

    let mut tx = pool.begin().await?;
    if !set_item_hidden(&mut tx, item, false).await? {
        return Err(ApiError::NotFound(format!("{} no longer exists", item.noun())));
    }
    report::delete(&mut *tx, report_id).await?;
    tx.commit().await?;

    tracing::info!(report_id = %report_id, item_id = %item.id(), "Reported item restored");
    Ok(item)
}

/// Delete the reported item and close the report. Card images are removed
/// from the blob store afterwards, best effort.
pub async fn delete_reported_item(state: &ApiState, report_id: Uuid) -> Result<ReportedItem, ApiError> {
    let found = find_report(&state.pool, report_id).await?;
    let item = ReportedItem::of_report(&found)?;

    let mut tx = state.pool.begin().await?;
    let image_urls = match item {
        ReportedItem::FlashCard(id) => {
            let card = flash_card::get(&mut *tx, id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Flash card no longer exists".to_string()))?;
            flash_card::delete(&mut *tx, id).await?;
            card.image_urls()
        }
        ReportedItem::ExamQuestion(id) => {
            if !exam_question::delete(&mut *tx, id).await? {
                return Err(ApiError::NotFound("Exam question no longer exists".to_string()));
            }
            Vec::new()
        }
    };
    report::delete(&mut *tx, report_id).await?;
    tx.commit().await?;

    tracing::info!(report_id = %report_id, item_id = %item.id(), "Reported item deleted");
    blob::delete_images_best_effort(state.blob.as_ref(), &image_urls).await;

    Ok(item)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn stored(report_type: ReportType, item: Option<Uuid>) -> Report {
        Report {
            id: Uuid::new_v4(),
            reporter_user_id: Uuid::new_v4(),
            reporter_name: "Ada".to_string(),
            report_type: report_type.as_str().to_string(),
            reported_item_id: item,
            report_message: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_item_of_report() {
        let id = Uuid::new_v4();
        assert_eq!(
            ReportedItem::of_report(&stored(ReportType::FlashCard, Some(id))).unwrap(),
            ReportedItem::FlashCard(id)
        );
        assert_eq!(
            ReportedItem::of_report(&stored(ReportType::ExamQuestion, Some(id))).unwrap(),
            ReportedItem::ExamQuestion(id)
        );
    }

    #[test]
    fn test_bug_report_has_no_item() {
        let err = ReportedItem::of_report(&stored(ReportType::Bug, None)).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = ReportedItem::of_report(&stored(ReportType::FlashCard, None)).unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
