use chrono::{DateTime, NaiveDate, Utc};
use sb_review::{ExamOption, ExamRecord, ExamType, Question, Reviewable};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

/// Flash card as stored, without any user's progress.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FlashCard {
    pub id: Uuid,
    /// Creator of the card
    pub user_id: Uuid,
    pub topic: String,
    pub front_text: Option<String>,
    pub back_text: Option<String>,
    /// Public URL of the front image in the blob store
    pub front_image: Option<String>,
    pub back_image: Option<String>,
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FlashCard {
    /// Blob URLs referenced by this card.
    pub fn image_urls(&self) -> Vec<String> {
        [&self.front_image, &self.back_image]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

/// Fields a user supplies when creating or editing a card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashCardInput {
    pub topic: String,
    pub front_text: Option<String>,
    pub back_text: Option<String>,
    pub front_image: Option<String>,
    pub back_image: Option<String>,
}

/// Visible card joined with the requesting user's progress.
/// Cards never reviewed come back with `grade = 0` and `attempts = 0`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FlashCardWithProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub topic: String,
    pub front_text: Option<String>,
    pub back_text: Option<String>,
    pub front_image: Option<String>,
    pub back_image: Option<String>,
    pub grade: f64,
    pub attempts: i32,
}

impl Reviewable for FlashCardWithProgress {
    fn grade(&self) -> f64 {
        self.grade
    }

    fn attempts(&self) -> i32 {
        self.attempts
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, FromRow)]
pub struct CardProgressRow {
    pub grade: f64,
    pub attempts: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExamQuestion {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exam_type: String,
    pub exam_number: i32,
    pub question: String,
    pub options: Json<Vec<ExamOption>>,
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ExamQuestion> for Question {
    fn from(row: ExamQuestion) -> Self {
        Self {
            id: row.id,
            text: row.question,
            options: row.options.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamQuestionInput {
    pub exam_type: ExamType,
    pub exam_number: i32,
    pub question: String,
    pub options: Vec<ExamOption>,
}

/// Stored best-of record for one user and exam.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExamScoreRow {
    pub user_id: Uuid,
    pub exam_type: String,
    pub exam_number: i32,
    pub score: i32,
    pub total_questions: i32,
    pub time_elapsed_ms: i64,
    pub tries: i32,
    pub last_attempt_id: Uuid,
    pub updated_at: DateTime<Utc>,
}

impl From<&ExamScoreRow> for ExamRecord {
    fn from(row: &ExamScoreRow) -> Self {
        Self {
            score: row.score,
            total_questions: row.total_questions,
            time_elapsed_ms: row.time_elapsed_ms,
            tries: row.tries,
            last_attempt_id: row.last_attempt_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    FlashCard,
    ExamQuestion,
    Bug,
}

impl ReportType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FlashCard => "flash_card",
            Self::ExamQuestion => "exam_question",
            Self::Bug => "bug",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub reporter_user_id: Uuid,
    pub reporter_name: String,
    pub report_type: String,
    /// Card or question id; `None` for bug reports
    pub reported_item_id: Option<Uuid>,
    pub report_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Report {
    pub fn is_type(&self, report_type: ReportType) -> bool {
        self.report_type == report_type.as_str()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReport {
    pub reporter_user_id: Uuid,
    pub reporter_name: String,
    pub report_type: ReportType,
    pub reported_item_id: Option<Uuid>,
    pub report_message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, FromRow)]
pub struct StudyState {
    pub last_study_date: Option<NaiveDate>,
    pub study_streak: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub last_study_date: Option<NaiveDate>,
    pub study_streak: i32,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_urls() {
        let now = Utc::now();
        let card = FlashCard {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            topic: "lecture".to_string(),
            front_text: Some("front".to_string()),
            back_text: None,
            front_image: None,
            back_image: Some("https://blob.example/back.png".to_string()),
            is_hidden: false,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(card.image_urls(), vec!["https://blob.example/back.png"]);
    }

    #[test]
    fn test_question_conversion_keeps_option_order() {
        let now = Utc::now();
        let row = ExamQuestion {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            exam_type: "lab".to_string(),
            exam_number: 2,
            question: "Pick the primes".to_string(),
            options: Json(vec![
                ExamOption {
                    text: "2".to_string(),
                    correct: true,
                },
                ExamOption {
                    text: "4".to_string(),
                    correct: false,
                },
            ]),
            is_hidden: false,
            created_at: now,
            updated_at: now,
        };

        let question = Question::from(row);
        assert_eq!(question.text, "Pick the primes");
        assert_eq!(question.options[0].text, "2");
        assert_eq!(question.correct_indices().into_iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_report_type_names() {
        assert_eq!(ReportType::FlashCard.as_str(), "flash_card");
        assert_eq!(
            serde_json::to_string(&ReportType::ExamQuestion).unwrap(),
            "\"exam_question\""
        );
    }
}
