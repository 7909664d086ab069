//! Domain checks on user supplied content, run after the request body has
//! been deserialized.

use sb_db::models::{ExamQuestionInput, FlashCardInput};
use sb_review::exam::{MAX_OPTIONS, MIN_OPTIONS};
use validator::ValidateUrl;

use crate::error::ApiError;

pub const MAX_TOPIC_LEN: usize = 100;
pub const MAX_TEXT_LEN: usize = 2000;
pub const MAX_REPORT_MESSAGE_LEN: usize = 2000;

/// Trim `value`, treating blank as absent.
fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_len(field: &str, value: Option<&str>, max: usize) -> Result<(), ApiError> {
    match value {
        Some(v) if v.chars().count() > max => Err(ApiError::Validation(format!(
            "{field} must be at most {max} characters"
        ))),
        _ => Ok(()),
    }
}

fn check_image_url(field: &str, value: Option<&str>) -> Result<(), ApiError> {
    match value {
        Some(url) if !(url.validate_url() && url.starts_with("https://")) => Err(
            ApiError::Validation(format!("{field} must be an https URL")),
        ),
        _ => Ok(()),
    }
}

/// Trim and check a card before it is stored. The topic is required; blank
/// texts and images are stored as absent.
pub fn normalize_card_input(input: FlashCardInput) -> Result<FlashCardInput, ApiError> {
    let topic = input.topic.trim().to_string();
    if topic.is_empty() {
        return Err(ApiError::Validation("Topic is required".to_string()));
    }
    check_len("Topic", Some(&topic), MAX_TOPIC_LEN)?;

    let card = FlashCardInput {
        topic,
        front_text: trimmed(input.front_text),
        back_text: trimmed(input.back_text),
        front_image: trimmed(input.front_image),
        back_image: trimmed(input.back_image),
    };

    check_len("Front text", card.front_text.as_deref(), MAX_TEXT_LEN)?;
    check_len("Back text", card.back_text.as_deref(), MAX_TEXT_LEN)?;
    check_image_url("Front image", card.front_image.as_deref())?;
    check_image_url("Back image", card.back_image.as_deref())?;

    if card.front_text.is_none() && card.front_image.is_none() {
        return Err(ApiError::Validation(
            "The front of a card needs text or an image".to_string(),
        ));
    }

    Ok(card)
}

/// Trim and check an exam question: valid exam number for its type, non-empty
/// text, 2 to 5 non-empty options and at least one correct option.
pub fn normalize_exam_question(
    mut input: ExamQuestionInput,
) -> Result<ExamQuestionInput, ApiError> {
    if !input.exam_type.accepts(input.exam_number) {
        return Err(ApiError::Validation(format!(
            "{} exams are numbered 1 to {}",
            input.exam_type,
            input.exam_type.max_exam_number()
        )));
    }

    input.question = input.question.trim().to_string();
    if input.question.is_empty() {
        return Err(ApiError::Validation("Question text is required".to_string()));
    }
    check_len("Question", Some(&input.question), MAX_TEXT_LEN)?;

    if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&input.options.len()) {
        return Err(ApiError::Validation(format!(
            "A question needs between {MIN_OPTIONS} and {MAX_OPTIONS} options"
        )));
    }

    for option in &mut input.options {
        option.text = option.text.trim().to_string();
        if option.text.is_empty() {
            return Err(ApiError::Validation("Options cannot be empty".to_string()));
        }
        check_len("Option", Some(&option.text), MAX_TEXT_LEN)?;
    }

    if !input.options.iter().any(|o| o.correct) {
        return Err(ApiError::Validation(
            "At least one option must be marked as correct".to_string(),
        ));
    }

    Ok(input)
}

/// Optional note attached to a content report.
pub fn normalize_report_message(message: Option<String>) -> Result<Option<String>, ApiError> {
    let message = trimmed(message);
    check_len("Message", message.as_deref(), MAX_REPORT_MESSAGE_LEN)?;
    Ok(message)
}

/// Bug reports must describe the bug.
pub fn require_bug_message(message: &str) -> Result<String, ApiError> {
    normalize_report_message(Some(message.to_string()))?
        .ok_or_else(|| ApiError::Validation("Bug description is required".to_string()))
}
