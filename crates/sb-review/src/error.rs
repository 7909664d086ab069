use thiserror::Error;

/// Errors raised when turning caller-supplied strings into engine enums.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Not a bucket name nor `all`.
    #[error("unknown review bucket: '{0}' (expected all, new, now, tomorrow or next_week)")]
    Bucket(String),
    /// Not one of the four review grades.
    #[error("unknown difficulty: '{0}' (expected again, hard, good or easy)")]
    Difficulty(String),
    /// Neither `lecture` nor `lab`.
    #[error("unknown exam type: '{0}' (expected lecture or lab)")]
    ExamType(String),
}
