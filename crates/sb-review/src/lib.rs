//! Review engine for StudyBuddy
//!
//! This crate holds the pure logic behind flash-card review and practice exams:
//! sorting cards into review buckets, drawing unbiased random review sessions,
//! grading "select all that apply" exams and merging a graded attempt into the
//! best-of record kept per user. Nothing here performs I/O; randomness comes in
//! through [`RandomSource`] so every draw can be scripted in tests.

pub mod bucket;
pub mod error;
pub mod exam;
pub mod progress;
pub mod score;
pub mod select;
pub mod session;
pub mod shuffle;
pub mod streak;

pub use bucket::{
    BucketCounts, BucketFilter, BucketGroups, ReviewBucket, categorize, grade_percentage,
    group_by_bucket,
};
pub use error::ParseError;
pub use exam::{
    ExamAttempt, ExamOption, ExamType, OptionMark, Question, QuestionReview, grade_exam,
    is_correct, prepare_exam, review_exam,
};
pub use progress::{CardProgress, Difficulty, Reviewable};
pub use score::{ExamRecord, ExamResult, Score, merge_exam_result};
pub use select::select_for_review;
pub use session::{Effect, ExamSession, SessionEvent, SessionState, Transition};
pub use shuffle::{RandomSource, RngSource, sample, shuffle};
pub use streak::advance_streak;
