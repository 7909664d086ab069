//! HTTP API for StudyBuddy: flash-card review, timed practice exams, content
//! reports and study streaks, backed by Postgres.

pub mod auth;
pub mod blob;
pub mod config;
pub mod error;
pub mod exam;
pub mod exam_question;
pub mod extract;
pub mod flash_card;
pub mod jobs;
pub mod metrics;
pub mod middleware;
pub mod profile;
pub mod report;
pub mod router;
pub mod state;
pub mod tracing;
pub mod validation;

pub use config::ApiConfig;
pub use state::{ApiState, AuthConfig, ExamSettings};
