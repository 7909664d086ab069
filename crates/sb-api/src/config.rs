use std::{collections::HashSet, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// Minimum length accepted for the JWT signing secret.
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters")]
    WeakJwtSecret,
    #[error("EXAM_QUESTION_COUNT and EXAM_DURATION_SECS must be greater than zero")]
    InvalidExamSettings,
}

/// Service configuration, read from environment variables (a `.env` file is
/// loaded first by the binary).
#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    pub database_url: String,
    pub jwt_secret: String,
    #[serde(rename = "app_env", default)]
    pub env: Environment,
    /// Comma separated list of origins allowed by CORS
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,
    /// Comma separated list of user ids allowed to moderate reports
    #[serde(default)]
    pub admin_user_ids: String,
    #[serde(default = "default_exam_question_count")]
    pub exam_question_count: usize,
    #[serde(default = "default_exam_duration_secs")]
    pub exam_duration_secs: u64,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    pub blob_api_url: Option<String>,
    pub blob_read_write_token: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_allowed_origins() -> String {
    "http://localhost:3000".to_string()
}

const fn default_exam_question_count() -> usize {
    30
}

// One hour and one second, so a full hour shows on the countdown
const fn default_exam_duration_secs() -> u64 {
    3601
}

const fn default_db_max_connections() -> u32 {
    10
}

const fn default_port() -> u16 {
    8080
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::WeakJwtSecret);
        }
        if self.exam_question_count == 0 || self.exam_duration_secs == 0 {
            return Err(ConfigError::InvalidExamSettings);
        }
        Ok(())
    }

    pub fn parsed_allowed_origins(&self) -> Vec<String> {
        split_list(&self.allowed_origins)
            .map(str::to_string)
            .collect()
    }

    /// Admin ids; entries that are not UUIDs are skipped with a warning.
    pub fn parsed_admin_ids(&self) -> HashSet<Uuid> {
        split_list(&self.admin_user_ids)
            .filter_map(|raw| match Uuid::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    tracing::warn!(value = raw, "Ignoring invalid id in ADMIN_USER_IDS");
                    None
                }
            })
            .collect()
    }

    pub const fn exam_duration(&self) -> Duration {
        Duration::from_secs(self.exam_duration_secs)
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}
