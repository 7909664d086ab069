use std::{collections::HashSet, sync::Arc, time::Duration};

use axum::extract::FromRef;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    ApiConfig, blob::BlobClient, config::Environment, exam::session::SessionRegistry,
};

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub admin_ids: Arc<HashSet<Uuid>>,
}

impl AuthConfig {
    pub fn is_admin(&self, user_id: Uuid) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

/// How exam sessions are built and timed.
#[derive(Clone, Copy, Debug)]
pub struct ExamSettings {
    pub question_count: usize,
    pub duration: Duration,
}

#[derive(Clone, Debug)]
pub struct ApiState {
    pub pool: PgPool,
    pub auth: AuthConfig,
    pub exam: ExamSettings,
    pub sessions: SessionRegistry,
    pub blob: Option<BlobClient>,
    pub environment: Environment,
}

impl ApiState {
    pub fn new(config: &ApiConfig, pool: PgPool) -> anyhow::Result<Self> {
        let blob = BlobClient::from_config(config)?;
        if blob.is_none() {
            tracing::warn!("Blob store not configured, card images will not be deleted");
        }

        let admin_ids = config.parsed_admin_ids();
        if admin_ids.is_empty() {
            tracing::warn!("No ADMIN_USER_IDS configured, moderation routes are unreachable");
        }

        Ok(Self {
            pool,
            auth: AuthConfig {
                jwt_secret: config.jwt_secret.clone(),
                admin_ids: Arc::new(admin_ids),
            },
            exam: ExamSettings {
                question_count: config.exam_question_count,
                duration: config.exam_duration(),
            },
            sessions: SessionRegistry::default(),
            blob,
            environment: config.env,
        })
    }
}

impl FromRef<ApiState> for AuthConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.auth.clone()
    }
}
