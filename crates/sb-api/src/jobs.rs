//! Periodic maintenance tasks.

use std::time::Duration;

use tokio::{task::JoinHandle, time::interval};

use crate::state::ApiState;

/// How often finished exam sessions are swept from memory
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// How long a graded session stays readable after grading
pub const SESSION_RETENTION: Duration = Duration::from_secs(3600);

pub fn start_background_jobs(state: ApiState) -> Vec<JoinHandle<()>> {
    vec![tokio::spawn(periodic_session_sweep(state))]
}

async fn periodic_session_sweep(state: ApiState) {
    let mut interval = interval(SESSION_SWEEP_INTERVAL);
    // The first tick fires immediately and there is nothing to sweep yet
    interval.tick().await;

    loop {
        interval.tick().await;

        let removed = state
            .sessions
            .prune(SESSION_RETENTION, state.exam.duration);
        if removed > 0 {
            tracing::info!(
                removed,
                remaining = state.sessions.len(),
                "Swept finished exam sessions"
            );
        } else {
            tracing::debug!("No exam sessions to sweep");
        }
    }
}
