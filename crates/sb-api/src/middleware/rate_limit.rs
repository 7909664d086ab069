use std::time::Duration;

use axum::Router;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

/// Whole API: one request every 100ms per client IP (10/s), bursts of 20
pub const GENERAL_REPLENISH: Duration = Duration::from_millis(100);
pub const GENERAL_BURST_SIZE: u32 = 20;

/// Bug reports: one every 2s per client IP, bursts of 5
pub const REPORT_REPLENISH: Duration = Duration::from_secs(2);
pub const REPORT_BURST_SIZE: u32 = 5;

/// Rate limit every route of `router` per client IP.
///
/// The client IP comes from `X-Forwarded-For`/`X-Real-IP` when present and
/// from the socket address otherwise, so the server must be started with
/// `into_make_service_with_connect_info`.
pub fn apply_rate_limit<S>(router: Router<S>, replenish: Duration, burst_size: u32) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let Some(config) = GovernorConfigBuilder::default()
        .period(replenish)
        .burst_size(burst_size)
        .key_extractor(SmartIpKeyExtractor)
        .use_headers()
        .finish()
    else {
        tracing::error!(?replenish, burst_size, "Invalid rate limit, routes left unlimited");
        return router;
    };

    router.layer(GovernorLayer::new(config))
}

pub fn apply_general_rate_limit<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    apply_rate_limit(router, GENERAL_REPLENISH, GENERAL_BURST_SIZE)
}

pub fn apply_report_rate_limit<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    apply_rate_limit(router, REPORT_REPLENISH, REPORT_BURST_SIZE)
}
