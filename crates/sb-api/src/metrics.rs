//! Prometheus metrics for the HTTP layer and the study activity behind it.

use std::{sync::LazyLock, time::Instant};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use regex::Regex;
use sb_review::{Difficulty, ExamType, SessionEvent};

static UUID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap_or_else(|e| unreachable!("uuid pattern is valid: {e}"))
});
static NUMBER_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/\d+(/|$)").unwrap_or_else(|e| unreachable!("number pattern is valid: {e}"))
});

pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let builder = PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full("http_request_duration_seconds".to_string()),
        &[
            0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ],
    )?;

    Ok(builder.install_recorder()?)
}

/// Record count, latency and in-flight requests per route
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let in_flight = gauge!("http_requests_in_flight", "method" => method.clone(), "path" => path.clone());
    in_flight.increment(1.0);

    let response = next.run(req).await;

    in_flight.decrement(1.0);

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(duration);

    response
}

/// Replace ids in a path so each route maps to one label value
fn normalize_path(path: &str) -> String {
    let normalized = UUID_SEGMENT.replace_all(path, ":id");
    NUMBER_SEGMENT
        .replace_all(&normalized, "/:n$1")
        .into_owned()
}

pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (StatusCode::OK, handle.render())
}

pub fn record_card_review(difficulty: Difficulty) {
    counter!("flash_card_reviews_total", "difficulty" => difficulty.as_str()).increment(1);
}

pub fn record_exam_graded(exam_type: ExamType, ended_by: SessionEvent, saved: bool) {
    let ended_by = match ended_by {
        SessionEvent::Submit => "submit",
        SessionEvent::Expire => "expire",
    };

    counter!(
        "exam_sessions_graded_total",
        "exam_type" => exam_type.as_str(),
        "ended_by" => ended_by,
        "saved" => if saved { "true" } else { "false" }
    )
    .increment(1);
}

pub fn record_report(kind: &'static str) {
    counter!("reports_filed_total", "type" => kind).increment(1);
}
