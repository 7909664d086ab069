use std::net::SocketAddr;

use axum::{Router, middleware, routing::get};
use sb_api::{config::ApiConfig, state::ApiState};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    sb_api::tracing::init_tracing(config.env)?;
    let metrics_handle = sb_api::metrics::init_metrics()?;

    sb_db::ensure_database(&config.database_url).await?;
    let pool = sb_db::create_pool(&config.database_url, config.db_max_connections).await?;
    sb_db::migrate(&pool).await?;
    tracing::info!("Database ready");

    let state = ApiState::new(&config, pool)?;
    let _jobs = sb_api::jobs::start_background_jobs(state.clone());

    let cors = sb_api::middleware::cors::create_cors_layer(config.parsed_allowed_origins());

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let metrics_app = Router::new()
        .route("/metrics", get(sb_api::metrics::metrics_handler))
        .with_state(metrics_handle);

    let app = sb_api::router::router()
        .merge(metrics_app)
        .with_state(state)
        .layer(cors)
        .layer(trace_layer)
        .layer(middleware::from_fn(sb_api::metrics::track_metrics))
        .layer(middleware::from_fn(
            sb_api::middleware::request_id::request_id_middleware,
        ));
    let app = sb_api::middleware::security_headers::apply_security_headers(app, config.env);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.env,
        exam_questions = config.exam_question_count,
        exam_duration_secs = config.exam_duration_secs,
        "Server listening"
    );

    // Client IPs feed the rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutting down");
}
