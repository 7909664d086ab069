use axum::{
    Router,
    extract::Request,
    http::header,
    middleware::{self, Next},
    response::Response,
};

use crate::config::Environment;

/// Adds security headers to every response. HSTS only in production.
pub async fn security_headers_middleware(
    environment: Environment,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::HeaderName::from_static("x-content-type-options"),
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::HeaderName::from_static("x-frame-options"),
        header::HeaderValue::from_static("DENY"),
    );
    headers.insert(
        header::HeaderName::from_static("referrer-policy"),
        header::HeaderValue::from_static("no-referrer"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );

    if environment.is_production() {
        headers.insert(
            header::HeaderName::from_static("strict-transport-security"),
            header::HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    response
}

/// Apply security headers to a router
pub fn apply_security_headers<S>(router: Router<S>, environment: Environment) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn(move |req, next| {
        security_headers_middleware(environment, req, next)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, routing::get};
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "OK"
    }

    fn app(environment: Environment) -> Router {
        Router::new()
            .route("/test", get(test_handler))
            .layer(middleware::from_fn(move |req, next| {
                security_headers_middleware(environment, req, next)
            }))
    }

    fn request() -> axum::http::Request<axum::body::Body> {
        axum::http::Request::builder()
            .uri("/test")
            .body(axum::body::Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_production_adds_hsts() {
        let response = app(Environment::Production).oneshot(request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();

        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
        assert_eq!(headers.get("cache-control").unwrap(), "no-store");
        assert!(headers.get("strict-transport-security").is_some());
    }

    #[tokio::test]
    async fn test_development_skips_hsts() {
        let response = app(Environment::Development).oneshot(request()).await.unwrap();

        let headers = response.headers();

        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");

        assert!(headers.get("strict-transport-security").is_none());
    }
}
