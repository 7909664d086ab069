mod routes;

pub(crate) use routes::ContentReportRequest;
pub use routes::{CardView, DEFAULT_REVIEW_COUNT, MAX_REVIEW_COUNT, routes};
