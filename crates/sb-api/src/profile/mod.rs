mod routes;
pub mod streak;

pub use routes::routes;
