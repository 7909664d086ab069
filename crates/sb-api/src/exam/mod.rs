mod routes;
pub mod service;
pub mod session;

pub use routes::routes;
