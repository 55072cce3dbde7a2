pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod types;
