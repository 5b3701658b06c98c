//! Ruster Scanner HTTP API
//! `POST /v1/scan` with a read-through scan cache, stats and health

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use middleware::start_cleanup_task;
pub use routes::create_router;
pub use types::*;
