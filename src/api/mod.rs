//! HTTP API module: key gate, response envelope, and the query endpoints.

pub mod auth;
pub mod envelope;
pub mod handlers;
pub mod routes;

pub use auth::ApiKeyGate;
pub use envelope::Envelope;
pub use handlers::AppState;
pub use routes::create_router;
