use axum::Router;

pub mod accounts;
pub mod movements;
pub mod system;

/// Protected route tree (auth middleware applied by the caller).
pub fn router() -> Router {
    Router::new()
        .merge(movements::router())
        .merge(accounts::router())
}
