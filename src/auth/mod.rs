use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod image;
pub mod services;
pub mod session;
pub mod validate;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::session_routes())
}
