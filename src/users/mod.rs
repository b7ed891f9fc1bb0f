use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod sanitize;
pub mod services;

pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
pub const ROLE_USER: &str = "ROLE_USER";

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::user_routes())
}
