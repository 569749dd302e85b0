use crate::state::AppState;
use axum::Router;

pub mod claims;
mod cookie;
pub mod dto;
pub mod errors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod store;
mod validation;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
