use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo::{PgUserStore, UserStore};

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
