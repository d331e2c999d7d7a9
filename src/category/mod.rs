use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod repo;

pub use repo::Category;

pub const DISH_CATEGORY: i32 = 1;
pub const SETMEAL_CATEGORY: i32 = 2;

pub fn router() -> Router<AppState> {
    handlers::category_routes()
}
