pub mod handlers;
pub mod repo;
pub mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use repo::{PgProductStore, ProductStore};
pub use repo_types::Product;

pub fn router() -> Router<AppState> {
    handlers::product_routes()
}
