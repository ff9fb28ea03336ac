use axum::{extract::State, routing::get, Json, Router};
use tracing::{debug, instrument};

use crate::{error::ApiError, products::repo_types::Product, state::AppState};

pub fn product_routes() -> Router<AppState> {
    Router::new().route("/products", get(list_products))
}

#[instrument(skip(state))]
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.products.list().await?;
    debug!(count = products.len(), "products listed");
    Ok(Json(products))
}
