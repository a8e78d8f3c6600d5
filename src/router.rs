use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::db::InventoryStorage;
use crate::handlers::{categories, products};

/// Shared handler state: only the storage handle, which owns the pool.
#[derive(Clone)]
pub struct InventoryState {
    pub storage: InventoryStorage,
}

impl InventoryState {
    pub fn new(storage: InventoryStorage) -> Self {
        Self { storage }
    }
}

pub fn inventory_router(state: InventoryState) -> Router {
    Router::new()
        .route(
            "/categories/",
            post(categories::create_category).get(categories::list_categories),
        )
        .route(
            "/categories",
            post(categories::create_category).get(categories::list_categories),
        )
        .route("/categories/{id}", get(categories::get_category))
        .route(
            "/products/",
            post(products::create_product).get(products::list_products),
        )
        .route(
            "/products",
            post(products::create_product).get(products::list_products),
        )
        .route(
            "/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/products/by_category/{category_id}",
            get(products::list_products_by_category),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
