use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use tracing::info;

use crate::db::Product;
use crate::types::{NewProduct, ProductPayload};
use crate::{InventoryError, error::Entity, router::InventoryState};

type ProductBody = WithRejection<Json<ProductPayload>, InventoryError>;
type IdPath = WithRejection<Path<i64>, InventoryError>;

/// Rejects the write up front when its category is missing, so the client gets a
/// precise error instead of a foreign-key failure.
async fn ensure_category_for_write(
    state: &InventoryState,
    new: &NewProduct,
) -> Result<(), InventoryError> {
    match state.storage.get_category(new.category_id).await? {
        Some(_) => Ok(()),
        None => Err(InventoryError::UnknownCategory(new.category_id)),
    }
}

/// POST /products/
pub async fn create_product(
    State(state): State<InventoryState>,
    WithRejection(Json(payload), _): ProductBody,
) -> Result<Json<Product>, InventoryError> {
    let new = payload.validate()?;
    ensure_category_for_write(&state, &new).await?;
    let product = state.storage.create_product(&new).await?;
    info!(
        product_id = product.id,
        category_id = product.category_id,
        "product created"
    );
    Ok(Json(product))
}

/// GET /products/ -> every product ordered by id.
pub async fn list_products(
    State(state): State<InventoryState>,
) -> Result<Json<Vec<Product>>, InventoryError> {
    Ok(Json(state.storage.list_products().await?))
}

/// GET /products/{id}
pub async fn get_product(
    State(state): State<InventoryState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<Product>, InventoryError> {
    state
        .storage
        .get_product(id)
        .await?
        .map(Json)
        .ok_or(InventoryError::NotFound(Entity::Product))
}

/// GET /products/by_category/{category_id}
pub async fn list_products_by_category(
    State(state): State<InventoryState>,
    WithRejection(Path(category_id), _): IdPath,
) -> Result<Json<Vec<Product>>, InventoryError> {
    if state.storage.get_category(category_id).await?.is_none() {
        return Err(InventoryError::NotFound(Entity::Category));
    }
    Ok(Json(
        state.storage.list_products_by_category(category_id).await?,
    ))
}

/// PUT /products/{id} -> replaces every mutable field.
///
/// A missing product wins over a missing category: 404 before 400.
pub async fn update_product(
    State(state): State<InventoryState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(payload), _): ProductBody,
) -> Result<Json<Product>, InventoryError> {
    let new = payload.validate()?;
    if state.storage.get_product(id).await?.is_none() {
        return Err(InventoryError::NotFound(Entity::Product));
    }
    ensure_category_for_write(&state, &new).await?;
    let product = state
        .storage
        .update_product(id, &new)
        .await?
        .ok_or(InventoryError::NotFound(Entity::Product))?;
    info!(product_id = product.id, "product updated");
    Ok(Json(product))
}

/// DELETE /products/{id}
pub async fn delete_product(
    State(state): State<InventoryState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<StatusCode, InventoryError> {
    if state.storage.delete_product(id).await? {
        info!(product_id = id, "product deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(InventoryError::NotFound(Entity::Product))
    }
}
