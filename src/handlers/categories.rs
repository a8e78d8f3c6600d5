use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use tracing::info;

use crate::db::Category;
use crate::types::CategoryPayload;
use crate::{InventoryError, error::Entity, router::InventoryState};

/// POST /categories/
pub async fn create_category(
    State(state): State<InventoryState>,
    WithRejection(Json(payload), _): WithRejection<Json<CategoryPayload>, InventoryError>,
) -> Result<Json<Category>, InventoryError> {
    let new = payload.validate()?;
    let category = state.storage.create_category(&new.name).await?;
    info!(category_id = category.id, name = %category.name, "category created");
    Ok(Json(category))
}

/// GET /categories/ -> every category ordered by name.
pub async fn list_categories(
    State(state): State<InventoryState>,
) -> Result<Json<Vec<Category>>, InventoryError> {
    Ok(Json(state.storage.list_categories().await?))
}

/// GET /categories/{id}
pub async fn get_category(
    State(state): State<InventoryState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, InventoryError>,
) -> Result<Json<Category>, InventoryError> {
    state
        .storage
        .get_category(id)
        .await?
        .map(Json)
        .ok_or(InventoryError::NotFound(Entity::Category))
}
