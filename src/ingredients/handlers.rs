use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use super::repo::Ingredient;
use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct IngredientFilter {
    /// Case-insensitive name prefix.
    pub name: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ingredients", get(list_ingredients))
        .route("/ingredients/:id", get(get_ingredient))
}

#[instrument(skip(state))]
pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(filter): Query<IngredientFilter>,
) -> Result<Json<Vec<Ingredient>>, ApiError> {
    let rows = Ingredient::list(&state.db, filter.name.as_deref()).await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ingredient>, ApiError> {
    let ingredient = Ingredient::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("ingredient not found"))?;
    Ok(Json(ingredient))
}
