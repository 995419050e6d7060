use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{RecipeDetails, RecipeListQuery, RecipeShort, RecipeWrite, ShortLink};
use super::repo::{self, Recipe};
use super::services;
use crate::{
    auth::{AuthUser, Viewer},
    error::ApiError,
    memberships::{PairRelation, FAVORITES, SHOPPING_CART},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route("/recipes/download_shopping_cart", get(download_shopping_cart))
        .route(
            "/recipes/:id",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route("/recipes/:id/get-link", get(get_short_link))
        .route(
            "/recipes/:id/favorite",
            post(add_favorite).delete(remove_favorite),
        )
        .route(
            "/recipes/:id/shopping_cart",
            post(add_to_cart).delete(remove_from_cart),
        )
}

async fn find_recipe(state: &AppState, id: Uuid) -> Result<Recipe, ApiError> {
    Recipe::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("recipe not found"))
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Query(q): Query<RecipeListQuery>,
) -> Result<Json<Vec<RecipeDetails>>, ApiError> {
    let (favorited_by, in_cart_of) = services::membership_filters(&q, viewer);
    let recipes =
        Recipe::list(&state.db, q.author, favorited_by, in_cart_of, q.limit, q.offset).await?;
    let mut items = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        items.push(services::render_recipe(&state.db, recipe, viewer).await?);
    }
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeDetails>, ApiError> {
    let recipe = find_recipe(&state, id).await?;
    Ok(Json(services::render_recipe(&state.db, recipe, viewer).await?))
}

#[instrument(skip(state, body))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<RecipeWrite>,
) -> Result<(StatusCode, Json<RecipeDetails>), ApiError> {
    let recipe = services::create_recipe(&state.db, user_id, &body).await?;
    let details = services::render_recipe(&state.db, recipe, Some(user_id)).await?;
    Ok((StatusCode::CREATED, Json(details)))
}

#[instrument(skip(state, body))]
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<RecipeWrite>,
) -> Result<Json<RecipeDetails>, ApiError> {
    let recipe = find_recipe(&state, id).await?;
    if recipe.author_id != user_id {
        return Err(ApiError::Forbidden);
    }
    let recipe = services::update_recipe(&state.db, id, &body).await?;
    Ok(Json(services::render_recipe(&state.db, recipe, Some(user_id)).await?))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let recipe = find_recipe(&state, id).await?;
    if recipe.author_id != user_id {
        return Err(ApiError::Forbidden);
    }
    Recipe::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_short_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Json<ShortLink> {
    Json(ShortLink {
        short_link: services::short_link(&state.config.base_url, id),
    })
}

// --- favorite / shopping cart toggles ---

async fn toggle_on(
    state: &AppState,
    relation: PairRelation,
    user_id: Uuid,
    recipe_id: Uuid,
    conflict_msg: &str,
) -> Result<(StatusCode, Json<RecipeShort>), ApiError> {
    let recipe = find_recipe(state, recipe_id).await?;
    relation
        .add(&state.db, user_id, recipe.id, conflict_msg)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RecipeShort {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }),
    ))
}

async fn toggle_off(
    state: &AppState,
    relation: PairRelation,
    user_id: Uuid,
    recipe_id: Uuid,
    missing_msg: &str,
) -> Result<StatusCode, ApiError> {
    let recipe = find_recipe(state, recipe_id).await?;
    relation
        .remove(&state.db, user_id, recipe.id, missing_msg)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<RecipeShort>), ApiError> {
    toggle_on(&state, FAVORITES, user_id, id, "recipe is already in favorites").await
}

#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    toggle_off(&state, FAVORITES, user_id, id, "recipe is not in favorites").await
}

#[instrument(skip(state))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<RecipeShort>), ApiError> {
    toggle_on(
        &state,
        SHOPPING_CART,
        user_id,
        id,
        "recipe is already in the shopping cart",
    )
    .await
}

#[instrument(skip(state))]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    toggle_off(
        &state,
        SHOPPING_CART,
        user_id,
        id,
        "recipe is not in the shopping cart",
    )
    .await
}

#[instrument(skip(state))]
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let rows = repo::shopping_list(&state.db, user_id).await?;
    let report = services::render_shopping_list(&rows);
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"shopping_list.txt\"",
            ),
        ],
        report,
    ))
}
