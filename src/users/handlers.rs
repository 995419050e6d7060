use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{parse_recipes_limit, SubscriptionEntry, SubscriptionQuery, UserSummary};
use super::repo::User;
use crate::{
    auth::AuthUser,
    error::ApiError,
    memberships::SUBSCRIPTIONS,
    recipes::{dto::RecipeShort, repo::Recipe},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/subscriptions", get(list_subscriptions))
        .route(
            "/users/:id/subscribe",
            post(subscribe).delete(unsubscribe),
        )
}

async fn find_author(state: &AppState, id: Uuid) -> Result<User, ApiError> {
    User::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))
}

async fn subscription_entry(
    state: &AppState,
    author: User,
    recipes_limit: Option<usize>,
) -> Result<SubscriptionEntry, ApiError> {
    let recipes_count = Recipe::count_by_author(&state.db, author.id).await?;
    let recipes = Recipe::list_by_author(
        &state.db,
        author.id,
        recipes_limit.map(|n| n as i64),
    )
    .await?
    .into_iter()
    .map(|r| RecipeShort {
        id: r.id,
        name: r.name,
        image: r.image,
        cooking_time: r.cooking_time,
    })
    .collect();

    Ok(SubscriptionEntry {
        user: UserSummary::from_user(author, true),
        recipes,
        recipes_count,
    })
}

#[instrument(skip(state))]
pub async fn list_subscriptions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<SubscriptionQuery>,
) -> Result<Json<Vec<SubscriptionEntry>>, ApiError> {
    let limit = parse_recipes_limit(q.recipes_limit.as_deref());
    let authors = User::subscribed_authors(&state.db, user_id).await?;
    let mut entries = Vec::with_capacity(authors.len());
    for author in authors {
        entries.push(subscription_entry(&state, author, limit).await?);
    }
    Ok(Json(entries))
}

#[instrument(skip(state))]
pub async fn subscribe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Query(q): Query<SubscriptionQuery>,
) -> Result<(StatusCode, Json<SubscriptionEntry>), ApiError> {
    // Self-subscription is rejected before any lookup.
    if user_id == id {
        return Err(ApiError::validation("you cannot subscribe to yourself"));
    }
    let author = find_author(&state, id).await?;
    SUBSCRIPTIONS
        .add(&state.db, user_id, author.id, "already subscribed to this author")
        .await?;
    let limit = parse_recipes_limit(q.recipes_limit.as_deref());
    let entry = subscription_entry(&state, author, limit).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state))]
pub async fn unsubscribe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let author = find_author(&state, id).await?;
    SUBSCRIPTIONS
        .remove(
            &state.db,
            user_id,
            author.id,
            "you are not subscribed to this author",
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
