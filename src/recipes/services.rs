use std::collections::HashSet;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::dto::{
    flag_is_set, IngredientAmount, IngredientLineView, RecipeDetails, RecipeListQuery, RecipeWrite,
};
use super::repo::{self, Recipe, ShoppingListRow};
use crate::error::ApiError;
use crate::ingredients::repo::Ingredient;
use crate::memberships::{FAVORITES, SHOPPING_CART, SUBSCRIPTIONS};
use crate::users::dto::UserSummary;
use crate::users::repo::User;

pub const SHOPPING_LIST_HEADER: &str = "Shopping list:";

/// List-wide validation of submitted lines, in order: non-empty, every
/// id known, no repeats, every amount positive. `known_ids` is the
/// subset of submitted ids that exist in the catalog.
pub fn validate_lines(
    lines: &[IngredientAmount],
    known_ids: &HashSet<i64>,
) -> Result<(), ApiError> {
    if lines.is_empty() {
        return Err(ApiError::validation("ingredients list cannot be empty"));
    }
    for line in lines {
        if !known_ids.contains(&line.id) {
            return Err(ApiError::validation(format!(
                "ingredient with id={} does not exist",
                line.id
            )));
        }
    }
    let mut seen = HashSet::new();
    for line in lines {
        if !seen.insert(line.id) {
            return Err(ApiError::validation(format!(
                "ingredient with id={} is repeated",
                line.id
            )));
        }
    }
    for line in lines {
        if line.amount < 1 {
            return Err(ApiError::validation(format!(
                "amount for ingredient with id={} must be a positive number",
                line.id
            )));
        }
    }
    Ok(())
}

pub fn validate_cooking_time(cooking_time: i32) -> Result<(), ApiError> {
    if cooking_time < 1 {
        return Err(ApiError::validation("cooking_time must be at least 1"));
    }
    Ok(())
}

async fn validate_payload(db: &PgPool, payload: &RecipeWrite) -> Result<(), ApiError> {
    validate_cooking_time(payload.cooking_time)?;
    // Non-empty is checked before the catalog round trip.
    if payload.ingredients.is_empty() {
        return Err(ApiError::validation("ingredients list cannot be empty"));
    }
    let ids: Vec<i64> = payload.ingredients.iter().map(|l| l.id).collect();
    let known = Ingredient::existing_ids(db, &ids).await?;
    validate_lines(&payload.ingredients, &known)
}

/// Creates the recipe row and its lines as one transaction.
pub async fn create_recipe(
    db: &PgPool,
    author_id: Uuid,
    payload: &RecipeWrite,
) -> Result<Recipe, ApiError> {
    validate_payload(db, payload).await?;

    let mut tx = db.begin().await?;
    let recipe = Recipe::insert(
        &mut tx,
        author_id,
        &payload.name,
        &payload.text,
        &payload.image,
        payload.cooking_time,
    )
    .await?;
    repo::replace_lines(&mut tx, recipe.id, &payload.ingredients).await?;
    tx.commit().await?;

    info!(recipe_id = %recipe.id, %author_id, "recipe created");
    Ok(recipe)
}

/// Re-runs create's validation against an existing recipe, then swaps
/// the row fields and the whole line set atomically.
pub async fn update_recipe(
    db: &PgPool,
    recipe_id: Uuid,
    payload: &RecipeWrite,
) -> Result<Recipe, ApiError> {
    validate_payload(db, payload).await?;

    let mut tx = db.begin().await?;
    let recipe = Recipe::update_fields(
        &mut tx,
        recipe_id,
        &payload.name,
        &payload.text,
        &payload.image,
        payload.cooking_time,
    )
    .await?
    .ok_or_else(|| ApiError::not_found("recipe not found"))?;
    repo::replace_lines(&mut tx, recipe.id, &payload.ingredients).await?;
    tx.commit().await?;

    info!(%recipe_id, "recipe updated");
    Ok(recipe)
}

/// Hydrates the full read view for a viewer. An anonymous viewer gets
/// both flags false without touching the membership tables.
pub async fn render_recipe(
    db: &PgPool,
    recipe: Recipe,
    viewer: Option<Uuid>,
) -> Result<RecipeDetails, ApiError> {
    let author = User::find(db, recipe.author_id)
        .await?
        .ok_or_else(|| ApiError::not_found("author not found"))?;

    let (is_favorited, is_in_shopping_cart, is_subscribed) = match viewer {
        Some(user_id) => (
            FAVORITES.contains(db, user_id, recipe.id).await?,
            SHOPPING_CART.contains(db, user_id, recipe.id).await?,
            SUBSCRIPTIONS.contains(db, user_id, recipe.author_id).await?,
        ),
        None => (false, false, false),
    };

    let lines = Recipe::lines(db, recipe.id).await?;
    let ingredients = lines
        .into_iter()
        .map(|l| IngredientLineView {
            id: l.ingredient_id,
            name: l.name,
            measurement_unit: l.measurement_unit,
            amount: l.amount,
        })
        .collect();

    Ok(RecipeDetails {
        id: recipe.id,
        author: UserSummary::from_user(author, is_subscribed),
        ingredients,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name,
        image: recipe.image,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
    })
}

/// Resolves the membership filter flags of a listing request into the
/// user ids the repository query joins against. A flag counts only when
/// it is set and the viewer is authenticated; anonymous requests get the
/// unfiltered listing no matter what they send.
pub fn membership_filters(
    query: &RecipeListQuery,
    viewer: Option<Uuid>,
) -> (Option<Uuid>, Option<Uuid>) {
    let favorited_by = viewer.filter(|_| flag_is_set(query.is_favorited.as_deref()));
    let in_cart_of = viewer.filter(|_| flag_is_set(query.is_in_shopping_cart.as_deref()));
    (favorited_by, in_cart_of)
}

/// Flat text report: a constant header, then one line per group.
/// Group order follows the input; the aggregation query does not
/// promise one.
pub fn render_shopping_list(rows: &[ShoppingListRow]) -> String {
    let mut out = String::from(SHOPPING_LIST_HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "{} ({}) — {}\n",
            row.name, row.measurement_unit, row.total_amount
        ));
    }
    out
}

/// Pure formatting; intentionally does not check the recipe exists,
/// existence is the redirect resolver's problem.
pub fn short_link(base_url: &str, recipe_id: Uuid) -> String {
    format!("{}/s/{}/", base_url, recipe_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i64, amount: i32) -> IngredientAmount {
        IngredientAmount { id, amount }
    }

    fn known(ids: &[i64]) -> HashSet<i64> {
        ids.iter().copied().collect()
    }

    #[test]
    fn empty_line_list_is_rejected() {
        let err = validate_lines(&[], &known(&[])).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn unknown_ingredient_is_rejected() {
        let err = validate_lines(&[line(1, 10), line(7, 5)], &known(&[1])).unwrap_err();
        match err {
            ApiError::Validation(msg) => assert!(msg.contains("id=7")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_ingredient_is_rejected() {
        let err = validate_lines(&[line(1, 10), line(1, 5)], &known(&[1])).unwrap_err();
        match err {
            ApiError::Validation(msg) => assert!(msg.contains("repeated")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        for bad in [0, -3] {
            let err = validate_lines(&[line(1, bad)], &known(&[1])).unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
        }
    }

    #[test]
    fn unknown_ingredient_wins_over_bad_amount() {
        // The id check runs over the whole list before amounts are looked at.
        let err = validate_lines(&[line(1, 0), line(9, 5)], &known(&[1])).unwrap_err();
        match err {
            ApiError::Validation(msg) => assert!(msg.contains("id=9")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_lines_pass() {
        assert!(validate_lines(&[line(1, 100), line(2, 1)], &known(&[1, 2])).is_ok());
    }

    #[test]
    fn cooking_time_must_be_positive() {
        assert!(validate_cooking_time(1).is_ok());
        assert!(validate_cooking_time(0).is_err());
        assert!(validate_cooking_time(-5).is_err());
    }

    #[test]
    fn empty_cart_renders_header_only() {
        assert_eq!(render_shopping_list(&[]), "Shopping list:\n");
    }

    #[test]
    fn report_lines_carry_name_unit_and_total() {
        let rows = vec![
            ShoppingListRow {
                name: "flour".into(),
                measurement_unit: "g".into(),
                total_amount: 150,
            },
            ShoppingListRow {
                name: "milk".into(),
                measurement_unit: "ml".into(),
                total_amount: 200,
            },
        ];
        let report = render_shopping_list(&rows);
        assert!(report.starts_with("Shopping list:\n"));
        assert!(report.contains("flour (g) — 150\n"));
        assert!(report.contains("milk (ml) — 200\n"));
        assert!(report.ends_with('\n'));
    }

    fn list_query(favorited: Option<&str>, in_cart: Option<&str>) -> RecipeListQuery {
        RecipeListQuery {
            limit: 100,
            offset: 0,
            author: None,
            is_favorited: favorited.map(String::from),
            is_in_shopping_cart: in_cart.map(String::from),
        }
    }

    #[test]
    fn membership_filters_require_an_authenticated_viewer() {
        let viewer = Some(Uuid::new_v4());
        let q = list_query(Some("1"), Some("true"));
        assert_eq!(membership_filters(&q, viewer), (viewer, viewer));
        // The same flags are silently ignored for anonymous requests.
        assert_eq!(membership_filters(&q, None), (None, None));
    }

    #[test]
    fn unset_or_false_flags_do_not_filter() {
        let viewer = Some(Uuid::new_v4());
        assert_eq!(membership_filters(&list_query(None, None), viewer), (None, None));
        assert_eq!(
            membership_filters(&list_query(Some("0"), Some("false")), viewer),
            (None, None)
        );
    }

    #[test]
    fn flags_resolve_independently() {
        let viewer = Some(Uuid::new_v4());
        let q = list_query(Some("1"), None);
        assert_eq!(membership_filters(&q, viewer), (viewer, None));
    }

    #[test]
    fn short_link_has_expected_shape() {
        let id = Uuid::nil();
        assert_eq!(
            short_link("https://recipebook.example", id),
            format!("https://recipebook.example/s/{}/", id)
        );
    }
}
