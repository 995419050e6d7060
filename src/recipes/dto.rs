use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::dto::UserSummary;

/// One `{ingredient_id, amount}` pair as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientAmount {
    pub id: i64,
    pub amount: i32,
}

/// Create/update payload. The ingredient list replaces the recipe's
/// whole line set; partial edits of individual lines do not exist.
#[derive(Debug, Deserialize)]
pub struct RecipeWrite {
    pub ingredients: Vec<IngredientAmount>,
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i32,
}

/// A line resolved against the catalog for display.
#[derive(Debug, Clone, Serialize)]
pub struct IngredientLineView {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Full read view of a recipe for a particular viewer.
#[derive(Debug, Serialize)]
pub struct RecipeDetails {
    pub id: Uuid,
    pub author: UserSummary,
    pub ingredients: Vec<IngredientLineView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Abbreviated recipe returned by toggle endpoints and embedded in
/// subscription listings.
#[derive(Debug, Serialize)]
pub struct RecipeShort {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

#[derive(Debug, Serialize)]
pub struct ShortLink {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

/// Listing parameters: slicing plus the three membership filters. The
/// boolean flags arrive as raw strings so that anything other than a
/// recognised true-value simply leaves the filter off.
#[derive(Debug, Deserialize)]
pub struct RecipeListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub author: Option<Uuid>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

fn default_limit() -> i64 {
    100
}

pub fn flag_is_set(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|v| v.to_ascii_lowercase()).as_deref(),
        Some("1") | Some("true")
    )
}

#[cfg(test)]
mod tests {
    use super::flag_is_set;

    #[test]
    fn truthy_values_enable_the_flag() {
        assert!(flag_is_set(Some("1")));
        assert!(flag_is_set(Some("true")));
        assert!(flag_is_set(Some("True")));
    }

    #[test]
    fn everything_else_leaves_the_flag_off() {
        assert!(!flag_is_set(None));
        assert!(!flag_is_set(Some("0")));
        assert!(!flag_is_set(Some("false")));
        assert!(!flag_is_set(Some("yes")));
        assert!(!flag_is_set(Some("")));
    }
}
