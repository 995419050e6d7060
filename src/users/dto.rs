use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::User;
use crate::recipes::dto::RecipeShort;

/// Author block embedded in recipe views and subscription listings.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

impl UserSummary {
    pub fn from_user(user: User, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
            avatar: user.avatar,
        }
    }
}

/// One followed author with their recent recipes embedded.
#[derive(Debug, Serialize)]
pub struct SubscriptionEntry {
    #[serde(flatten)]
    pub user: UserSummary,
    pub recipes: Vec<RecipeShort>,
    pub recipes_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionQuery {
    /// How many recent recipes to embed per author. Kept as a raw string
    /// so a non-numeric value is ignored instead of rejected.
    pub recipes_limit: Option<String>,
}

/// Default is unlimited; anything unparsable is silently dropped.
pub fn parse_recipes_limit(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|v| v.parse::<usize>().ok())
}

#[cfg(test)]
mod tests {
    use super::parse_recipes_limit;

    #[test]
    fn numeric_limit_is_parsed() {
        assert_eq!(parse_recipes_limit(Some("3")), Some(3));
        assert_eq!(parse_recipes_limit(Some("0")), Some(0));
    }

    #[test]
    fn missing_limit_means_unlimited() {
        assert_eq!(parse_recipes_limit(None), None);
    }

    #[test]
    fn non_numeric_limit_is_ignored() {
        assert_eq!(parse_recipes_limit(Some("abc")), None);
        assert_eq!(parse_recipes_limit(Some("-2")), None);
        assert_eq!(parse_recipes_limit(Some("")), None);
    }
}
