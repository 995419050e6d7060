use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Catalog reference data. Read-only at request time; rows are created
/// only by the offline importer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

/// The prefix is user input destined for an ILIKE pattern, so its
/// wildcard characters must match literally.
fn escape_like_prefix(prefix: &str) -> String {
    let mut out = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl Ingredient {
    pub async fn list(db: &PgPool, name_prefix: Option<&str>) -> anyhow::Result<Vec<Ingredient>> {
        let rows = match name_prefix {
            Some(prefix) => {
                sqlx::query_as::<_, Ingredient>(
                    r#"
                    SELECT id, name, measurement_unit
                    FROM ingredients
                    WHERE name ILIKE $1 || '%'
                    ORDER BY name
                    "#,
                )
                .bind(escape_like_prefix(prefix))
                .fetch_all(db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Ingredient>(
                    r#"
                    SELECT id, name, measurement_unit
                    FROM ingredients
                    ORDER BY name
                    "#,
                )
                .fetch_all(db)
                .await?
            }
        };
        Ok(rows)
    }

    pub async fn find(db: &PgPool, id: i64) -> anyhow::Result<Option<Ingredient>> {
        let row = sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, name, measurement_unit
            FROM ingredients
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Returns which of the given ids actually exist in the catalog.
    /// Used to validate recipe lines before the replace transaction.
    pub async fn existing_ids(db: &PgPool, ids: &[i64]) -> anyhow::Result<HashSet<i64>> {
        let found: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM ingredients WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(db)
        .await?;
        Ok(found.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::escape_like_prefix;

    #[test]
    fn plain_prefixes_pass_through() {
        assert_eq!(escape_like_prefix("salt"), "salt");
        assert_eq!(escape_like_prefix("мука"), "мука");
    }

    #[test]
    fn wildcard_characters_match_literally() {
        assert_eq!(escape_like_prefix("%"), "\\%");
        assert_eq!(escape_like_prefix("a_b"), "a\\_b");
        assert_eq!(escape_like_prefix("c\\d"), "c\\\\d");
        assert_eq!(escape_like_prefix("100%_\\"), "100\\%\\_\\\\");
    }
}
