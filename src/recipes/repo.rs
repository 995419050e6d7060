use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::IngredientAmount;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i32,
    pub created_at: OffsetDateTime,
}

/// A stored line joined to its catalog entry.
#[derive(Debug, Clone, FromRow)]
pub struct LineRow {
    pub ingredient_id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// One group of the cart aggregation: same ingredient name and unit,
/// amounts summed across every recipe in the user's cart.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ShoppingListRow {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

impl Recipe {
    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Recipe>> {
        let row = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, author_id, name, text, image, cooking_time, created_at
            FROM recipes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Listing with the optional filters: by author, by presence in
    /// `favorited_by`'s favorites, by presence in `in_cart_of`'s cart.
    /// A NULL filter is a no-op, so one statement covers every
    /// combination.
    pub async fn list(
        db: &PgPool,
        author: Option<Uuid>,
        favorited_by: Option<Uuid>,
        in_cart_of: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT r.id, r.author_id, r.name, r.text, r.image, r.cooking_time, r.created_at
            FROM recipes r
            WHERE ($1::uuid IS NULL OR r.author_id = $1)
              AND ($2::uuid IS NULL OR EXISTS(
                    SELECT 1 FROM favorites f
                    WHERE f.user_id = $2 AND f.recipe_id = r.id))
              AND ($3::uuid IS NULL OR EXISTS(
                    SELECT 1 FROM shopping_cart sc
                    WHERE sc.user_id = $3 AND sc.recipe_id = r.id))
            ORDER BY r.created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(author)
        .bind(favorited_by)
        .bind(in_cart_of)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Recent-first recipes of one author, optionally truncated. Feeds
    /// the subscription listing's embedded recipes.
    pub async fn list_by_author(
        db: &PgPool,
        author_id: Uuid,
        limit: Option<i64>,
    ) -> anyhow::Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, author_id, name, text, image, cooking_time, created_at
            FROM recipes
            WHERE author_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn count_by_author(db: &PgPool, author_id: Uuid) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM recipes WHERE author_id = $1
            "#,
        )
        .bind(author_id)
        .fetch_one(db)
        .await?;
        Ok(count)
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        author_id: Uuid,
        name: &str,
        text: &str,
        image: &str,
        cooking_time: i32,
    ) -> anyhow::Result<Recipe> {
        let row = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (author_id, name, text, image, cooking_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, author_id, name, text, image, cooking_time, created_at
            "#,
        )
        .bind(author_id)
        .bind(name)
        .bind(text)
        .bind(image)
        .bind(cooking_time)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row)
    }

    /// Returns None when the recipe vanished between the caller's
    /// existence check and the UPDATE (concurrent delete).
    pub async fn update_fields(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        name: &str,
        text: &str,
        image: &str,
        cooking_time: i32,
    ) -> anyhow::Result<Option<Recipe>> {
        let row = sqlx::query_as::<_, Recipe>(
            r#"
            UPDATE recipes
            SET name = $2, text = $3, image = $4, cooking_time = $5
            WHERE id = $1
            RETURNING id, author_id, name, text, image, cooking_time, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(text)
        .bind(image)
        .bind(cooking_time)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(r#"DELETE FROM recipes WHERE id = $1"#)
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn lines(db: &PgPool, recipe_id: Uuid) -> anyhow::Result<Vec<LineRow>> {
        let rows = sqlx::query_as::<_, LineRow>(
            r#"
            SELECT ri.ingredient_id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            "#,
        )
        .bind(recipe_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

/// Replaces the recipe's entire line set inside the caller's
/// transaction. A failure between the delete and the insert rolls back
/// with the rest of the transaction, so a partially replaced set is
/// never observable.
pub async fn replace_lines(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    lines: &[IngredientAmount],
) -> anyhow::Result<()> {
    sqlx::query(r#"DELETE FROM recipe_ingredients WHERE recipe_id = $1"#)
        .bind(recipe_id)
        .execute(&mut **tx)
        .await?;

    let ids: Vec<i64> = lines.iter().map(|l| l.id).collect();
    let amounts: Vec<i32> = lines.iter().map(|l| l.amount).collect();

    sqlx::query(
        r#"
        INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
        SELECT $1, t.ingredient_id, t.amount
        FROM UNNEST($2::bigint[], $3::int[]) AS t(ingredient_id, amount)
        "#,
    )
    .bind(recipe_id)
    .bind(&ids)
    .bind(&amounts)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// The cart aggregation: every line of every recipe in the user's
/// cart, grouped by (name, unit) and summed. One read query; group
/// order is whatever the database produces.
pub async fn shopping_list(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<ShoppingListRow>> {
    let rows = sqlx::query_as::<_, ShoppingListRow>(
        r#"
        SELECT i.name, i.measurement_unit, SUM(ri.amount)::bigint AS total_amount
        FROM recipe_ingredients ri
        JOIN ingredients i ON i.id = ri.ingredient_id
        JOIN shopping_cart sc ON sc.recipe_id = ri.recipe_id
        WHERE sc.user_id = $1
        GROUP BY i.name, i.measurement_unit
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
