//! Uniqueness-constrained (left, right) join relations with toggle
//! semantics: favorites, shopping cart, subscriptions. One
//! implementation serves all three; the storage-level unique constraint
//! is what arbitrates concurrent double-adds.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;

/// A binary relation identified by its table and the two key columns.
/// Instances are compile-time constants, so interpolating them into SQL
/// text is safe.
#[derive(Debug, Clone, Copy)]
pub struct PairRelation {
    table: &'static str,
    left: &'static str,
    right: &'static str,
}

pub const FAVORITES: PairRelation = PairRelation {
    table: "favorites",
    left: "user_id",
    right: "recipe_id",
};

pub const SHOPPING_CART: PairRelation = PairRelation {
    table: "shopping_cart",
    left: "user_id",
    right: "recipe_id",
};

pub const SUBSCRIPTIONS: PairRelation = PairRelation {
    table: "subscriptions",
    left: "user_id",
    right: "author_id",
};

impl PairRelation {
    /// Inserts the pair. A concurrent or earlier insert of the same pair
    /// surfaces as a unique violation, reported as a conflict.
    pub async fn add(
        &self,
        db: &PgPool,
        left: Uuid,
        right: Uuid,
        conflict_msg: &str,
    ) -> Result<(), ApiError> {
        let sql = format!(
            "INSERT INTO {} ({}, {}) VALUES ($1, $2)",
            self.table, self.left, self.right
        );
        match sqlx::query(&sql).bind(left).bind(right).execute(db).await {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(ApiError::conflict(conflict_msg))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes the pair if present. A single conditional delete rather
    /// than exists-then-delete, so two concurrent removes cannot both
    /// observe the row: exactly one sees rows_affected > 0.
    pub async fn remove(
        &self,
        db: &PgPool,
        left: Uuid,
        right: Uuid,
        missing_msg: &str,
    ) -> Result<(), ApiError> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1 AND {} = $2",
            self.table, self.left, self.right
        );
        let result = sqlx::query(&sql).bind(left).bind(right).execute(db).await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::not_found(missing_msg));
        }
        Ok(())
    }

    /// Membership probe used when rendering per-viewer flags.
    pub async fn contains(&self, db: &PgPool, left: Uuid, right: Uuid) -> Result<bool, ApiError> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1 AND {} = $2)",
            self.table, self.left, self.right
        );
        let exists: bool = sqlx::query_scalar(&sql)
            .bind(left)
            .bind(right)
            .fetch_one(db)
            .await?;
        Ok(exists)
    }
}
