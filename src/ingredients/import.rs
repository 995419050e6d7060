//! Offline bulk load of the ingredient catalog from an
//! `ingredients.json` export: `[{"name": ..., "measurement_unit": ...}]`.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct IngredientSeed {
    pub name: String,
    pub measurement_unit: String,
}

pub fn read_seed_file(path: &Path) -> anyhow::Result<Vec<IngredientSeed>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?;
    let seeds: Vec<IngredientSeed> =
        serde_json::from_str(&raw).context("parse ingredients json")?;
    Ok(seeds)
}

/// Inserts the whole seed set in one statement. Conflicts are ignored
/// rather than constrained away: the catalog tolerates near-duplicate
/// (name, unit) rows on purpose.
pub async fn import_ingredients(db: &PgPool, seeds: &[IngredientSeed]) -> anyhow::Result<u64> {
    let names: Vec<String> = seeds.iter().map(|s| s.name.clone()).collect();
    let units: Vec<String> = seeds.iter().map(|s| s.measurement_unit.clone()).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO ingredients (name, measurement_unit)
        SELECT * FROM UNNEST($1::text[], $2::text[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(&names)
    .bind(&units)
    .execute(db)
    .await
    .context("bulk insert ingredients")?;

    info!(inserted = result.rows_affected(), total = seeds.len(), "ingredients imported");
    Ok(result.rows_affected())
}
