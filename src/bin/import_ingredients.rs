//! Loads the ingredient catalog from a JSON export into the database.
//!
//! Usage: `import-ingredients [path/to/ingredients.json]`
//! (defaults to `data/ingredients.json`).

use std::path::PathBuf;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use recipebook::ingredients::import::{import_ingredients, read_seed_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "import_ingredients=info".into()),
        )
        .init();

    let path: PathBuf = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/ingredients.json".into())
        .into();

    let seeds = read_seed_file(&path)?;
    info!(count = seeds.len(), file = %path.display(), "seed file read");

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let db = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .context("connect to database")?;

    sqlx::migrate!("./migrations").run(&db).await?;

    let inserted = import_ingredients(&db, &seeds).await?;
    info!(inserted, "done");
    Ok(())
}
