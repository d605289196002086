use std::str::FromStr as _;

use anyhow::Context as _;

/// The application database handle.
pub type Db = sqlx::SqlitePool;

/// Open the database, creating the file if necessary, and bring the schema up
/// to date with the embedded migrations.
pub async fn connect(url: &str) -> anyhow::Result<Db> {
    if let Some(path) = url.strip_prefix("sqlite://") {
        if let Some(parent) = std::path::Path::new(path).parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("failed to create database directory")?;
        }
    }

    let opts = sqlx::sqlite::SqliteConnectOptions::from_str(url)
        .context("failed to parse database options")?
        .create_if_missing(true);
    let db = sqlx::SqlitePool::connect_with(opts)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!()
        .run(&db)
        .await
        .context("failed to apply migrations")?;

    Ok(db)
}
