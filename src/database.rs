use log::info;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use crate::errors::RepositoryError;

pub type Database = Pool<Postgres>;

pub async fn create_database_pool(database_url: &str) -> Result<Database, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    // Test the connection
    sqlx::query("SELECT 1")
        .fetch_one(&pool)
        .await?;

    info!("Connected to database successfully!");
    Ok(pool)
}

pub async fn run_migrations(pool: &Database) -> Result<(), RepositoryError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
