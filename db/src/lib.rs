use color_eyre::{eyre::eyre, Result};
use sqlx::postgres::PgPoolOptions;

pub mod cooking;
pub mod users;

pub use sqlx;
pub use sqlx::PgPool;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

#[tracing::instrument(err, skip(database_url))]
pub async fn setup_db_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    const MIGRATION_LOCK_ID: i64 = 0x00DB_DB_DB_DB_DB_DB;
    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(MIGRATION_LOCK_ID)
        .execute(&pool)
        .await?;

    MIGRATOR.run(&pool).await?;

    let unlocked: Option<bool> = sqlx::query_scalar("SELECT pg_advisory_unlock($1)")
        .bind(MIGRATION_LOCK_ID)
        .fetch_one(&pool)
        .await?;

    match unlocked {
        Some(true) => tracing::info!("Migration lock unlocked"),
        Some(false) => tracing::warn!("Migration lock was not held when unlocking"),
        None => return Err(eyre!("Failed to unlock migration lock")),
    }

    Ok(pool)
}
