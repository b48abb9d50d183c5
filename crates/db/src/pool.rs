//! Connection setup and schema migrations for the marketplace database.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::DbError;

/// Pool handed to [`crate::PgStore`] and the `migrate` subcommand.
pub type DbPool = PgPool;

/// How long a request may wait for a free connection before failing.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Open at most `max_connections` connections to `database_url`.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, DbError> {
    info!(max_connections, "opening marketplace database pool");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Bring the marketplace schema up to date.
/// The SQL files under the workspace `migrations/` directory are compiled
/// into the binary.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    info!("applying marketplace schema migrations");
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}
