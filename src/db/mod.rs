pub mod auction_repo;
pub mod category_repo;
pub mod models;
pub mod player_repo;
pub mod team_repo;
pub mod user_repo;

use sqlx::PgPool;

/// Cheap round-trip used by the health probe.
pub async fn ping(db: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(db).await.map(|_| ())
}
