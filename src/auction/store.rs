use async_trait::async_trait;
use sqlx::PgPool;

use crate::auction::state::{Release, Sale};
use crate::db::{
    auction_repo, category_repo,
    models::{AuctionCategory, Player, Team},
    player_repo, team_repo,
};
use crate::error::AppResult;

/// Everything the engine reads from and writes to the record store.
///
/// A sale or release is one call so an implementation can make the player
/// and team writes atomic.
#[async_trait]
pub trait AuctionStore: Send + Sync {
    async fn players(&self) -> AppResult<Vec<Player>>;
    async fn teams(&self) -> AppResult<Vec<Team>>;
    async fn categories(&self) -> AppResult<Vec<AuctionCategory>>;
    async fn commit_sale(&self, sale: &Sale) -> AppResult<(Player, Team)>;
    async fn commit_release(&self, release: &Release) -> AppResult<(Player, Team)>;
}

/// Postgres-backed store; sale and release each run in one transaction.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuctionStore for PgStore {
    async fn players(&self) -> AppResult<Vec<Player>> {
        player_repo::list_all(&self.db).await
    }

    async fn teams(&self) -> AppResult<Vec<Team>> {
        team_repo::list_all(&self.db).await
    }

    async fn categories(&self) -> AppResult<Vec<AuctionCategory>> {
        category_repo::list_all(&self.db).await
    }

    async fn commit_sale(&self, sale: &Sale) -> AppResult<(Player, Team)> {
        auction_repo::commit_sale(&self.db, sale.player_id, sale.team_id, sale.price).await
    }

    async fn commit_release(&self, release: &Release) -> AppResult<(Player, Team)> {
        auction_repo::commit_release(&self.db, release.player_id, release.team_id).await
    }
}
