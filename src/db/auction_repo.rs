//! Settlement writes. Each one touches a player and a team, so both run in a
//! single transaction and either land together or not at all.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{Player, Team};
use crate::error::{AppError, AppResult};

const PLAYER_RETURNING: &str = "RETURNING id, name, email, avatar_url, skills, rating, gender, \
                                availability, bio, team_id, base_price, sold_price, created_at, \
                                updated_at";

const TEAM_RETURNING: &str = "RETURNING id, name, captain, budget, logo_url, created_at";

/// Bind an unsold player to `team_id` at `price` and take `price` off the
/// team's budget.
pub async fn commit_sale(
    db: &PgPool,
    player_id: Uuid,
    team_id: Uuid,
    price: i64,
) -> AppResult<(Player, Team)> {
    let mut tx = db.begin().await?;

    // 1) Assign player (only if still unsold)
    let player = sqlx::query_as::<_, Player>(&format!(
        "UPDATE players
            SET team_id = $2, sold_price = $3, updated_at = NOW()
          WHERE id = $1 AND team_id IS NULL
          {PLAYER_RETURNING}"
    ))
    .bind(player_id)
    .bind(team_id)
    .bind(price)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::Precondition("player is missing or already sold".into()))?;

    // 2) Debit budget; the guard keeps it from ever going negative
    let team = sqlx::query_as::<_, Team>(&format!(
        "UPDATE teams
            SET budget = budget - $2
          WHERE id = $1 AND budget >= $2
          {TEAM_RETURNING}"
    ))
    .bind(team_id)
    .bind(price)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(team) = team else {
        tx.rollback().await.ok();
        return Err(AppError::Precondition(
            "team is missing or its budget is too small".into(),
        ));
    };

    tx.commit().await?;
    Ok((player, team))
}

/// Undo a sale: clear the player's team and refund the price stored on the
/// row to the team.
pub async fn commit_release(
    db: &PgPool,
    player_id: Uuid,
    team_id: Uuid,
) -> AppResult<(Player, Team)> {
    let mut tx = db.begin().await?;

    // 1) Lock the row and read what was actually paid
    let refund = sqlx::query_scalar::<_, Option<i64>>(
        "SELECT sold_price FROM players WHERE id = $1 AND team_id = $2 FOR UPDATE",
    )
    .bind(player_id)
    .bind(team_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::Precondition("player is not sold to this team".into()))?
    .unwrap_or(0);

    // 2) Clear assignment
    let player = sqlx::query_as::<_, Player>(&format!(
        "UPDATE players
            SET team_id = NULL, sold_price = NULL, updated_at = NOW()
          WHERE id = $1
          {PLAYER_RETURNING}"
    ))
    .bind(player_id)
    .fetch_one(&mut *tx)
    .await?;

    // 3) Refund
    let team = sqlx::query_as::<_, Team>(&format!(
        "UPDATE teams SET budget = budget + $2 WHERE id = $1 {TEAM_RETURNING}"
    ))
    .bind(team_id)
    .bind(refund)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(team) = team else {
        tx.rollback().await.ok();
        return Err(AppError::NotFound("team"));
    };

    tx.commit().await?;
    Ok((player, team))
}
