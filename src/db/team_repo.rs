use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::Team;
use crate::error::{AppError, AppResult};

const TEAM_CONFLICT: &str = "team conflicts with an existing record";
const STILL_OWNS_PLAYERS: &str = "team still owns sold players; release them first";

#[derive(Debug, Deserialize)]
pub struct NewTeam {
    pub name: String,
    pub captain: Option<String>,
    pub budget: i64,
    pub logo_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TeamPatch {
    pub name: Option<String>,
    pub captain: Option<String>,
    pub budget: Option<i64>,
    pub logo_url: Option<String>,
}

pub async fn list_all(db: &PgPool) -> AppResult<Vec<Team>> {
    Ok(sqlx::query_as::<_, Team>(
        "SELECT id, name, captain, budget, logo_url, created_at
           FROM teams
          ORDER BY name ASC",
    )
    .fetch_all(db)
    .await?)
}

pub async fn get(db: &PgPool, id: Uuid) -> AppResult<Option<Team>> {
    Ok(sqlx::query_as::<_, Team>(
        "SELECT id, name, captain, budget, logo_url, created_at
           FROM teams
          WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await?)
}

pub async fn create(db: &PgPool, new: &NewTeam) -> AppResult<Team> {
    sqlx::query_as::<_, Team>(
        "INSERT INTO teams (name, captain, budget, logo_url)
         VALUES ($1, $2, $3, $4)
         RETURNING id, name, captain, budget, logo_url, created_at",
    )
    .bind(new.name.trim())
    .bind(new.captain.as_deref().filter(|c| !c.trim().is_empty()))
    .bind(new.budget)
    .bind(new.logo_url.as_deref())
    .fetch_one(db)
    .await
    .map_err(|e| AppError::from_constraint(e, TEAM_CONFLICT))
}

pub async fn update(db: &PgPool, id: Uuid, patch: &TeamPatch) -> AppResult<Team> {
    sqlx::query_as::<_, Team>(
        "UPDATE teams
            SET name     = COALESCE($2, name),
                captain  = COALESCE($3, captain),
                budget   = COALESCE($4, budget),
                logo_url = COALESCE($5, logo_url)
          WHERE id = $1
      RETURNING id, name, captain, budget, logo_url, created_at",
    )
    .bind(id)
    .bind(patch.name.as_deref().map(str::trim))
    .bind(patch.captain.as_deref())
    .bind(patch.budget)
    .bind(patch.logo_url.as_deref())
    .fetch_optional(db)
    .await
    .map_err(|e| AppError::from_constraint(e, TEAM_CONFLICT))?
    .ok_or(AppError::NotFound("team"))
}

/// Hard delete. Fails with `Conflict` while sold players still point at it.
pub async fn delete(db: &PgPool, id: Uuid) -> AppResult<()> {
    let rows = sqlx::query("DELETE FROM teams WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .map_err(|e| match AppError::from_constraint(e, TEAM_CONFLICT) {
            AppError::Conflict(_) => AppError::Conflict(STILL_OWNS_PLAYERS.into()),
            other => other,
        })?
        .rows_affected();

    if rows == 0 {
        Err(AppError::NotFound("team"))
    } else {
        Ok(())
    }
}

impl NewTeam {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("team name is required".into()));
        }
        if self.budget < 0 {
            return Err(AppError::Validation("budget must be >= 0".into()));
        }
        Ok(())
    }
}

impl TeamPatch {
    pub fn validate(&self) -> AppResult<()> {
        if matches!(self.budget, Some(b) if b < 0) {
            return Err(AppError::Validation("budget must be >= 0".into()));
        }
        Ok(())
    }
}
