use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::AuctionCategory;
use crate::error::{AppError, AppResult};

const DUPLICATE_NAME: &str = "A category with this name already exists.";

#[derive(Debug, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub base_price: i64,
    /// Seconds per player; the table default (10) applies when omitted.
    pub timer: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub base_price: Option<i64>,
    pub timer: Option<i32>,
}

/// All categories, cheapest tier first.
pub async fn list_all(db: &PgPool) -> AppResult<Vec<AuctionCategory>> {
    Ok(sqlx::query_as::<_, AuctionCategory>(
        "SELECT id, name, base_price, timer, created_at
           FROM auction_categories
          ORDER BY base_price ASC",
    )
    .fetch_all(db)
    .await?)
}

pub async fn get(db: &PgPool, id: Uuid) -> AppResult<Option<AuctionCategory>> {
    Ok(sqlx::query_as::<_, AuctionCategory>(
        "SELECT id, name, base_price, timer, created_at
           FROM auction_categories
          WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await?)
}

/// Category lookup by its label, the value players carry in `rating`.
pub async fn get_by_name(db: &PgPool, name: &str) -> AppResult<Option<AuctionCategory>> {
    Ok(sqlx::query_as::<_, AuctionCategory>(
        "SELECT id, name, base_price, timer, created_at
           FROM auction_categories
          WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(db)
    .await?)
}

pub async fn create(db: &PgPool, new: &NewCategory) -> AppResult<AuctionCategory> {
    sqlx::query_as::<_, AuctionCategory>(
        "INSERT INTO auction_categories (name, base_price, timer)
         VALUES ($1, $2, COALESCE($3, 10))
         RETURNING id, name, base_price, timer, created_at",
    )
    .bind(new.name.trim())
    .bind(new.base_price)
    .bind(new.timer)
    .fetch_one(db)
    .await
    .map_err(|e| AppError::from_constraint(e, DUPLICATE_NAME))
}

pub async fn update(db: &PgPool, id: Uuid, patch: &CategoryPatch) -> AppResult<AuctionCategory> {
    sqlx::query_as::<_, AuctionCategory>(
        "UPDATE auction_categories
            SET name       = COALESCE($2, name),
                base_price = COALESCE($3, base_price),
                timer      = COALESCE($4, timer)
          WHERE id = $1
      RETURNING id, name, base_price, timer, created_at",
    )
    .bind(id)
    .bind(patch.name.as_deref().map(str::trim))
    .bind(patch.base_price)
    .bind(patch.timer)
    .fetch_optional(db)
    .await
    .map_err(|e| AppError::from_constraint(e, DUPLICATE_NAME))?
    .ok_or(AppError::NotFound("category"))
}

pub async fn delete(db: &PgPool, id: Uuid) -> AppResult<()> {
    let rows = sqlx::query("DELETE FROM auction_categories WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    if rows == 0 {
        Err(AppError::NotFound("category"))
    } else {
        Ok(())
    }
}

impl NewCategory {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("category name is required".into()));
        }
        if self.base_price < 0 {
            return Err(AppError::Validation("base price must be >= 0".into()));
        }
        if matches!(self.timer, Some(t) if t < 1) {
            return Err(AppError::Validation("timer must be at least 1 second".into()));
        }
        Ok(())
    }
}
