use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::User;
use crate::error::{AppError, AppResult};

pub async fn insert(db: &PgPool, email: &str, password_hash: &str) -> AppResult<User> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password_hash)
         VALUES ($1, $2)
         RETURNING id, email, password_hash, created_at",
    )
    .bind(email)
    .bind(password_hash)
    .fetch_one(db)
    .await
    .map_err(|e| AppError::from_constraint(e, "an account with this email already exists"))
}

pub async fn by_email(db: &PgPool, email: &str) -> AppResult<Option<User>> {
    Ok(sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(db)
    .await?)
}

pub async fn by_id(db: &PgPool, id: Uuid) -> AppResult<Option<User>> {
    Ok(sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await?)
}
