//! One error type for every handler, repo and store call.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Request rejected before anything touched the store.
    #[error("{0}")]
    Validation(String),

    /// Local business rule failed (no team chosen, budget too small, ...).
    #[error("{0}")]
    Precondition(String),

    /// The store refused the write because of a constraint.
    #[error("{0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("database error")]
    Db(#[from] sqlx::Error),

    #[error("redis error")]
    Redis(#[from] redis::RedisError),

    #[error("storage error")]
    Storage(#[from] std::io::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Translate Postgres constraint violations into `Conflict`, pass anything
    /// else through as a database error.
    pub fn from_constraint(err: sqlx::Error, unique_msg: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some("23505") => return AppError::Conflict(unique_msg.to_string()),
                Some("23503") => {
                    return AppError::Conflict("record is still referenced".to_string())
                }
                Some("23514") => {
                    return AppError::Conflict("write would break a table check".to_string())
                }
                _ => {}
            }
        }
        AppError::Db(err)
    }

    /// True for failures of the store, identity backend or bucket.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AppError::Db(_) | AppError::Redis(_) | AppError::Storage(_) | AppError::Internal(_)
        )
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Precondition(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Db(_) | AppError::Redis(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_remote() {
            log::error!("request failed: {self:?}");
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
