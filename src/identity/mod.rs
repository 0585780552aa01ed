//! Email/password identity provider: accounts in Postgres, refresh tokens in
//! Redis, short-lived JWT access tokens.

pub mod events;
pub mod password;
pub mod token;

use redis::{AsyncCommands, Client as RedisClient};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::settings;
use crate::db::user_repo;
use crate::error::{AppError, AppResult};
use events::{AuthEvent, AuthEvents};

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

fn refresh_key(token: &str) -> String {
    format!("refresh:{token}")
}

fn jwt_secret() -> AppResult<&'static str> {
    require_secret(settings().jwt_secret.as_deref())
}

/// A missing secret is a server fault, not a bad credential.
fn require_secret(secret: Option<&str>) -> AppResult<&str> {
    secret.ok_or_else(|| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))
}

impl Credentials {
    pub fn validate(&self) -> AppResult<()> {
        if !self.email.contains('@') {
            return Err(AppError::Validation("a valid email is required".into()));
        }
        if self.password.chars().count() < 6 {
            return Err(AppError::Validation(
                "password must be at least 6 characters".into(),
            ));
        }
        Ok(())
    }

    fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

pub async fn sign_up(db: &PgPool, creds: &Credentials) -> AppResult<CurrentUser> {
    creds.validate()?;
    let hash = password::hash_password(&creds.password)?;
    let user = user_repo::insert(db, &creds.normalized_email(), &hash).await?;
    log::info!("registered user {}", user.id);
    Ok(CurrentUser {
        id: user.id,
        email: user.email,
    })
}

pub async fn sign_in(
    db: &PgPool,
    redis: &RedisClient,
    events: &AuthEvents,
    creds: &Credentials,
) -> AppResult<TokenResponse> {
    let user = user_repo::by_email(db, &creds.normalized_email())
        .await?
        .filter(|u| password::verify_password(&creds.password, &u.password_hash))
        .ok_or(AppError::Unauthorized("invalid email or password"))?;

    let tokens = mint_tokens(redis, user.id, &user.email).await?;
    events.emit(AuthEvent::SignedIn { user_id: user.id });
    Ok(tokens)
}

/// Consume a refresh token and hand out a fresh pair.
pub async fn refresh(
    db: &PgPool,
    redis: &RedisClient,
    events: &AuthEvents,
    refresh_token: &str,
) -> AppResult<TokenResponse> {
    let mut conn = redis.get_multiplexed_async_connection().await?;
    let key = refresh_key(refresh_token);
    let uid: Option<String> = conn.get(&key).await?;
    let uid = uid.ok_or(AppError::Unauthorized("invalid refresh"))?;
    let _: () = conn.del(&key).await?;

    let user_id = Uuid::parse_str(&uid).map_err(|_| AppError::Unauthorized("invalid refresh"))?;
    let user = user_repo::by_id(db, user_id)
        .await?
        .ok_or(AppError::Unauthorized("account no longer exists"))?;

    let tokens = mint_tokens(redis, user.id, &user.email).await?;
    events.emit(AuthEvent::TokenRefreshed { user_id: user.id });
    Ok(tokens)
}

/// Revoke the refresh token. Access tokens simply run out.
pub async fn sign_out(
    redis: &RedisClient,
    events: &AuthEvents,
    user_id: Uuid,
    refresh_token: &str,
) -> AppResult<()> {
    let mut conn = redis.get_multiplexed_async_connection().await?;
    let _: () = conn.del(refresh_key(refresh_token)).await?;
    events.emit(AuthEvent::SignedOut { user_id });
    Ok(())
}

async fn mint_tokens(redis: &RedisClient, user_id: Uuid, email: &str) -> AppResult<TokenResponse> {
    let s = settings();
    let access_token = token::issue(jwt_secret()?, user_id, email, s.access_token_ttl)?;

    let refresh_token = Uuid::new_v4().to_string();
    let mut conn = redis.get_multiplexed_async_connection().await?;
    let _: () = conn
        .set_ex(refresh_key(&refresh_token), user_id.to_string(), s.refresh_token_ttl)
        .await?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        expires_in: s.access_token_ttl,
    })
}

/// Resolve a bearer token into the signed-in user.
pub fn current_user(bearer: &str) -> AppResult<CurrentUser> {
    let (id, email) = token::verify(jwt_secret()?, bearer)?;
    Ok(CurrentUser { id, email })
}
