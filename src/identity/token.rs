//! Access-token minting and checking (HS256 JWT).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub exp: usize,
}

pub fn issue(secret: &str, user_id: Uuid, email: &str, ttl_secs: u64) -> Result<String, AppError> {
    let exp = (Utc::now() + Duration::seconds(ttl_secs as i64)).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT encode failed: {e}")))
}

/// Validate signature and expiry, returning the user id and email.
pub fn verify(secret: &str, token: &str) -> Result<(Uuid, String), AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("invalid / expired token"))?;

    let user_id =
        Uuid::parse_str(&data.claims.sub).map_err(|_| AppError::Unauthorized("bad sub"))?;
    Ok((user_id, data.claims.email))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_with_same_secret_only() {
        let uid = Uuid::new_v4();
        let tok = issue("s3cret", uid, "ops@league.test", 60).unwrap();

        let (got, email) = verify("s3cret", &tok).unwrap();
        assert_eq!(got, uid);
        assert_eq!(email, "ops@league.test");

        assert!(matches!(verify("other", &tok), Err(AppError::Unauthorized(_))));
    }
}
