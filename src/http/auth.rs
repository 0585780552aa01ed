//! Email/password authentication (JWT access + Redis refresh tokens)

use actix_web::{get, post, web, HttpResponse};
use redis::Client as RedisClient;
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::identity::{self, events::AuthEvents, Credentials, CurrentUser};

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

//////////////////////////////////////////////////
// ─────────────  JwtAuth extractor  ─────────────
//////////////////////////////////////////////////

pub mod extractor {
    use actix_web::{dev::Payload, FromRequest, HttpRequest};
    use futures_util::future::{ready, Ready};
    use uuid::Uuid;

    use crate::error::AppError;
    use crate::identity;

    /// Extracts and validates a Bearer-JWT.
    #[derive(Debug, Clone)]
    pub struct JwtAuth {
        pub user_id: Uuid,
        pub email: String,
    }

    impl JwtAuth {
        pub fn from_bearer(token: &str) -> Result<Self, AppError> {
            let user = identity::current_user(token)?;
            Ok(JwtAuth {
                user_id: user.id,
                email: user.email,
            })
        }
    }

    impl FromRequest for JwtAuth {
        type Error = AppError;
        type Future = Ready<Result<Self, Self::Error>>;

        fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
            let res = (|| {
                // Expect:  Authorization: Bearer <JWT>
                let hdr = req
                    .headers()
                    .get("Authorization")
                    .and_then(|v| v.to_str().ok())
                    .ok_or(AppError::Unauthorized("missing Authorization header"))?;

                let token = hdr
                    .strip_prefix("Bearer ")
                    .ok_or(AppError::Unauthorized("malformed Authorization header"))?;

                JwtAuth::from_bearer(token)
            })();

            ready(res)
        }
    }
}
pub use extractor::JwtAuth;

/// POST /api/auth/signup
#[post("/auth/signup")]
pub async fn signup(creds: web::Json<Credentials>, db: web::Data<PgPool>) -> AppResult<HttpResponse> {
    let user = identity::sign_up(db.get_ref(), &creds).await?;
    Ok(HttpResponse::Created().json(user))
}

/// POST /api/auth/signin
#[post("/auth/signin")]
pub async fn signin(
    creds: web::Json<Credentials>,
    db: web::Data<PgPool>,
    redis: web::Data<RedisClient>,
    events: web::Data<AuthEvents>,
) -> AppResult<HttpResponse> {
    let tokens = identity::sign_in(db.get_ref(), redis.get_ref(), events.get_ref(), &creds).await?;
    Ok(HttpResponse::Ok().json(tokens))
}

/// POST /api/auth/refresh
#[post("/auth/refresh")]
pub async fn refresh(
    body: web::Json<RefreshRequest>,
    db: web::Data<PgPool>,
    redis: web::Data<RedisClient>,
    events: web::Data<AuthEvents>,
) -> AppResult<HttpResponse> {
    let tokens = identity::refresh(
        db.get_ref(),
        redis.get_ref(),
        events.get_ref(),
        &body.refresh_token,
    )
    .await?;
    Ok(HttpResponse::Ok().json(tokens))
}

/// POST /api/auth/signout
#[post("/auth/signout")]
pub async fn signout(
    auth: JwtAuth,
    body: web::Json<RefreshRequest>,
    redis: web::Data<RedisClient>,
    events: web::Data<AuthEvents>,
) -> AppResult<HttpResponse> {
    identity::sign_out(
        redis.get_ref(),
        events.get_ref(),
        auth.user_id,
        &body.refresh_token,
    )
    .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/auth/me
#[get("/auth/me")]
pub async fn me(auth: JwtAuth) -> HttpResponse {
    HttpResponse::Ok().json(CurrentUser {
        id: auth.user_id,
        email: auth.email,
    })
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(signup)
        .service(signin)
        .service(refresh)
        .service(signout)
        .service(me);
}
