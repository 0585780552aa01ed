//! Player directory: CRUD, search and avatar upload.

use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::settings;
use crate::db::player_repo::{self, NewPlayer, PlayerPatch};
use crate::error::{AppError, AppResult};
use crate::http::auth::JwtAuth;
use crate::storage::{avatar_path, Bucket};

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Deserialize)]
pub struct UploadQuery {
    ext: Option<String>,
}

#[get("/players")]
pub async fn list(_auth: JwtAuth, db: web::Data<PgPool>) -> AppResult<HttpResponse> {
    let players = player_repo::list_all(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(players))
}

#[post("/players")]
pub async fn create(
    _auth: JwtAuth,
    body: web::Json<NewPlayer>,
    db: web::Data<PgPool>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    let player = player_repo::create(db.get_ref(), &body).await?;
    log::info!("player {} registered ({})", player.id, player.rating);
    Ok(HttpResponse::Created().json(player))
}

/// GET /api/players/search?q=
#[get("/players/search")]
pub async fn search(
    _auth: JwtAuth,
    query: web::Query<SearchQuery>,
    db: web::Data<PgPool>,
) -> AppResult<HttpResponse> {
    let players = player_repo::search(db.get_ref(), &query.q, settings().search_limit).await?;
    Ok(HttpResponse::Ok().json(players))
}

#[get("/players/{id}")]
pub async fn get_one(
    _auth: JwtAuth,
    path: web::Path<Uuid>,
    db: web::Data<PgPool>,
) -> AppResult<HttpResponse> {
    let player = player_repo::get(db.get_ref(), path.into_inner())
        .await?
        .ok_or(AppError::NotFound("player"))?;
    Ok(HttpResponse::Ok().json(player))
}

#[patch("/players/{id}")]
pub async fn update(
    _auth: JwtAuth,
    path: web::Path<Uuid>,
    body: web::Json<PlayerPatch>,
    db: web::Data<PgPool>,
) -> AppResult<HttpResponse> {
    let player = player_repo::update(db.get_ref(), path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(player))
}

#[delete("/players/{id}")]
pub async fn remove(
    _auth: JwtAuth,
    path: web::Path<Uuid>,
    db: web::Data<PgPool>,
) -> AppResult<HttpResponse> {
    player_repo::delete(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PUT /api/players/{id}/avatar?ext=png  (raw image body, overwrites)
#[put("/players/{id}/avatar")]
pub async fn upload_avatar(
    _auth: JwtAuth,
    path: web::Path<Uuid>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
    db: web::Data<PgPool>,
    bucket: web::Data<Bucket>,
) -> AppResult<HttpResponse> {
    if body.is_empty() {
        return Err(AppError::Validation("empty upload".into()));
    }
    let id = path.into_inner();
    let player = player_repo::get(db.get_ref(), id)
        .await?
        .ok_or(AppError::NotFound("player"))?;

    let object = avatar_path(
        &player.email,
        query.ext.as_deref().unwrap_or("png"),
        Utc::now().timestamp_millis(),
    );
    bucket.upload(&object, &body, true).await?;
    let url = bucket.public_url(&object)?;

    let player = player_repo::set_avatar(db.get_ref(), id, &url).await?;
    Ok(HttpResponse::Ok().json(player))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // `search` before `{id}`
    cfg.service(list)
        .service(create)
        .service(search)
        .service(get_one)
        .service(update)
        .service(remove)
        .service(upload_avatar);
}
