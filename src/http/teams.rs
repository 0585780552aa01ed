//! Team registry: CRUD, roster lookup and logo upload.

use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{
    player_repo,
    team_repo::{self, NewTeam, TeamPatch},
};
use crate::error::{AppError, AppResult};
use crate::http::auth::JwtAuth;
use crate::storage::{team_logo_path, Bucket};

#[derive(Deserialize)]
pub struct UploadQuery {
    ext: Option<String>,
}

#[get("/teams")]
pub async fn list(_auth: JwtAuth, db: web::Data<PgPool>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(team_repo::list_all(db.get_ref()).await?))
}

#[post("/teams")]
pub async fn create(
    _auth: JwtAuth,
    body: web::Json<NewTeam>,
    db: web::Data<PgPool>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    let team = team_repo::create(db.get_ref(), &body).await?;
    log::info!("team {} created with budget {}", team.name, team.budget);
    Ok(HttpResponse::Created().json(team))
}

#[get("/teams/{id}")]
pub async fn get_one(
    _auth: JwtAuth,
    path: web::Path<Uuid>,
    db: web::Data<PgPool>,
) -> AppResult<HttpResponse> {
    let team = team_repo::get(db.get_ref(), path.into_inner())
        .await?
        .ok_or(AppError::NotFound("team"))?;
    Ok(HttpResponse::Ok().json(team))
}

#[patch("/teams/{id}")]
pub async fn update(
    _auth: JwtAuth,
    path: web::Path<Uuid>,
    body: web::Json<TeamPatch>,
    db: web::Data<PgPool>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    let team = team_repo::update(db.get_ref(), path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(team))
}

#[delete("/teams/{id}")]
pub async fn remove(
    _auth: JwtAuth,
    path: web::Path<Uuid>,
    db: web::Data<PgPool>,
) -> AppResult<HttpResponse> {
    team_repo::delete(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/teams/{id}/players
#[get("/teams/{id}/players")]
pub async fn roster(
    _auth: JwtAuth,
    path: web::Path<Uuid>,
    db: web::Data<PgPool>,
) -> AppResult<HttpResponse> {
    let players = player_repo::list_by_team(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(players))
}

/// PUT /api/teams/{id}/logo?ext=png  (raw image body, never overwrites)
#[put("/teams/{id}/logo")]
pub async fn upload_logo(
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
    let team = team_repo::get(db.get_ref(), id)
        .await?
        .ok_or(AppError::NotFound("team"))?;

    let object = team_logo_path(
        &team.name,
        query.ext.as_deref().unwrap_or("png"),
        Utc::now().timestamp_millis(),
    );
    bucket.upload(&object, &body, false).await?;

    let patch = TeamPatch {
        logo_url: Some(bucket.public_url(&object)?),
        ..TeamPatch::default()
    };
    let team = team_repo::update(db.get_ref(), id, &patch).await?;
    Ok(HttpResponse::Ok().json(team))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(create)
        .service(get_one)
        .service(update)
        .service(remove)
        .service(roster)
        .service(upload_logo);
}
