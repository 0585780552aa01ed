//! Auction categories: price tiers and bid timers.

use actix_web::{delete, get, patch, post, web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::category_repo::{self, CategoryPatch, NewCategory};
use crate::error::{AppError, AppResult};
use crate::http::auth::JwtAuth;

#[get("/categories")]
pub async fn list(_auth: JwtAuth, db: web::Data<PgPool>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(category_repo::list_all(db.get_ref()).await?))
}

#[post("/categories")]
pub async fn create(
    _auth: JwtAuth,
    body: web::Json<NewCategory>,
    db: web::Data<PgPool>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    let category = category_repo::create(db.get_ref(), &body).await?;
    Ok(HttpResponse::Created().json(category))
}

#[get("/categories/{id}")]
pub async fn get_one(
    _auth: JwtAuth,
    path: web::Path<Uuid>,
    db: web::Data<PgPool>,
) -> AppResult<HttpResponse> {
    let category = category_repo::get(db.get_ref(), path.into_inner())
        .await?
        .ok_or(AppError::NotFound("category"))?;
    Ok(HttpResponse::Ok().json(category))
}

#[patch("/categories/{id}")]
pub async fn update(
    _auth: JwtAuth,
    path: web::Path<Uuid>,
    body: web::Json<CategoryPatch>,
    db: web::Data<PgPool>,
) -> AppResult<HttpResponse> {
    let category = category_repo::update(db.get_ref(), path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(category))
}

#[delete("/categories/{id}")]
pub async fn remove(
    _auth: JwtAuth,
    path: web::Path<Uuid>,
    db: web::Data<PgPool>,
) -> AppResult<HttpResponse> {
    category_repo::delete(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(create)
        .service(get_one)
        .service(update)
        .service(remove);
}
