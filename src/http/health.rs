//! Simple liveness / readiness probe

use actix_web::{get, web, HttpResponse, Responder};
use redis::{AsyncCommands, Client as RedisClient};
use sqlx::PgPool;

use crate::db;

#[get("/healthz")]
pub async fn healthz(pool: web::Data<PgPool>, redis: web::Data<RedisClient>) -> impl Responder {
    if let Err(e) = db::ping(pool.get_ref()).await {
        log::warn!("healthz: postgres unreachable: {e}");
        return HttpResponse::ServiceUnavailable().body("db");
    }

    let mut conn = match redis.get_multiplexed_async_connection().await {
        Ok(c) => c,
        Err(_) => return HttpResponse::ServiceUnavailable().body("redis"),
    };
    if conn.ping::<String>().await.is_err() {
        return HttpResponse::ServiceUnavailable().body("redis");
    }

    HttpResponse::Ok().body("ok")
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(healthz);
}
