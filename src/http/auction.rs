//! Auctioneer commands. Every mutation is echoed to `/ws/auction` as well as
//! returned here.

use actix_web::{get, post, web, HttpResponse};
use redis::{AsyncCommands, Client as RedisClient};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auction::AuctionEngine;
use crate::error::AppResult;
use crate::http::auth::JwtAuth;

/// Redis key shared by every process serving the same league.
const LIVE_KEY: &str = "auction:live";

#[derive(Deserialize)]
pub struct SelectReq {
    index: i64,
}

#[derive(Deserialize)]
pub struct JumpReq {
    player_id: Uuid,
}

#[derive(Deserialize)]
pub struct TeamReq {
    team_id: Uuid,
}

#[derive(Deserialize)]
pub struct BidReq {
    delta: i64,
}

/// Both fields fall back to the selected team and the live bid.
#[derive(Deserialize, Default)]
pub struct SettleReq {
    team_id: Option<Uuid>,
    bid: Option<i64>,
}

#[derive(Serialize, Deserialize)]
pub struct LiveFlag {
    live: bool,
}

#[get("/auction")]
pub async fn snapshot(_auth: JwtAuth, engine: web::Data<AuctionEngine>) -> HttpResponse {
    HttpResponse::Ok().json(engine.snapshot().await)
}

#[post("/auction/reload")]
pub async fn reload(_auth: JwtAuth, engine: web::Data<AuctionEngine>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(engine.reload().await?))
}

#[post("/auction/select")]
pub async fn select(
    _auth: JwtAuth,
    body: web::Json<SelectReq>,
    engine: web::Data<AuctionEngine>,
) -> HttpResponse {
    HttpResponse::Ok().json(engine.select_player(body.index).await)
}

#[post("/auction/next")]
pub async fn next(_auth: JwtAuth, engine: web::Data<AuctionEngine>) -> HttpResponse {
    HttpResponse::Ok().json(engine.next_player().await)
}

#[post("/auction/prev")]
pub async fn prev(_auth: JwtAuth, engine: web::Data<AuctionEngine>) -> HttpResponse {
    HttpResponse::Ok().json(engine.prev_player().await)
}

#[post("/auction/jump")]
pub async fn jump(
    _auth: JwtAuth,
    body: web::Json<JumpReq>,
    engine: web::Data<AuctionEngine>,
) -> HttpResponse {
    HttpResponse::Ok().json(engine.jump_to_player(body.player_id).await)
}

#[post("/auction/team")]
pub async fn team(
    _auth: JwtAuth,
    body: web::Json<TeamReq>,
    engine: web::Data<AuctionEngine>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(engine.select_team(body.team_id).await?))
}

/// POST /api/auction/bid  `{"delta": 50000}`; `accepted: false` when the bid
/// would fall under the base price.
#[post("/auction/bid")]
pub async fn bid(
    _auth: JwtAuth,
    body: web::Json<BidReq>,
    engine: web::Data<AuctionEngine>,
) -> HttpResponse {
    HttpResponse::Ok().json(engine.adjust_bid(body.delta).await)
}

#[post("/auction/settle")]
pub async fn settle(
    auth: JwtAuth,
    body: Option<web::Json<SettleReq>>,
    engine: web::Data<AuctionEngine>,
) -> AppResult<HttpResponse> {
    let req = body.map(web::Json::into_inner).unwrap_or_default();
    let state = engine.settle(req.team_id, req.bid).await?;
    log::debug!("settle confirmed by {}", auth.email);
    Ok(HttpResponse::Ok().json(state))
}

#[post("/auction/release")]
pub async fn release(auth: JwtAuth, engine: web::Data<AuctionEngine>) -> AppResult<HttpResponse> {
    let state = engine.release().await?;
    log::debug!("release confirmed by {}", auth.email);
    Ok(HttpResponse::Ok().json(state))
}

/// GET /api/auction/teams/{id}/players  (roster as the auction sees it)
#[get("/auction/teams/{id}/players")]
pub async fn roster(
    _auth: JwtAuth,
    path: web::Path<Uuid>,
    engine: web::Data<AuctionEngine>,
) -> HttpResponse {
    HttpResponse::Ok().json(engine.team_roster(path.into_inner()).await)
}

#[get("/auction/live")]
pub async fn live(_auth: JwtAuth, redis: web::Data<RedisClient>) -> AppResult<HttpResponse> {
    let mut conn = redis.get_multiplexed_async_connection().await?;
    let flag: Option<String> = conn.get(LIVE_KEY).await?;
    Ok(HttpResponse::Ok().json(LiveFlag {
        live: flag.as_deref() == Some("true"),
    }))
}

#[post("/auction/live")]
pub async fn set_live(
    _auth: JwtAuth,
    body: web::Json<LiveFlag>,
    redis: web::Data<RedisClient>,
) -> AppResult<HttpResponse> {
    let mut conn = redis.get_multiplexed_async_connection().await?;
    let _: () = conn
        .set(LIVE_KEY, if body.live { "true" } else { "false" })
        .await?;
    log::info!("auction live = {}", body.live);
    Ok(HttpResponse::Ok().json(LiveFlag { live: body.live }))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(snapshot)
        .service(reload)
        .service(select)
        .service(next)
        .service(prev)
        .service(jump)
        .service(team)
        .service(bid)
        .service(settle)
        .service(release)
        .service(roster)
        .service(live)
        .service(set_live);
}
