use crate::ws::auction::ws_auction;
use actix_web::web;

/// Mount the WebSocket endpoint
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws/auction", web::get().to(ws_auction));
}
