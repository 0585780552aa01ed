use crate::{http, metrics};
use actix_web::web;

/// Mount every HTTP sub-module under `/api`.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(http::auth::init_routes)
            .configure(http::players::init_routes)
            .configure(http::teams::init_routes)
            .configure(http::categories::init_routes)
            .configure(http::auction::init_routes)
            .configure(http::health::init_routes),
    )
    .configure(http::media::init_routes)
    .service(metrics::auction_metrics);
}
