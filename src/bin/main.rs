use std::{env, sync::Arc};

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use league_auction::{
    auction::{AuctionDefaults, AuctionEngine, PgStore},
    http,
    identity::events::{spawn_logger, AuthEvents},
    metrics,
    storage::Bucket,
    ws,
};
use redis::Client as RedisClient;
use sqlx::postgres::PgPoolOptions;

/// Largest accepted avatar / logo upload.
const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    // Configuration
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".into());
    let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into());

    // Postgres pool + schema
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to create Postgres pool")?;
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("failed to run migrations")?;

    // Redis client
    let redis_client = RedisClient::open(redis_url.as_str()).context("invalid REDIS_URL")?;

    let bucket = Bucket::from_settings()?;

    let auth_events = AuthEvents::new();
    spawn_logger(auth_events.subscribe());

    // One auction session per process
    let engine = AuctionEngine::new(
        Arc::new(PgStore::new(db_pool.clone())),
        AuctionDefaults::from_settings(),
    );
    if let Err(e) = engine.reload().await {
        log::warn!("auction not loaded at start-up, use /api/auction/reload: {e}");
    }
    let engine = web::Data::from(engine);

    log::info!("listening on {server_addr}");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(metrics::METRICS.clone())
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(redis_client.clone()))
            .app_data(web::Data::new(bucket.clone()))
            .app_data(web::Data::new(auth_events.clone()))
            .app_data(engine.clone())
            .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
            .configure(http::routes::init_routes)
            .configure(ws::routes::init_routes)
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
