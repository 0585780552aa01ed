//! Prometheus metrics & middleware helper.

use actix_web::{get, HttpResponse, Responder};
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use once_cell::sync::Lazy;
use prometheus::{IntCounter, Registry, TextEncoder};

/// HTTP request metrics, served at `/metrics`.
pub static METRICS: Lazy<PrometheusMetrics> = Lazy::new(|| {
    PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .build()
        .expect("metrics builder")
});

pub struct AuctionMetrics {
    registry: Registry,
    pub settlements: IntCounter,
    pub releases: IntCounter,
    pub store_failures: IntCounter,
}

/// Auction counters, kept in their own registry and served at
/// `/auction-metrics`.
pub static AUCTION: Lazy<AuctionMetrics> = Lazy::new(|| {
    let registry = Registry::new();
    let counter = |name: &str, help: &str| {
        let c = IntCounter::new(name, help).expect("valid counter");
        registry
            .register(Box::new(c.clone()))
            .expect("unique counter");
        c
    };
    let settlements = counter("auction_settlements_total", "Players sold");
    let releases = counter("auction_releases_total", "Sales undone");
    let store_failures = counter(
        "auction_store_failures_total",
        "Auction reads or writes the record store refused",
    );
    AuctionMetrics {
        registry,
        settlements,
        releases,
        store_failures,
    }
});

impl AuctionMetrics {
    pub fn render(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

#[get("/auction-metrics")]
pub async fn auction_metrics() -> impl Responder {
    match AUCTION.render() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => {
            log::error!("metrics encode failed: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
