pub mod aggregator;

pub use aggregator::{Aggregated, Aggregator};

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use opentelemetry::metrics::{Counter, MeterProvider};
use opentelemetry_prometheus::exporter;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};
use serde::Deserialize;
use wxfuse_core::catalog;

pub struct AppState {
    ready: AtomicBool,
    registry: Registry,
    #[allow(dead_code)]
    provider: SdkMeterProvider,
    requests_total: Counter<u64>,
    cache_hits_total: Counter<u64>,
    aggregator: Aggregator,
}

pub fn build_app(aggregator: Aggregator) -> Result<(Router, Arc<AppState>)> {
    // Prometheus exporter via OpenTelemetry
    let registry = Registry::new();
    let reader = exporter()
        .with_registry(registry.clone())
        .build()
        .context("failed to build prometheus exporter")?;
    let provider = SdkMeterProvider::builder().with_reader(reader).build();
    let meter = provider.meter("wxfuse");

    let requests_total = meter
        .u64_counter("wxfuse_requests_total")
        .with_description("Total HTTP requests served")
        .init();
    let cache_hits_total = meter
        .u64_counter("wxfuse_cache_hits_total")
        .with_description("Weather requests answered from the disk cache")
        .init();

    let state = Arc::new(AppState {
        ready: AtomicBool::new(false),
        registry,
        provider,
        requests_total,
        cache_hits_total,
        aggregator,
    });

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/weather", get(weather))
        .route("/api/v1/fields", get(fields))
        .with_state(Arc::clone(&state));

    Ok((router, state))
}

pub fn set_ready(state: &Arc<AppState>, is_ready: bool) {
    state.ready.store(is_ready, Ordering::Relaxed);
}

async fn healthz(State(state): State<Arc<AppState>>) -> StatusCode {
    state.requests_total.add(1, &[]);
    StatusCode::OK
}

async fn readyz(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::warn!(error=?e, "failed to encode metrics");
    }
    let body = String::from_utf8(buf).unwrap_or_default();
    (
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
        )],
        body,
    )
}

#[derive(Deserialize)]
struct WeatherQuery {
    lat: f64,
    lon: f64,
}

// A malformed query string is rejected with 400 by the extractor
async fn weather(
    State(state): State<Arc<AppState>>,
    Query(q): Query<WeatherQuery>,
) -> impl IntoResponse {
    state.requests_total.add(1, &[]);

    let aggregated = state.aggregator.aggregate(q.lat, q.lon).await;
    if aggregated.cached {
        state.cache_hits_total.add(1, &[]);
    }

    (StatusCode::OK, Json(aggregated.record))
}

/// Plain-text table of the field catalog
pub fn fields_table() -> String {
    let mut out = format!("{:<12} {:<15} {:<7} {}\n", "SECTION", "FIELD", "UNIT", "DESCRIPTION");
    for field in catalog() {
        out.push_str(&format!(
            "{:<12} {:<15} {:<7} {}\n",
            field.section.name(),
            field.name,
            field.unit.symbol(),
            field.description
        ));
    }
    out
}

async fn fields(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.requests_total.add(1, &[]);
    Json(catalog())
}
