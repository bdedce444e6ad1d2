use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::chart::{comparison_figure, market_figure, multi_market_figure, Figure};
use crate::error::{AppError, Result};
use crate::series::{
    build_multi_market_series, build_single_market_series, build_yoy_comparison, ComparisonSet,
    MultiMarketSeries, Series,
};
use crate::summary::{build_dashboard_summary, DashboardSummary};
use crate::types::{DerivativeRow, Granularity, MarketRow, RowsByMarket, SummaryByMarket};

#[derive(Clone)]
pub struct ApiState {
    pub max_rows_per_market: usize,
    pub latency: Arc<LatencyStats>,
    pub health: Arc<HealthState>,
}

impl ApiState {
    pub fn new(max_rows_per_market: usize) -> Self {
        Self {
            max_rows_per_market,
            latency: Arc::new(LatencyStats::new()),
            health: Arc::new(HealthState::new()),
        }
    }

    fn check_rows(&self, market: &str, rows: &[MarketRow]) -> Result<()> {
        if rows.len() > self.max_rows_per_market {
            warn!(
                market,
                rows = rows.len(),
                limit = self.max_rows_per_market,
                "rejecting oversized market"
            );
            return Err(AppError::TooManyRows {
                market: market.to_string(),
                rows: rows.len(),
                limit: self.max_rows_per_market,
            });
        }
        Ok(())
    }

    fn check_markets(&self, markets: &RowsByMarket) -> Result<()> {
        markets
            .iter()
            .try_for_each(|(market, rows)| self.check_rows(market, rows))
    }

    /// Record latency and outcome for one build.
    fn record_build(&self, endpoint: &'static str, started: Instant, produced: bool) {
        let elapsed = started.elapsed();
        self.latency.record(endpoint, elapsed);
        self.health.record_request(produced);
        debug!(
            endpoint,
            elapsed_us = elapsed.as_micros() as u64,
            empty = !produced,
            "build complete"
        );
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/series/market", post(series_market))
        .route("/series/multi", post(series_multi))
        .route("/series/yoy", post(series_yoy))
        .route("/charts/market", post(chart_market))
        .route("/charts/multi", post(chart_multi))
        .route("/charts/yoy", post(chart_yoy))
        .route("/dashboard/summary", post(dashboard_summary))
        .route("/health", get(get_health))
        .route("/stats/latency", get(get_stats_latency))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MarketRequest {
    pub market: String,
    #[serde(default)]
    pub time_label: String,
    pub is_quarterly: bool,
    #[serde(default)]
    pub rows: Vec<MarketRow>,
}

#[derive(Debug, Deserialize)]
pub struct MultiMarketRequest {
    #[serde(default)]
    pub time_label: String,
    pub is_quarterly: bool,
    #[serde(default)]
    pub markets: RowsByMarket,
}

#[derive(Debug, Deserialize)]
pub struct YoyRequest {
    #[serde(default)]
    pub current: SummaryByMarket,
    #[serde(default)]
    pub previous: SummaryByMarket,
    pub year: i32,
}

#[derive(Debug, Deserialize)]
pub struct DashboardRequest {
    pub primary_market: String,
    #[serde(default)]
    pub current: SummaryByMarket,
    #[serde(default)]
    pub previous: SummaryByMarket,
    #[serde(default)]
    pub derivatives: Vec<DerivativeRow>,
    #[serde(default)]
    pub total_market_volume_gwh: f64,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub uptime_secs: u64,
    pub requests_served: u64,
    pub empty_results: u64,
    pub build_p99_us: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct LatencyResponse {
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
    pub sample_count: u64,
    /// Keyed by handler name; endpoints with no builds yet are absent.
    pub endpoints: BTreeMap<&'static str, EndpointLatency>,
}

#[derive(Debug, Serialize)]
pub struct EndpointLatency {
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub sample_count: u64,
}

fn us_to_ms(us: u64) -> f64 {
    us as f64 / 1000.0
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn series_market(
    State(state): State<ApiState>,
    Json(req): Json<MarketRequest>,
) -> Result<Json<Option<Series>>> {
    state.check_rows(&req.market, &req.rows)?;
    let started = Instant::now();
    let granularity = Granularity::from_quarterly(req.is_quarterly);
    let series = build_single_market_series(&req.market, &req.rows, granularity);
    state.record_build("series_market", started, series.is_some());
    Ok(Json(series))
}

async fn series_multi(
    State(state): State<ApiState>,
    Json(req): Json<MultiMarketRequest>,
) -> Result<Json<Option<MultiMarketSeries>>> {
    state.check_markets(&req.markets)?;
    let started = Instant::now();
    let granularity = Granularity::from_quarterly(req.is_quarterly);
    let series = build_multi_market_series(&req.markets, granularity);
    state.record_build("series_multi", started, series.is_some());
    Ok(Json(series))
}

async fn series_yoy(
    State(state): State<ApiState>,
    Json(req): Json<YoyRequest>,
) -> Json<Option<ComparisonSet>> {
    let started = Instant::now();
    let set = build_yoy_comparison(&req.current, &req.previous, req.year);
    state.record_build("series_yoy", started, set.is_some());
    Json(set)
}

async fn chart_market(
    State(state): State<ApiState>,
    Json(req): Json<MarketRequest>,
) -> Result<Json<Option<Figure>>> {
    state.check_rows(&req.market, &req.rows)?;
    let started = Instant::now();
    let granularity = Granularity::from_quarterly(req.is_quarterly);
    let figure = market_figure(&req.market, &req.time_label, &req.rows, granularity);
    state.record_build("chart_market", started, figure.is_some());
    Ok(Json(figure))
}

async fn chart_multi(
    State(state): State<ApiState>,
    Json(req): Json<MultiMarketRequest>,
) -> Result<Json<Option<Figure>>> {
    state.check_markets(&req.markets)?;
    let started = Instant::now();
    let granularity = Granularity::from_quarterly(req.is_quarterly);
    let figure = multi_market_figure(&req.markets, &req.time_label, granularity);
    state.record_build("chart_multi", started, figure.is_some());
    Ok(Json(figure))
}

async fn chart_yoy(
    State(state): State<ApiState>,
    Json(req): Json<YoyRequest>,
) -> Json<Option<Figure>> {
    let started = Instant::now();
    let figure = comparison_figure(&req.current, &req.previous, req.year);
    state.record_build("chart_yoy", started, figure.is_some());
    Json(figure)
}

async fn dashboard_summary(
    State(state): State<ApiState>,
    Json(req): Json<DashboardRequest>,
) -> Json<DashboardSummary> {
    let started = Instant::now();
    let summary = build_dashboard_summary(
        &req.primary_market,
        &req.current,
        &req.previous,
        &req.derivatives,
        req.total_market_volume_gwh,
    );
    state.record_build("dashboard_summary", started, true);
    Json(summary)
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        uptime_secs: state.health.uptime_secs(),
        requests_served: state.health.requests_served(),
        empty_results: state.health.empty_results(),
        build_p99_us: state.latency.overall().map(|p| p.p99_us),
    })
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencyResponse> {
    let overall = state.latency.overall();
    let endpoints = state
        .latency
        .by_endpoint()
        .into_iter()
        .map(|(endpoint, p)| {
            let latency = EndpointLatency {
                p50_ms: us_to_ms(p.p50_us),
                p95_ms: us_to_ms(p.p95_us),
                p99_ms: us_to_ms(p.p99_us),
                sample_count: p.count,
            };
            (endpoint, latency)
        })
        .collect();
    Json(LatencyResponse {
        p50_ms: overall.map(|p| us_to_ms(p.p50_us)),
        p95_ms: overall.map(|p| us_to_ms(p.p95_us)),
        p99_ms: overall.map(|p| us_to_ms(p.p99_us)),
        sample_count: state.latency.len(),
        endpoints,
    })
}
