use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::config::{ReportConfig, Thresholds};
use crate::models::{Opportunity, OpportunityKind};
use crate::services::{score_and_rank, DashboardSummary, ObservationCollector};

pub struct AppState {
    pub collector: Arc<ObservationCollector>,
    pub thresholds: Thresholds,
    pub report: ReportConfig,
    pub refresh_secs: u64,
}

impl AppState {
    /// Fresh collection and ranking; nothing is reused between requests.
    pub async fn hunt(&self) -> Vec<Opportunity> {
        let collection = self.collector.collect_all().await;
        score_and_rank(&collection.observations, &self.thresholds)
    }
}

#[derive(Debug, Deserialize)]
struct OpportunityQuery {
    limit: Option<usize>,
    kind: Option<String>,
    min_confidence: Option<f64>,
}

/// GET /api/opportunities
async fn get_opportunities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OpportunityQuery>,
) -> Result<Json<Vec<Opportunity>>, ApiError> {
    let kind = match params.kind.as_deref() {
        Some(name) => Some(
            OpportunityKind::parse(name)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown opportunity kind: {}", name)))?,
        ),
        None => None,
    };
    let min_confidence = params.min_confidence.unwrap_or(0.0);
    if !(0.0..=1.0).contains(&min_confidence) {
        return Err(ApiError::BadRequest("min_confidence must be within [0, 1]".to_string()));
    }

    let opportunities: Vec<Opportunity> = state.hunt()
        .await
        .into_iter()
        .filter(|o| kind.map_or(true, |k| o.kind == k))
        .filter(|o| o.confidence >= min_confidence)
        .take(params.limit.unwrap_or(usize::MAX))
        .collect();

    Ok(Json(opportunities))
}

/// GET /api/stats
async fn get_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let opportunities = state.hunt().await;
    let summary = DashboardSummary::from_opportunities(&opportunities, state.report.position_usd);
    let stats = state.collector.get_stats();

    Json(json!({
        "summary": summary,
        "sources": state.collector.source_names(),
        "total_requests": stats.total_requests.load(Ordering::Relaxed),
        "successful": stats.successful.load(Ordering::Relaxed),
        "failed": stats.failed.load(Ordering::Relaxed),
        "observations_collected": stats.observations_collected.load(Ordering::Relaxed),
    }))
}

/// GET /health
async fn health() -> &'static str {
    "OK"
}

pub fn create_rest_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/opportunities", get(get_opportunities))
        .route("/api/stats", get(get_stats))
        .route("/health", get(health))
        .route("/ws", get(super::websocket::ws_handler))
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
