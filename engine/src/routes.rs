use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{sync::Arc, time::Instant};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    engine::PhishingEngine,
    error::AppError,
    record::FeatureRecord,
    types::{HealthResponse, PredictRequest, PredictResponse},
};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PhishingEngine>,
    pub metrics: Option<PrometheusHandle>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/predict/", post(predict))
        .route("/features", post(features))
        .route("/features/", post(features))
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, AppError> {
    let start = Instant::now();
    metrics::counter!("phishguard_requests_total").increment(1);

    let result = state.engine.score_url(&request.url);

    metrics::histogram!("phishguard_request_duration_ms").record(start.elapsed().as_secs_f64() * 1000.0);

    match result {
        Ok(response) => {
            info!(
                "Scored {} -> prediction {}, risk {:.2}",
                response.url, response.prediction, response.risk_score
            );
            Ok(Json(response))
        }
        Err(e) => {
            metrics::counter!("phishguard_errors_total", "kind" => e.kind()).increment(1);
            Err(e)
        }
    }
}

async fn features(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<FeatureRecord>, AppError> {
    let record = state.engine.features(&request.url)?;
    Ok(Json(record))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_version: state.engine.model_version().to_string(),
        known_tlds: state.engine.known_tlds().len(),
    })
}

async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}
