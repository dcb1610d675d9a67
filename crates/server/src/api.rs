//! HTTP API: prediction form, health checks and Prometheus metrics

use crate::form::{self, PredictResponse};
use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Json, Router,
};
use predictor_lib::{
    health::{ComponentStatus, HealthRegistry},
    PredictorHandle, StructuredLogger,
};
use prometheus::{Encoder, TextEncoder};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: PredictorHandle,
    pub health_registry: HealthRegistry,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        predictor: PredictorHandle,
        health_registry: HealthRegistry,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            predictor,
            health_registry,
            logger,
        }
    }
}

async fn index() -> Html<String> {
    Html(form::render_index())
}

/// Runs the two-stage prediction; failures are reported in the body with `success: false`
async fn predict(
    State(state): State<Arc<AppState>>,
    submitted: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Json<PredictResponse> {
    let start = Instant::now();

    let fields = match submitted {
        Ok(Form(fields)) => fields,
        Err(rejection) => {
            let message = rejection.body_text();
            state.logger.log_prediction_failed("invalid_form", &message);
            return Json(PredictResponse::failure(message));
        }
    };

    let input = match form::parse_form(&fields) {
        Ok(input) => input,
        Err(e) => {
            state.logger.log_prediction_failed("invalid_form", &e.to_string());
            return Json(PredictResponse::failure(e.to_string()));
        }
    };

    match state.predictor.predict_optimal(&input.to_features()) {
        Ok(result) => {
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            state.logger.log_prediction(&result, elapsed_ms);
            Json(PredictResponse::success(&result))
        }
        Err(e) => {
            state.logger.log_prediction_failed(e.kind(), &e.to_string());
            Json(PredictResponse::failure(e.to_string()))
        }
    }
}

/// 200 if healthy or degraded, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// 200 once the artifacts are loaded, 503 otherwise
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            e.to_string().into_bytes(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve(
    addr: &str,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
