//! Observability infrastructure for the composite predictor
//!
//! Provides:
//! - Prometheus metrics (inference latency, prediction and error counts, artifact state)
//! - Structured JSON logging with tracing

use crate::artifacts::ArtifactManifest;
use crate::models::OptimalComposite;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, HistogramVec,
    IntCounterVec, IntGauge,
};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PredictorMetricsInner> = OnceLock::new();

struct PredictorMetricsInner {
    inference_latency_seconds: HistogramVec,
    predictions_total: IntCounterVec,
    prediction_errors_total: IntCounterVec,
    artifacts_loaded: IntGauge,
}

impl PredictorMetricsInner {
    fn new() -> Self {
        Self {
            inference_latency_seconds: register_histogram_vec!(
                "composite_predictor_inference_latency_seconds",
                "Time spent running model inference per prediction call",
                &["stage"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register inference_latency_seconds"),

            predictions_total: register_int_counter_vec!(
                "composite_predictor_predictions_total",
                "Total number of successful predictions",
                &["stage"]
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter_vec!(
                "composite_predictor_prediction_errors_total",
                "Total number of failed predictions by error kind",
                &["kind"]
            )
            .expect("Failed to register prediction_errors_total"),

            artifacts_loaded: register_int_gauge!(
                "composite_predictor_artifacts_loaded",
                "1 when the model artifacts are loaded, 0 otherwise"
            )
            .expect("Failed to register artifacts_loaded"),
        }
    }
}

/// Predictor metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct PredictorMetrics {
    _private: (),
}

impl Default for PredictorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictorMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PredictorMetricsInner {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new)
    }

    pub fn observe_inference_latency(&self, stage: &str, duration_secs: f64) {
        self.inner()
            .inference_latency_seconds
            .with_label_values(&[stage])
            .observe(duration_secs);
    }

    pub fn inc_predictions(&self, stage: &str) {
        self.inner().predictions_total.with_label_values(&[stage]).inc();
    }

    pub fn inc_prediction_errors(&self, kind: &str) {
        self.inner()
            .prediction_errors_total
            .with_label_values(&[kind])
            .inc();
    }

    pub fn set_artifacts_loaded(&self, loaded: bool) {
        self.inner().artifacts_loaded.set(i64::from(loaded));
    }
}

/// Structured logger for service events
///
/// Provides consistent JSON-formatted logging for predictions,
/// artifact loading and lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_startup(&self, version: &str, model_dir: &Path) {
        info!(
            event = "service_started",
            instance = %self.instance,
            version = %version,
            model_dir = %model_dir.display(),
            "Composite predictor started"
        );
    }

    pub fn log_artifacts_loaded(&self, manifest: &ArtifactManifest) {
        for entry in &manifest.files {
            info!(
                event = "artifacts_loaded",
                instance = %self.instance,
                file = %entry.file,
                size_bytes = entry.size_bytes,
                sha256 = %entry.sha256,
                "Artifact loaded"
            );
        }
    }

    pub fn log_artifact_load_failed(&self, model_dir: &Path, reason: &str) {
        error!(
            event = "artifact_load_failed",
            instance = %self.instance,
            model_dir = %model_dir.display(),
            reason = %reason,
            "Model artifacts failed to load; predictions are disabled"
        );
    }

    pub fn log_prediction(&self, result: &OptimalComposite, elapsed_ms: f64) {
        info!(
            event = "prediction_generated",
            instance = %self.instance,
            elastic_modulus = result.properties.elastic_modulus,
            tensile_strength = result.properties.tensile_strength,
            matrix_filler_ratio = result.ratio.matrix_filler_ratio,
            elapsed_ms = elapsed_ms,
            "Generated composite prediction"
        );
    }

    pub fn log_prediction_failed(&self, kind: &str, message: &str) {
        warn!(
            event = "prediction_failed",
            instance = %self.instance,
            kind = %kind,
            message = %message,
            "Prediction failed"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Composite predictor shutting down"
        );
    }
}
