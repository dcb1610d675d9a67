//! Prediction library for composite material design
//!
//! This crate provides the core functionality for:
//! - Loading model artifacts (ONNX models, feature lists, fitted scalers)
//! - Feature alignment and scaling
//! - Two-stage inference: mechanical properties, then matrix-to-filler ratio
//! - Health checks and observability

pub mod artifacts;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;

#[cfg(test)]
mod test_support;

pub use artifacts::{ArtifactFile, ArtifactManifest, ArtifactStore};
pub use error::{PredictError, PredictResult, Stage};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{PredictorMetrics, StructuredLogger};
pub use predictor::{PredictorHandle, TwoStagePredictor};
