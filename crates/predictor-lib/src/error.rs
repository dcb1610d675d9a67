//! Error taxonomy for the prediction core

use std::fmt;
use std::path::PathBuf;

/// Which stage of the two-stage pipeline an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Properties,
    Ratio,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Properties => "properties",
            Stage::Ratio => "ratio",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the prediction core
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    /// One or more artifacts missing or corrupt at construction
    #[error("Failed to load model artifacts from {}: {reason}", dir.display())]
    ArtifactLoad { dir: PathBuf, reason: String },

    /// Prediction invoked on a handle whose artifacts never loaded
    #[error("Model is not loaded")]
    ModelNotLoaded,

    /// Input lacks required features; carries every missing name
    #[error("Missing required features for {stage} model: {}", missing.join(", "))]
    MissingFeatures { stage: Stage, missing: Vec<String> },

    /// Numeric computation failed (shape mismatch, backend error, non-finite output)
    #[error("Inference failed: {0}")]
    Inference(String),
}

impl PredictError {
    /// Stable label for branching and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::ArtifactLoad { .. } => "artifact_load",
            PredictError::ModelNotLoaded => "model_not_loaded",
            PredictError::MissingFeatures { .. } => "missing_features",
            PredictError::Inference(_) => "inference",
        }
    }

    pub(crate) fn inference(msg: impl Into<String>) -> Self {
        PredictError::Inference(msg.into())
    }
}

pub type PredictResult<T> = Result<T, PredictError>;
