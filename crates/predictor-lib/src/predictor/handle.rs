//! Shared, injectable access to a loaded predictor

use super::TwoStagePredictor;
use crate::error::{PredictError, PredictResult};
use crate::models::{FeatureVector, OptimalComposite, PropertyPrediction, RatioPrediction};
use crate::observability::PredictorMetrics;
use std::sync::Arc;
use std::time::Instant;

/// Cloneable handle passed to request handlers
///
/// Holds either a fully loaded [`TwoStagePredictor`] or the reason loading
/// failed. Every prediction on an unloaded handle returns
/// [`PredictError::ModelNotLoaded`].
#[derive(Clone)]
pub struct PredictorHandle {
    state: Arc<HandleState>,
    metrics: PredictorMetrics,
}

enum HandleState {
    Loaded(TwoStagePredictor),
    Unloaded { reason: String },
}

impl PredictorHandle {
    pub fn loaded(predictor: TwoStagePredictor) -> Self {
        Self::with_state(HandleState::Loaded(predictor))
    }

    pub fn unloaded(reason: impl Into<String>) -> Self {
        Self::with_state(HandleState::Unloaded {
            reason: reason.into(),
        })
    }

    /// Keep the service up after a failed load; predictions then report `ModelNotLoaded`
    pub fn from_load_result(result: PredictResult<TwoStagePredictor>) -> Self {
        match result {
            Ok(predictor) => Self::loaded(predictor),
            Err(e) => Self::unloaded(e.to_string()),
        }
    }

    fn with_state(state: HandleState) -> Self {
        let metrics = PredictorMetrics::new();
        metrics.set_artifacts_loaded(matches!(state, HandleState::Loaded(_)));
        Self {
            state: Arc::new(state),
            metrics,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(*self.state, HandleState::Loaded(_))
    }

    pub fn load_error(&self) -> Option<&str> {
        match &*self.state {
            HandleState::Loaded(_) => None,
            HandleState::Unloaded { reason } => Some(reason),
        }
    }

    pub fn predictor(&self) -> PredictResult<&TwoStagePredictor> {
        match &*self.state {
            HandleState::Loaded(p) => Ok(p),
            HandleState::Unloaded { .. } => Err(PredictError::ModelNotLoaded),
        }
    }

    pub fn predict_properties(&self, input: &FeatureVector) -> PredictResult<PropertyPrediction> {
        self.observed("properties", |p| p.predict_properties(input))
    }

    pub fn predict_ratio(&self, input: &FeatureVector) -> PredictResult<RatioPrediction> {
        self.observed("ratio", |p| p.predict_ratio(input))
    }

    pub fn predict_optimal(&self, input: &FeatureVector) -> PredictResult<OptimalComposite> {
        self.observed("optimal", |p| p.predict_optimal(input))
    }

    fn observed<T>(
        &self,
        operation: &str,
        f: impl FnOnce(&TwoStagePredictor) -> PredictResult<T>,
    ) -> PredictResult<T> {
        let start = Instant::now();
        let result = self.predictor().and_then(f);

        match &result {
            Ok(_) => {
                self.metrics
                    .observe_inference_latency(operation, start.elapsed().as_secs_f64());
                self.metrics.inc_predictions(operation);
            }
            Err(e) => self.metrics.inc_prediction_errors(e.kind()),
        }
        result
    }
}
