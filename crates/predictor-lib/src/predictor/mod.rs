//! Two-stage prediction engine

mod features;
mod handle;
mod inference;
mod scaling;
mod two_stage;


pub use features::align;
pub use handle::PredictorHandle;
pub use inference::{OnnxLoader, OnnxRegressor};
pub use scaling::Scaler;
pub use two_stage::{StageModel, TwoStagePredictor, PROPERTY_OUTPUTS};

use crate::error::PredictResult;

/// A trained regression function over a fixed-width input
///
/// Implementations are shared across request handlers, so `infer` must be
/// safe to call concurrently.
pub trait Regressor: Send + Sync {
    /// Run inference on one already-scaled row
    fn infer(&self, input: &[f64]) -> PredictResult<Vec<f64>>;
}

/// Turns raw model artifact bytes into a [`Regressor`]
pub trait ModelLoader {
    fn load(
        &self,
        name: &str,
        bytes: &[u8],
        input_width: usize,
    ) -> anyhow::Result<Box<dyn Regressor>>;
}
