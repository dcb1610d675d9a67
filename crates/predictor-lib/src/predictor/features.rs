//! Feature alignment for ML inference
//!
//! Selects the values a model expects from a named feature vector and lays
//! them out in the model's training column order.

use crate::error::{PredictError, Stage};
use crate::models::{FeatureList, FeatureVector};

/// Order `input` by `features`, failing with every absent name at once
pub fn align(
    stage: Stage,
    input: &FeatureVector,
    features: &FeatureList,
) -> Result<Vec<f64>, PredictError> {
    let mut values = Vec::with_capacity(features.len());
    let mut missing = Vec::new();

    for name in features.iter() {
        match input.get(name) {
            Some(v) => values.push(v),
            None => missing.push(name.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(PredictError::MissingFeatures { stage, missing });
    }
    Ok(values)
}
