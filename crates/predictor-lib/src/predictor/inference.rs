//! ONNX inference using tract
//!
//! Provides lightweight inference for the exported regression models. Each
//! model is compiled once for a single-row `[1, n_features]` f32 input.

use super::{ModelLoader, Regressor};
use crate::error::{PredictError, PredictResult};
use anyhow::{Context, Result};
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Inference latency above which a warning is logged
const MAX_INFERENCE_MS: u128 = 50;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX-backed regressor
pub struct OnnxRegressor {
    name: String,
    model: TractModel,
    input_width: usize,
}

impl OnnxRegressor {
    /// Parse and optimize an ONNX model for a fixed input width
    pub fn from_bytes(name: &str, model_bytes: &[u8], input_width: usize) -> Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .with_context(|| format!("Failed to parse ONNX model {}", name))?
            .with_input_fact(0, f32::fact([1, input_width]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;

        Ok(Self {
            name: name.to_string(),
            model,
            input_width,
        })
    }

    fn to_tensor(&self, input: &[f64]) -> PredictResult<Tensor> {
        let data: Vec<f32> = input.iter().map(|v| *v as f32).collect();
        Tensor::from_shape(&[1, self.input_width], &data)
            .map_err(|e| PredictError::inference(format!("{}: {}", self.name, e)))
    }
}

impl Regressor for OnnxRegressor {
    fn infer(&self, input: &[f64]) -> PredictResult<Vec<f64>> {
        if input.len() != self.input_width {
            return Err(PredictError::inference(format!(
                "{} expects {} inputs, got {}",
                self.name,
                self.input_width,
                input.len()
            )));
        }

        let start = Instant::now();
        let tensor = self.to_tensor(input)?;

        let result = self
            .model
            .run(tvec!(tensor.into()))
            .map_err(|e| PredictError::inference(format!("{}: {:#}", self.name, e)))?;
        let output = result
            .first()
            .ok_or_else(|| {
                PredictError::inference(format!("{}: no output from model", self.name))
            })?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| PredictError::inference(format!("{}: {}", self.name, e)))?;
        let values: Vec<f64> = view.iter().map(|v| *v as f64).collect();

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(
                model = %self.name,
                elapsed_ms = elapsed.as_millis(),
                "Inference exceeded {}ms target",
                MAX_INFERENCE_MS
            );
        } else {
            debug!(model = %self.name, elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        Ok(values)
    }
}

/// Compiles model artifacts with tract-onnx
#[derive(Debug, Clone, Copy, Default)]
pub struct OnnxLoader;

impl ModelLoader for OnnxLoader {
    fn load(&self, name: &str, bytes: &[u8], input_width: usize) -> Result<Box<dyn Regressor>> {
        Ok(Box::new(OnnxRegressor::from_bytes(name, bytes, input_width)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_fail_to_load() {
        let err = OnnxLoader
            .load("composite_properties_model", b"not an onnx model", 10)
            .err()
            .expect("garbage must not parse");
        assert!(format!("{:#}", err).contains("composite_properties_model"));
    }
}
