//! In-memory models and artifact fixtures for unit tests

use crate::error::{PredictError, PredictResult};
use crate::models::columns;
use crate::predictor::{ModelLoader, Regressor};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// `y = W x + b`
pub struct LinearRegressor {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub calls: Arc<AtomicUsize>,
}

impl LinearRegressor {
    /// Every output is the mean of the inputs plus its own bias
    pub fn averaging(input_width: usize, bias: Vec<f64>) -> Self {
        let w = 1.0 / input_width as f64;
        Self {
            weights: vec![vec![w; input_width]; bias.len()],
            bias,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Regressor for LinearRegressor {
    fn infer(&self, input: &[f64]) -> PredictResult<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let width = self.weights.first().map(Vec::len).unwrap_or(0);
        if input.len() != width {
            return Err(PredictError::Inference(format!(
                "expects {} inputs, got {}",
                width,
                input.len()
            )));
        }
        Ok(self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect())
    }
}

/// Always fails, counting how often it was asked
pub struct FailingRegressor {
    pub calls: Arc<AtomicUsize>,
}

impl Regressor for FailingRegressor {
    fn infer(&self, _input: &[f64]) -> PredictResult<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(PredictError::Inference("shape mismatch".to_string()))
    }
}

/// Ignores the model bytes and builds averaging regressors
pub struct StubLoader;

impl ModelLoader for StubLoader {
    fn load(
        &self,
        name: &str,
        _bytes: &[u8],
        input_width: usize,
    ) -> anyhow::Result<Box<dyn Regressor>> {
        let outputs = if name.starts_with("composite") {
            vec![0.1, -0.2]
        } else {
            vec![0.5]
        };
        Ok(Box::new(LinearRegressor::averaging(input_width, outputs)))
    }
}

/// Properties model inputs: every form field except the ratio
pub fn property_feature_names() -> Vec<&'static str> {
    columns::INPUT_FIELDS
        .into_iter()
        .filter(|c| *c != columns::MATRIX_FILLER_RATIO)
        .collect()
}

/// Ratio model inputs: property inputs plus both predicted properties
pub fn ratio_feature_names() -> Vec<&'static str> {
    let mut names = property_feature_names();
    names.push(columns::TENSILE_ELASTIC_MODULUS);
    names.push(columns::TENSILE_STRENGTH);
    names
}

fn standard_scaler_json(width: usize, mean: f64, scale: f64) -> String {
    serde_json::json!({
        "kind": "standard",
        "mean": vec![mean; width],
        "scale": vec![scale; width],
    })
    .to_string()
}

/// Write a complete, valid artifact directory
pub fn write_artifact_dir(dir: &Path) {
    let props = property_feature_names();
    let ratio = ratio_feature_names();

    fs::write(dir.join("composite_properties_model.onnx"), b"stub").unwrap();
    fs::write(dir.join("matrix_ratio_model.onnx"), b"stub").unwrap();
    fs::write(
        dir.join("composite_features.json"),
        serde_json::to_string(&props).unwrap(),
    )
    .unwrap();
    fs::write(
        dir.join("matrix_ratio_features.json"),
        serde_json::to_string(&ratio).unwrap(),
    )
    .unwrap();
    fs::write(
        dir.join("composite_scaler_X.json"),
        standard_scaler_json(props.len(), 100.0, 50.0),
    )
    .unwrap();
    fs::write(
        dir.join("composite_scaler_y.json"),
        r#"{"kind":"standard","mean":[75.0,2500.0],"scale":[3.0,450.0]}"#,
    )
    .unwrap();
    fs::write(
        dir.join("matrix_ratio_scaler.json"),
        standard_scaler_json(ratio.len(), 200.0, 100.0),
    )
    .unwrap();
}
