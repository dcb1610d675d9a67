//! Fitted scalers applied around model inference
//!
//! Parameters follow the scikit-learn attribute conventions the artifacts
//! were exported with (`mean_`/`scale_` for standard scaling, `min_`/`scale_`
//! for min-max scaling).

use crate::error::PredictError;
use serde::{Deserialize, Serialize};

/// A fitted affine transform over a fixed number of features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// `z = (x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `z = x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

impl Scaler {
    /// Number of features the scaler was fitted on
    pub fn width(&self) -> usize {
        match self {
            Scaler::Standard { scale, .. } | Scaler::MinMax { scale, .. } => scale.len(),
        }
    }

    /// Check parameter shapes and values; returns a description of the first problem
    pub fn validate(&self) -> Result<(), String> {
        let (offset, scale, offset_name) = match self {
            Scaler::Standard { mean, scale } => (mean, scale, "mean"),
            Scaler::MinMax { min, scale } => (min, scale, "min"),
        };
        if scale.is_empty() {
            return Err("scaler has no features".to_string());
        }
        if offset.len() != scale.len() {
            return Err(format!(
                "{} has {} values but scale has {}",
                offset_name,
                offset.len(),
                scale.len()
            ));
        }
        if let Some(i) = offset.iter().position(|v| !v.is_finite()) {
            return Err(format!("{}[{}] is not finite", offset_name, i));
        }
        if let Some(i) = scale.iter().position(|v| !v.is_finite() || *v == 0.0) {
            return Err(format!("scale[{}] must be finite and non-zero", i));
        }
        Ok(())
    }

    /// Raw values to model space
    pub fn forward(&self, values: &[f64]) -> Result<Vec<f64>, PredictError> {
        self.check_width(values)?;
        Ok(match self {
            Scaler::Standard { mean, scale } => values
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(x, (m, s))| (x - m) / s)
                .collect(),
            Scaler::MinMax { min, scale } => values
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(x, (m, s))| x * s + m)
                .collect(),
        })
    }

    /// Model space back to raw values
    pub fn inverse(&self, values: &[f64]) -> Result<Vec<f64>, PredictError> {
        self.check_width(values)?;
        Ok(match self {
            Scaler::Standard { mean, scale } => values
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(z, (m, s))| z * s + m)
                .collect(),
            Scaler::MinMax { min, scale } => values
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(z, (m, s))| (z - m) / s)
                .collect(),
        })
    }

    fn check_width(&self, values: &[f64]) -> Result<(), PredictError> {
        if values.len() != self.width() {
            return Err(PredictError::inference(format!(
                "scaler expects {} features, got {}",
                self.width(),
                values.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> Scaler {
        Scaler::Standard {
            mean: vec![100.0, 2000.0],
            scale: vec![10.0, 500.0],
        }
    }

    fn min_max() -> Scaler {
        Scaler::MinMax {
            min: vec![-0.5, 0.1],
            scale: vec![0.01, 0.002],
        }
    }

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-9, "{} != {}", x, y);
        }
    }

    #[test]
    fn test_standard_forward() {
        let z = standard().forward(&[110.0, 1500.0]).unwrap();
        assert_close(&z, &[1.0, -1.0]);
    }

    #[test]
    fn test_min_max_forward() {
        let z = min_max().forward(&[50.0, 450.0]).unwrap();
        assert_close(&z, &[0.0, 1.0]);
    }

    #[test]
    fn test_inverse_undoes_forward() {
        let raw = [73.25, 2466.9];
        for scaler in [standard(), min_max()] {
            let back = scaler.inverse(&scaler.forward(&raw).unwrap()).unwrap();
            assert_close(&back, &raw);
        }
    }

    #[test]
    fn test_width_mismatch_is_inference_error() {
        let err = standard().forward(&[1.0]).unwrap_err();
        assert!(matches!(err, PredictError::Inference(_)));
        assert!(err.to_string().contains("expects 2 features, got 1"));
    }

    #[test]
    fn test_validate_rejects_zero_scale() {
        let scaler = Scaler::Standard {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 0.0],
        };
        assert!(scaler.validate().unwrap_err().contains("scale[1]"));
    }

    #[test]
    fn test_validate_rejects_length_mismatch() {
        let scaler = Scaler::MinMax {
            min: vec![0.0],
            scale: vec![1.0, 2.0],
        };
        assert!(scaler.validate().is_err());
        assert!(standard().validate().is_ok());
    }

    #[test]
    fn test_deserialize_tagged_json() {
        let scaler: Scaler =
            serde_json::from_str(r#"{"kind":"min_max","min":[0.0],"scale":[0.5]}"#).unwrap();
        assert_eq!(scaler.width(), 1);
        assert!(matches!(scaler, Scaler::MinMax { .. }));
    }
}
