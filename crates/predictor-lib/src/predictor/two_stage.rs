//! Two-stage predictor: mechanical properties, then matrix-to-filler ratio
//!
//! The ratio model was fitted on features that include the predicted
//! properties, so a combined call always runs the property stage first and
//! feeds its outputs into the ratio stage input.

use super::{align, Regressor, Scaler};
use crate::artifacts::{ArtifactManifest, ArtifactStore};
use crate::error::{PredictError, PredictResult, Stage};
use crate::models::{
    FeatureList, FeatureVector, OptimalComposite, PropertyPrediction, RatioPrediction,
};
use std::path::Path;
use tracing::debug;

/// Number of values produced by the properties model
pub const PROPERTY_OUTPUTS: usize = 2;

/// One model together with its feature order and scalers
pub struct StageModel {
    stage: Stage,
    regressor: Box<dyn Regressor>,
    features: FeatureList,
    input_scaler: Scaler,
    output_scaler: Option<Scaler>,
}

impl StageModel {
    pub fn new(
        stage: Stage,
        regressor: Box<dyn Regressor>,
        features: FeatureList,
        input_scaler: Scaler,
        output_scaler: Option<Scaler>,
    ) -> Self {
        Self {
            stage,
            regressor,
            features,
            input_scaler,
            output_scaler,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn features(&self) -> &FeatureList {
        &self.features
    }

    /// align -> forward scale -> infer -> inverse scale (when an output scaler is present)
    fn run(&self, input: &FeatureVector) -> PredictResult<Vec<f64>> {
        let aligned = align(self.stage, input, &self.features)?;
        let scaled = self.input_scaler.forward(&aligned)?;
        let raw = self.regressor.infer(&scaled)?;

        let output = match &self.output_scaler {
            Some(scaler) => scaler.inverse(&raw)?,
            None => raw,
        };

        if let Some(i) = output.iter().position(|v| !v.is_finite()) {
            return Err(PredictError::inference(format!(
                "{} model produced a non-finite value at output {}",
                self.stage, i
            )));
        }
        Ok(output)
    }
}

/// Loaded properties and ratio models
pub struct TwoStagePredictor {
    properties: StageModel,
    ratio: StageModel,
    manifest: Option<ArtifactManifest>,
}

impl TwoStagePredictor {
    pub fn new(properties: StageModel, ratio: StageModel) -> Self {
        Self {
            properties,
            ratio,
            manifest: None,
        }
    }

    /// Load every artifact from `dir` with the ONNX backend
    pub fn load(dir: impl AsRef<Path>) -> PredictResult<Self> {
        ArtifactStore::new(dir).load_predictor(&super::OnnxLoader)
    }

    pub(crate) fn with_manifest(mut self, manifest: ArtifactManifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    /// Fingerprints of the files this predictor was loaded from
    pub fn manifest(&self) -> Option<&ArtifactManifest> {
        self.manifest.as_ref()
    }

    pub fn property_features(&self) -> &FeatureList {
        self.properties.features()
    }

    pub fn ratio_features(&self) -> &FeatureList {
        self.ratio.features()
    }

    pub fn predict_properties(&self, input: &FeatureVector) -> PredictResult<PropertyPrediction> {
        let output = self.properties.run(input)?;
        if output.len() < PROPERTY_OUTPUTS {
            return Err(PredictError::inference(format!(
                "properties model returned {} values, expected {}",
                output.len(),
                PROPERTY_OUTPUTS
            )));
        }
        Ok(PropertyPrediction {
            elastic_modulus: output[0],
            tensile_strength: output[1],
        })
    }

    /// Ratio model output is taken in raw units; it has no output scaler
    pub fn predict_ratio(&self, input: &FeatureVector) -> PredictResult<RatioPrediction> {
        let output = self.ratio.run(input)?;
        let matrix_filler_ratio = output
            .first()
            .copied()
            .ok_or_else(|| PredictError::inference("ratio model returned no values"))?;
        Ok(RatioPrediction { matrix_filler_ratio })
    }

    pub fn predict_optimal(&self, input: &FeatureVector) -> PredictResult<OptimalComposite> {
        let properties = self.predict_properties(input)?;
        let ratio_input = input.merged_with(&properties.to_features());
        let ratio = self.predict_ratio(&ratio_input)?;

        debug!(
            elastic_modulus = properties.elastic_modulus,
            tensile_strength = properties.tensile_strength,
            matrix_filler_ratio = ratio.matrix_filler_ratio,
            "Two-stage prediction completed"
        );

        Ok(OptimalComposite { properties, ratio })
    }
}
