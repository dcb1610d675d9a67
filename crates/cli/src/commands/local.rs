//! In-process prediction against a local artifact directory

use super::{prediction_rows, InputArgs};
use crate::output::{self, Notice, OutputFormat, ValueRow};
use crate::LocalStage;
use anyhow::{Context, Result};
use predictor_lib::{FeatureVector, TwoStagePredictor};
use serde_json::{json, Value};
use std::path::Path;

pub fn run_local(
    model_dir: &Path,
    stage: LocalStage,
    inputs: &InputArgs,
    format: OutputFormat,
) -> Result<()> {
    let features = inputs.load_inputs()?;
    let predictor = TwoStagePredictor::load(model_dir)
        .with_context(|| format!("Could not load models from {}", model_dir.display()))?;

    let (rows, value) = predict_stage(&predictor, stage, &features)?;

    match format {
        OutputFormat::Json => output::print_json(&value)?,
        OutputFormat::Table => {
            output::print_table(&rows);
            output::notice(Notice::Success, "Prediction complete");
        }
    }
    Ok(())
}

/// Run one stage, returning table rows and the JSON rendering of the result
fn predict_stage(
    predictor: &TwoStagePredictor,
    stage: LocalStage,
    features: &FeatureVector,
) -> Result<(Vec<ValueRow>, Value)> {
    let rendered = match stage {
        LocalStage::Properties => {
            let properties = predictor.predict_properties(features)?;
            (prediction_rows(Some(&properties), None), json!(properties))
        }
        LocalStage::Ratio => {
            let ratio = predictor.predict_ratio(features)?;
            (
                prediction_rows(None, Some(ratio.matrix_filler_ratio)),
                json!(ratio),
            )
        }
        LocalStage::Optimal => {
            let optimal = predictor.predict_optimal(features)?;
            (
                prediction_rows(
                    Some(&optimal.properties),
                    Some(optimal.ratio.matrix_filler_ratio),
                ),
                json!(optimal),
            )
        }
    };
    Ok(rendered)
}
