//! CLI command implementations

pub mod artifacts;
pub mod local;
pub mod predict;

use crate::output::ValueRow;
use anyhow::{bail, Context, Result};
use clap::Args;
use predictor_lib::{columns, FeatureVector, PropertyPrediction};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Composite parameters given on the command line
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Set one parameter, e.g. --set "Плотность, кг/м3=1975"
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub values: Vec<String>,

    /// JSON object of parameter names to numbers; --set entries take precedence
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,
}

impl InputArgs {
    /// Merged parameters; `--set` entries override the input file
    fn entries(&self) -> Result<BTreeMap<String, f64>> {
        let mut entries = BTreeMap::new();

        if let Some(path) = &self.input {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file {}", path.display()))?;
            let parsed: HashMap<String, f64> = serde_json::from_str(&content)
                .with_context(|| {
                    format!(
                        "Input file {} is not a JSON object of numbers",
                        path.display()
                    )
                })?;
            entries.extend(parsed);
        }

        for raw in &self.values {
            let (name, value) = parse_assignment(raw)?;
            entries.insert(name, value);
        }

        Ok(entries)
    }

    /// Feature vector for in-process prediction
    pub fn load_inputs(&self) -> Result<FeatureVector> {
        Ok(self.entries()?.into_iter().collect())
    }

    /// Form fields for the server; unset fields are left to the server defaults
    pub fn form_fields(&self) -> Result<HashMap<String, String>> {
        Ok(self
            .entries()?
            .into_iter()
            .map(|(name, value)| (name, value.to_string()))
            .collect())
    }
}

/// Table rows for whichever predicted quantities are present
pub(crate) fn prediction_rows(
    properties: Option<&PropertyPrediction>,
    ratio: Option<f64>,
) -> Vec<ValueRow> {
    let mut rows = Vec::new();
    if let Some(p) = properties {
        rows.push(ValueRow::number(columns::TENSILE_ELASTIC_MODULUS, p.elastic_modulus, 2));
        rows.push(ValueRow::number(columns::TENSILE_STRENGTH, p.tensile_strength, 2));
    }
    if let Some(r) = ratio {
        rows.push(ValueRow::number(columns::MATRIX_FILLER_RATIO, r, 4));
    }
    rows
}

fn parse_assignment(raw: &str) -> Result<(String, f64)> {
    let Some((name, value)) = raw.rsplit_once('=') else {
        bail!("Expected NAME=VALUE, got '{}'", raw);
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("Missing parameter name in '{}'", raw);
    }
    let value: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("Value for '{}' is not a number: '{}'", name, value.trim()))?;
    Ok((name.to_string(), value))
}
