//! Artifact directory inspection

use crate::output::{self, Notice, OutputFormat};
use anyhow::Result;
use predictor_lib::ArtifactStore;
use serde_json::json;
use std::path::Path;
use tabled::Tabled;

#[derive(Tabled)]
struct FingerprintRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Contents")]
    description: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "SHA-256")]
    sha256: String,
}

pub fn show_artifacts(model_dir: &Path, format: OutputFormat) -> Result<()> {
    let store = ArtifactStore::new(model_dir);

    let missing = store.missing();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|f| f.file_name()).collect();
        output::notice(
            Notice::Error,
            &format!(
                "{} is missing {} artifact file(s): {}",
                model_dir.display(),
                missing.len(),
                names.join(", ")
            ),
        );
    }

    let manifest = store.manifest()?;
    let (property_features, ratio_features) = store.feature_lists()?;

    match format {
        OutputFormat::Json => output::print_json(&json!({
            "manifest": manifest,
            "property_features": property_features,
            "ratio_features": ratio_features,
        }))?,
        OutputFormat::Table => {
            let rows: Vec<FingerprintRow> = manifest
                .files
                .iter()
                .map(|f| FingerprintRow {
                    file: f.file.clone(),
                    description: f.description.clone(),
                    size: output::human_size(f.size_bytes),
                    sha256: f.sha256.chars().take(12).collect(),
                })
                .collect();
            output::print_table(&rows);

            output::notice(
                Notice::Info,
                &format!(
                    "Properties model inputs ({}): {}",
                    property_features.len(),
                    property_features.names().join(", ")
                ),
            );
            output::notice(
                Notice::Info,
                &format!(
                    "Ratio model inputs ({}): {}",
                    ratio_features.len(),
                    ratio_features.names().join(", ")
                ),
            );
            output::notice(
                Notice::Success,
                &format!(
                    "All {} artifacts present in {}",
                    manifest.files.len(),
                    manifest.dir.display()
                ),
            );
        }
    }
    Ok(())
}
