//! On-disk artifact store
//!
//! One directory holds everything a [`TwoStagePredictor`] needs: two ONNX
//! models, their feature-order lists and the fitted scalers. Loading is
//! all-or-nothing; any missing or malformed file fails the whole load.

use crate::error::{PredictError, PredictResult, Stage};
use crate::models::FeatureList;
use crate::predictor::{ModelLoader, Scaler, StageModel, TwoStagePredictor, PROPERTY_OUTPUTS};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Files making up an artifact directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactFile {
    PropertiesModel,
    PropertiesInputScaler,
    PropertiesOutputScaler,
    PropertiesFeatures,
    RatioModel,
    RatioScaler,
    RatioFeatures,
}

impl ArtifactFile {
    pub const ALL: [ArtifactFile; 7] = [
        ArtifactFile::PropertiesModel,
        ArtifactFile::PropertiesInputScaler,
        ArtifactFile::PropertiesOutputScaler,
        ArtifactFile::PropertiesFeatures,
        ArtifactFile::RatioModel,
        ArtifactFile::RatioScaler,
        ArtifactFile::RatioFeatures,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactFile::PropertiesModel => "composite_properties_model.onnx",
            ArtifactFile::PropertiesInputScaler => "composite_scaler_X.json",
            ArtifactFile::PropertiesOutputScaler => "composite_scaler_y.json",
            ArtifactFile::PropertiesFeatures => "composite_features.json",
            ArtifactFile::RatioModel => "matrix_ratio_model.onnx",
            ArtifactFile::RatioScaler => "matrix_ratio_scaler.json",
            ArtifactFile::RatioFeatures => "matrix_ratio_features.json",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ArtifactFile::PropertiesModel => "properties model",
            ArtifactFile::PropertiesInputScaler => "properties input scaler",
            ArtifactFile::PropertiesOutputScaler => "properties output scaler",
            ArtifactFile::PropertiesFeatures => "properties feature list",
            ArtifactFile::RatioModel => "ratio model",
            ArtifactFile::RatioScaler => "ratio input scaler",
            ArtifactFile::RatioFeatures => "ratio feature list",
        }
    }
}

/// SHA-256 fingerprint of one artifact file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFingerprint {
    pub file: String,
    pub description: String,
    pub size_bytes: usize,
    pub sha256: String,
}

/// Fingerprints of every file in an artifact directory, in layout order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub dir: PathBuf,
    pub files: Vec<ArtifactFingerprint>,
}

/// Artifact directory handle
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file: ArtifactFile) -> PathBuf {
        self.dir.join(file.file_name())
    }

    /// Layout files not present on disk
    pub fn missing(&self) -> Vec<ArtifactFile> {
        ArtifactFile::ALL
            .into_iter()
            .filter(|f| !self.path(*f).is_file())
            .collect()
    }

    /// Fingerprint every artifact without compiling the models
    pub fn manifest(&self) -> PredictResult<ArtifactManifest> {
        self.ensure_complete()?;
        let blobs = self.read_all().map_err(|e| self.failure(e))?;
        Ok(self.manifest_of(&blobs))
    }

    /// Properties and ratio feature lists
    pub fn feature_lists(&self) -> PredictResult<(FeatureList, FeatureList)> {
        let load = || -> Result<(FeatureList, FeatureList)> {
            let properties = parse_feature_list(
                ArtifactFile::PropertiesFeatures,
                &read_file(&self.path(ArtifactFile::PropertiesFeatures))?,
            )?;
            let ratio = parse_feature_list(
                ArtifactFile::RatioFeatures,
                &read_file(&self.path(ArtifactFile::RatioFeatures))?,
            )?;
            Ok((properties, ratio))
        };
        load().map_err(|e| self.failure(e))
    }

    /// Load, validate and compile every artifact into a predictor
    pub fn load_predictor(&self, loader: &dyn ModelLoader) -> PredictResult<TwoStagePredictor> {
        self.ensure_complete()?;
        let predictor = self.build(loader).map_err(|e| self.failure(e))?;
        info!(dir = %self.dir.display(), "All model artifacts loaded");
        Ok(predictor)
    }

    fn ensure_complete(&self) -> PredictResult<()> {
        let missing = self.missing();
        if missing.is_empty() {
            return Ok(());
        }
        let names: Vec<&str> = missing.iter().map(|f| f.file_name()).collect();
        Err(PredictError::ArtifactLoad {
            dir: self.dir.clone(),
            reason: format!("missing files: {}", names.join(", ")),
        })
    }

    fn failure(&self, e: anyhow::Error) -> PredictError {
        PredictError::ArtifactLoad {
            dir: self.dir.clone(),
            reason: format!("{:#}", e),
        }
    }

    fn read_all(&self) -> Result<HashMap<ArtifactFile, Vec<u8>>> {
        ArtifactFile::ALL
            .into_iter()
            .map(|f| Ok((f, read_file(&self.path(f))?)))
            .collect()
    }

    fn manifest_of(&self, blobs: &HashMap<ArtifactFile, Vec<u8>>) -> ArtifactManifest {
        let files = ArtifactFile::ALL
            .into_iter()
            .filter_map(|f| blobs.get(&f).map(|bytes| (f, bytes)))
            .map(|(f, bytes)| ArtifactFingerprint {
                file: f.file_name().to_string(),
                description: f.description().to_string(),
                size_bytes: bytes.len(),
                sha256: compute_checksum(bytes),
            })
            .collect();
        ArtifactManifest {
            dir: self.dir.clone(),
            files,
        }
    }

    fn build(&self, loader: &dyn ModelLoader) -> Result<TwoStagePredictor> {
        let blobs = self.read_all()?;
        let blob = |f: ArtifactFile| blob_of(&blobs, f);

        let property_features = parse_feature_list(
            ArtifactFile::PropertiesFeatures,
            blob(ArtifactFile::PropertiesFeatures),
        )?;
        let ratio_features =
            parse_feature_list(ArtifactFile::RatioFeatures, blob(ArtifactFile::RatioFeatures))?;

        let scaler_x = parse_scaler(
            ArtifactFile::PropertiesInputScaler,
            blob(ArtifactFile::PropertiesInputScaler),
            property_features.len(),
        )?;
        let scaler_y = parse_scaler(
            ArtifactFile::PropertiesOutputScaler,
            blob(ArtifactFile::PropertiesOutputScaler),
            PROPERTY_OUTPUTS,
        )?;
        let ratio_scaler = parse_scaler(
            ArtifactFile::RatioScaler,
            blob(ArtifactFile::RatioScaler),
            ratio_features.len(),
        )?;

        let properties_model = loader
            .load(
                "composite_properties_model",
                blob(ArtifactFile::PropertiesModel),
                property_features.len(),
            )
            .with_context(|| {
                format!(
                    "Failed to load {}",
                    ArtifactFile::PropertiesModel.file_name()
                )
            })?;
        let ratio_model = loader
            .load(
                "matrix_ratio_model",
                blob(ArtifactFile::RatioModel),
                ratio_features.len(),
            )
            .with_context(|| format!("Failed to load {}", ArtifactFile::RatioModel.file_name()))?;

        let manifest = self.manifest_of(&blobs);
        for entry in &manifest.files {
            debug!(
                file = %entry.file,
                size = entry.size_bytes,
                sha256 = %entry.sha256,
                "Artifact fingerprint"
            );
        }

        let properties = StageModel::new(
            Stage::Properties,
            properties_model,
            property_features,
            scaler_x,
            Some(scaler_y),
        );
        let ratio = StageModel::new(Stage::Ratio, ratio_model, ratio_features, ratio_scaler, None);

        Ok(TwoStagePredictor::new(properties, ratio).with_manifest(manifest))
    }
}

fn blob_of(blobs: &HashMap<ArtifactFile, Vec<u8>>, file: ArtifactFile) -> &[u8] {
    blobs.get(&file).map(Vec::as_slice).unwrap_or_default()
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn parse_feature_list(file: ArtifactFile, bytes: &[u8]) -> Result<FeatureList> {
    let features: FeatureList = serde_json::from_slice(bytes)
        .with_context(|| format!("Failed to parse {}", file.file_name()))?;
    if features.is_empty() {
        bail!("{} is empty", file.file_name());
    }
    if let Some(dup) = features.first_duplicate() {
        bail!("{} lists feature '{}' more than once", file.file_name(), dup);
    }
    Ok(features)
}

fn parse_scaler(file: ArtifactFile, bytes: &[u8], expected_width: usize) -> Result<Scaler> {
    let scaler: Scaler = serde_json::from_slice(bytes)
        .with_context(|| format!("Failed to parse {}", file.file_name()))?;
    if let Err(reason) = scaler.validate() {
        bail!("{}: {}", file.file_name(), reason);
    }
    if scaler.width() != expected_width {
        bail!(
            "{} was fitted on {} features, expected {}",
            file.file_name(),
            scaler.width(),
            expected_width
        );
    }
    Ok(scaler)
}

/// Hex-encoded SHA-256 of `data`
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{write_artifact_dir, StubLoader};
    use tempfile::TempDir;

    #[test]
    fn test_load_complete_directory() {
        let dir = TempDir::new().unwrap();
        write_artifact_dir(dir.path());

        let predictor = ArtifactStore::new(dir.path())
            .load_predictor(&StubLoader)
            .unwrap();
        assert_eq!(predictor.property_features().len(), 10);
        assert_eq!(predictor.ratio_features().len(), 12);

        let manifest = predictor.manifest().unwrap();
        assert_eq!(manifest.files.len(), ArtifactFile::ALL.len());
        assert!(manifest.files.iter().all(|f| f.sha256.len() == 64));
    }

    #[test]
    fn test_missing_ratio_scaler_fails_whole_load() {
        let dir = TempDir::new().unwrap();
        write_artifact_dir(dir.path());
        fs::remove_file(dir.path().join("matrix_ratio_scaler.json")).unwrap();

        let err = ArtifactStore::new(dir.path())
            .load_predictor(&StubLoader)
            .err()
            .expect("load must fail");
        match err {
            PredictError::ArtifactLoad { reason, .. } => {
                assert!(reason.contains("matrix_ratio_scaler.json"), "{}", reason)
            }
            other => panic!("expected ArtifactLoad, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_files_are_all_reported() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert_eq!(store.missing().len(), 7);

        let err = store.manifest().unwrap_err();
        let msg = err.to_string();
        for file in ArtifactFile::ALL {
            assert!(msg.contains(file.file_name()), "{} not in {}", file.file_name(), msg);
        }
    }

    #[test]
    fn test_corrupt_scaler_fails_load() {
        let dir = TempDir::new().unwrap();
        write_artifact_dir(dir.path());
        fs::write(dir.path().join("composite_scaler_y.json"), b"{not json").unwrap();

        let err = ArtifactStore::new(dir.path())
            .load_predictor(&StubLoader)
            .err()
            .expect("load must fail");
        assert_eq!(err.kind(), "artifact_load");
        assert!(err.to_string().contains("composite_scaler_y.json"));
    }

    #[test]
    fn test_scaler_width_must_match_feature_list() {
        let dir = TempDir::new().unwrap();
        write_artifact_dir(dir.path());
        fs::write(
            dir.path().join("matrix_ratio_scaler.json"),
            r#"{"kind":"standard","mean":[0.0,0.0],"scale":[1.0,1.0]}"#,
        )
        .unwrap();

        let err = ArtifactStore::new(dir.path())
            .load_predictor(&StubLoader)
            .err()
            .expect("load must fail");
        assert!(err.to_string().contains("expected 12"), "{}", err);
    }

    #[test]
    fn test_duplicate_feature_names_rejected() {
        let dir = TempDir::new().unwrap();
        write_artifact_dir(dir.path());
        fs::write(dir.path().join("composite_features.json"), r#"["a","a"]"#).unwrap();

        let err = ArtifactStore::new(dir.path()).feature_lists().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_model_loader_failure_names_file() {
        struct FailingLoader;
        impl ModelLoader for FailingLoader {
            fn load(
                &self,
                _: &str,
                _: &[u8],
                _: usize,
            ) -> Result<Box<dyn crate::predictor::Regressor>> {
                bail!("unsupported opset")
            }
        }

        let dir = TempDir::new().unwrap();
        write_artifact_dir(dir.path());
        let err = ArtifactStore::new(dir.path())
            .load_predictor(&FailingLoader)
            .err()
            .expect("load must fail");
        let msg = err.to_string();
        assert!(msg.contains("composite_properties_model.onnx"), "{}", msg);
        assert!(msg.contains("unsupported opset"), "{}", msg);
    }

    #[test]
    fn test_checksum_is_stable() {
        assert_eq!(
            compute_checksum(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
