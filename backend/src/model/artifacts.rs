use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::path::Path;

use super::classifier::{Classifier, ClassifierArtifact};
use super::scaler::{FeatureScaler, ScalerArtifact};
use super::ParameterError;
use crate::schema::{FeatureSchema, FULL_FEATURE_COUNT};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to deserialize {path}: {source}")]
    Format {
        path: String,
        source: serde_json::Error,
    },
    #[error("Invalid artifact {path}: {source}")]
    Invalid {
        path: String,
        source: ParameterError,
    },
    #[error("Scaler expects {scaler} features but the classifier expects {classifier}")]
    DimensionMismatch { scaler: usize, classifier: usize },
}

/// Model and scaler held for the lifetime of the process. Built once at
/// startup and only read afterwards.
pub struct LoadedArtifacts {
    model: Option<Box<dyn Classifier>>,
    scaler: Option<FeatureScaler>,
    expected_features: usize,
}

impl LoadedArtifacts {
    /// Never fails; on any load error the artifacts are absent and the
    /// expected feature count falls back to the full schema.
    pub fn load(model_path: &Path, scaler_path: &Path) -> Self {
        match Self::try_load(model_path, scaler_path) {
            Ok(artifacts) => {
                log::info!(
                    "Model and scaler loaded successfully, model expects {} features",
                    artifacts.expected_features
                );
                artifacts
            }
            Err(e) => {
                log::error!("Error loading model files: {}", e);
                Self::unloaded()
            }
        }
    }

    pub fn try_load(model_path: &Path, scaler_path: &Path) -> Result<Self, ArtifactError> {
        let model: ClassifierArtifact = read_artifact(model_path)?;
        let scaler: ScalerArtifact = read_artifact(scaler_path)?;

        let model = model.into_classifier().map_err(|source| ArtifactError::Invalid {
            path: model_path.display().to_string(),
            source,
        })?;
        let scaler = FeatureScaler::from_artifact(scaler).map_err(|source| ArtifactError::Invalid {
            path: scaler_path.display().to_string(),
            source,
        })?;

        Self::from_parts(model, scaler)
    }

    pub fn from_parts(
        model: Box<dyn Classifier>,
        scaler: FeatureScaler,
    ) -> Result<Self, ArtifactError> {
        if model.n_features() != scaler.n_features_in() {
            return Err(ArtifactError::DimensionMismatch {
                scaler: scaler.n_features_in(),
                classifier: model.n_features(),
            });
        }
        let expected_features = scaler.n_features_in();
        log::debug!(
            "Scaler method {:?} over {} features",
            scaler.method(),
            expected_features
        );
        if expected_features > FULL_FEATURE_COUNT {
            log::warn!(
                "Scaler expects {} features but only {} are named; single-record requests cannot be satisfied",
                expected_features,
                FULL_FEATURE_COUNT
            );
        }
        Ok(Self {
            model: Some(model),
            scaler: Some(scaler),
            expected_features,
        })
    }

    pub fn unloaded() -> Self {
        Self {
            model: None,
            scaler: None,
            expected_features: FULL_FEATURE_COUNT,
        }
    }

    pub fn model(&self) -> Option<&dyn Classifier> {
        self.model.as_deref()
    }

    pub fn scaler(&self) -> Option<&FeatureScaler> {
        self.scaler.as_ref()
    }

    /// Both halves, or `None` while either is missing.
    pub fn ready(&self) -> Option<(&FeatureScaler, &dyn Classifier)> {
        Some((self.scaler()?, self.model()?))
    }

    pub fn expected_features(&self) -> usize {
        self.expected_features
    }

    pub fn schema(&self) -> FeatureSchema {
        if self.model.is_some() {
            FeatureSchema::truncated(self.expected_features)
        } else {
            FeatureSchema::full()
        }
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::info!(
        "Read {} ({} bytes, sha256 {})",
        path.display(),
        bytes.len(),
        fingerprint(&bytes)
    );
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Format {
        path: path.display().to_string(),
        source,
    })
}

pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
