pub mod batch;
pub mod health;
pub mod single;

use ndarray::{Array2, Axis};
use shared::Diagnosis;

use crate::ingest::IngestError;
use crate::model::{Classifier, FeatureScaler, InferenceError};

/// Reported for every row when the classifier cannot estimate probabilities.
pub const DEFAULT_CONFIDENCE: f64 = 0.85;

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("Model not loaded. Please check server configuration.")]
    ServiceUnavailable,
    #[error("{0}")]
    BadRequest(String),
    #[error("Prediction failed: {0}")]
    Internal(String),
}

impl From<IngestError> for PredictionError {
    fn from(err: IngestError) -> Self {
        PredictionError::BadRequest(err.to_string())
    }
}

impl From<InferenceError> for PredictionError {
    fn from(err: InferenceError) -> Self {
        PredictionError::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    pub diagnosis: Diagnosis,
    pub confidence: f64,
}

/// Scales the raw rows, classifies them and attaches a confidence per row.
pub fn classify(
    scaler: &FeatureScaler,
    model: &dyn Classifier,
    features: &Array2<f64>,
) -> Result<Vec<PredictionResult>, PredictionError> {
    let scaled = scaler.transform(features)?;
    let labels = model.predict(&scaled)?;
    let confidences = confidences(model, &scaled, labels.len());

    Ok(labels
        .iter()
        .zip(confidences)
        .map(|(&label, confidence)| PredictionResult {
            diagnosis: Diagnosis::from_label(label),
            confidence,
        })
        .collect())
}

fn confidences(model: &dyn Classifier, scaled: &Array2<f64>, rows: usize) -> Vec<f64> {
    let Some(estimator) = model.probability_estimator() else {
        log::debug!("Classifier has no probability estimates, using default confidence");
        return vec![DEFAULT_CONFIDENCE; rows];
    };

    match estimator.predict_proba(scaled) {
        Ok(proba) => proba
            .axis_iter(Axis(0))
            .map(|row| row.iter().copied().fold(0.0, f64::max))
            .collect(),
        Err(e) => {
            log::warn!("Could not calculate confidence: {}", e);
            vec![DEFAULT_CONFIDENCE; rows]
        }
    }
}
