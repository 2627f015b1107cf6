use shared::{BatchPrediction, BatchPredictionResponse, Diagnosis};

use super::{classify, PredictionError, PredictionResult};
use crate::ingest::{ingest_csv, validate_filename, CsvIngestionReport, IngestError};
use crate::model::LoadedArtifacts;

#[derive(Debug, Clone)]
pub struct CsvUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub results: Vec<PredictionResult>,
    pub report: CsvIngestionReport,
    pub features_used: usize,
}

impl BatchOutcome {
    pub fn count(&self, diagnosis: Diagnosis) -> usize {
        self.results
            .iter()
            .filter(|r| r.diagnosis == diagnosis)
            .count()
    }

    pub fn into_response(self) -> BatchPredictionResponse {
        let benign_count = self.count(Diagnosis::Benign);
        let malignant_count = self.count(Diagnosis::Malignant);
        BatchPredictionResponse {
            total_samples: self.results.len(),
            predictions: self
                .results
                .into_iter()
                .map(|r| BatchPrediction {
                    prediction: r.diagnosis,
                    confidence: r.confidence,
                })
                .collect(),
            benign_count,
            malignant_count,
            features_used: self.features_used,
            selected_columns: self.report.selected_columns,
            excluded_columns: self.report.excluded_columns,
            original_columns: self.report.original_columns,
            delimiter_used: self.report.delimiter_used,
            status: "success".to_string(),
        }
    }
}

pub fn predict_batch(
    artifacts: &LoadedArtifacts,
    upload: Option<&CsvUpload>,
) -> Result<BatchOutcome, PredictionError> {
    let (scaler, model) = artifacts
        .ready()
        .ok_or(PredictionError::ServiceUnavailable)?;

    let upload = upload.ok_or(IngestError::MissingFile)?;
    validate_filename(&upload.filename)?;
    log::info!(
        "Received file {} ({} bytes), model expects {} features",
        upload.filename,
        upload.bytes.len(),
        artifacts.expected_features()
    );

    let batch = ingest_csv(&upload.bytes, artifacts.expected_features())?;
    log::info!(
        "Selected {} columns {:?}, excluded {:?}, delimiter {:?}, encoding {}",
        batch.report.selected_columns.len(),
        batch.report.selected_columns,
        batch.report.excluded_columns,
        batch.report.delimiter_used,
        batch.report.encoding
    );

    let results = classify(scaler, model, &batch.features)?;
    Ok(BatchOutcome {
        results,
        report: batch.report,
        features_used: artifacts.expected_features(),
    })
}
