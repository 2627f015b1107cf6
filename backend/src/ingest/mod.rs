//! Turns an uploaded CSV file into a feature matrix.
//!
//! ```text
//!  raw bytes ─► decode ─► table (delimiter detection) ─► columns (exclude, numeric filter, median fill)
//! ```

pub mod columns;
pub mod decode;
pub mod table;

use ndarray::Array2;

use decode::{decode_upload, TextEncoding};
use table::read_table;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("No file uploaded. Please select a CSV file.")]
    MissingFile,
    #[error("No file selected. Please choose a CSV file.")]
    EmptyFilename,
    #[error("Invalid file format. Please upload a CSV file.")]
    NotCsv,
    #[error("File too large. Maximum upload size is {limit} bytes.")]
    TooLarge { limit: usize },
    #[error("Unable to decode CSV file. Please save as UTF-8 format.")]
    Undecodable,
    #[error("CSV file is empty.")]
    Empty,
    #[error("Could not parse CSV file: {0}")]
    Unparsable(String),
    #[error("CSV file contains no data rows.")]
    NoDataRows,
    #[error("Need {expected} numeric features, found only {found}. Available: {available:?}")]
    InsufficientFeatures {
        expected: usize,
        found: usize,
        available: Vec<String>,
    },
    #[error("Expected {expected} features, got {got} features.")]
    FeatureCountMismatch { expected: usize, got: usize },
}

/// How the uploaded columns were resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvIngestionReport {
    pub selected_columns: Vec<String>,
    pub excluded_columns: Vec<String>,
    pub delimiter_used: String,
    pub original_columns: usize,
    pub encoding: TextEncoding,
}

#[derive(Debug, Clone)]
pub struct IngestedBatch {
    pub features: Array2<f64>,
    pub report: CsvIngestionReport,
}

pub fn validate_filename(filename: &str) -> Result<(), IngestError> {
    if filename.is_empty() {
        return Err(IngestError::EmptyFilename);
    }
    if !filename.to_lowercase().ends_with(".csv") {
        return Err(IngestError::NotCsv);
    }
    Ok(())
}

pub fn ingest_csv(bytes: &[u8], expected_features: usize) -> Result<IngestedBatch, IngestError> {
    let (text, encoding) = decode_upload(bytes)?;
    log::debug!("Decoded {} bytes as {}", bytes.len(), encoding);
    if text.trim().is_empty() {
        return Err(IngestError::Empty);
    }

    let (table, delimiter) = read_table(&text)?;
    log::info!(
        "CSV loaded: {} rows, {} columns",
        table.row_count(),
        table.column_count()
    );
    if table.row_count() == 0 {
        return Err(IngestError::NoDataRows);
    }

    let selection = columns::select_features(&table, expected_features)?;
    if selection.features.ncols() != expected_features {
        return Err(IngestError::FeatureCountMismatch {
            expected: expected_features,
            got: selection.features.ncols(),
        });
    }

    Ok(IngestedBatch {
        features: selection.features,
        report: CsvIngestionReport {
            selected_columns: selection.selected,
            excluded_columns: selection.excluded,
            delimiter_used: delimiter.label().to_string(),
            original_columns: table.column_count(),
            encoding,
        },
    })
}
