use lazy_static::lazy_static;
use ndarray::Array2;
use std::collections::BTreeSet;

use super::table::RawTable;
use super::IngestError;

lazy_static! {
    /// Lowercase fragments that mark identifier or label columns.
    pub static ref EXCLUDED_COLUMN_TERMS: BTreeSet<&'static str> = [
        "id", "diagnosis", "target", "label", "class", "outcome", "result", "patient", "sample",
        "index", "unnamed", "row",
    ]
    .into_iter()
    .collect();
}

/// A candidate column is numeric when at least 9 in 10 of its cells parse.
const NUMERIC_RATIO_NUM: usize = 9;
const NUMERIC_RATIO_DEN: usize = 10;

pub fn is_excluded_column(name: &str) -> bool {
    let lowered = name.trim().to_lowercase();
    EXCLUDED_COLUMN_TERMS
        .iter()
        .any(|term| lowered.contains(term))
}

/// Blank, `NaN`, infinite and unparsable cells are all missing.
pub fn coerce_numeric(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub fn is_numeric_column(table: &RawTable, idx: usize) -> bool {
    let valid = table
        .column(idx)
        .filter(|cell| coerce_numeric(cell).is_some())
        .count();
    log::debug!(
        "Column {} has {}/{} numeric values",
        table.headers[idx],
        valid,
        table.row_count()
    );
    valid * NUMERIC_RATIO_DEN >= table.row_count() * NUMERIC_RATIO_NUM
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[derive(Debug, Clone)]
pub struct ColumnSelection {
    pub selected: Vec<String>,
    pub excluded: Vec<String>,
    pub features: Array2<f64>,
}

/// Drops identifier/label columns, keeps mostly-numeric ones and takes the
/// first `expected` of those left to right. Columns are matched by position,
/// never by name.
pub fn select_features(table: &RawTable, expected: usize) -> Result<ColumnSelection, IngestError> {
    let mut excluded = Vec::new();
    let mut candidates = Vec::new();
    for (idx, name) in table.headers.iter().enumerate() {
        if is_excluded_column(name) {
            log::debug!("Excluding column: {}", name);
            excluded.push(name.clone());
        } else {
            candidates.push(idx);
        }
    }
    log::debug!(
        "{} feature candidates, excluded columns: {:?}",
        candidates.len(),
        excluded
    );

    let numeric: Vec<usize> = candidates
        .into_iter()
        .filter(|&idx| is_numeric_column(table, idx))
        .collect();

    if numeric.len() < expected {
        return Err(IngestError::InsufficientFeatures {
            expected,
            found: numeric.len(),
            available: numeric.iter().map(|&idx| table.headers[idx].clone()).collect(),
        });
    }

    let chosen = &numeric[..expected];
    let selected = chosen.iter().map(|&idx| table.headers[idx].clone()).collect();
    let features = build_feature_matrix(table, chosen);

    Ok(ColumnSelection {
        selected,
        excluded,
        features,
    })
}

/// Missing cells take the median of their column over the whole batch.
pub fn build_feature_matrix(table: &RawTable, columns: &[usize]) -> Array2<f64> {
    let parsed: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|&idx| table.column(idx).map(coerce_numeric).collect())
        .collect();

    let medians: Vec<f64> = parsed
        .iter()
        .map(|cells| {
            let present: Vec<f64> = cells.iter().flatten().copied().collect();
            if present.len() < cells.len() {
                log::debug!("Filling {} missing values with the column median", cells.len() - present.len());
            }
            median(&present).unwrap_or(f64::NAN)
        })
        .collect();

    Array2::from_shape_fn((table.row_count(), columns.len()), |(row, col)| {
        parsed[col][row].unwrap_or(medians[col])
    })
}
