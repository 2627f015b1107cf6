use ndarray::Array2;
use serde_json::{Map, Value};

use super::{classify, PredictionError, PredictionResult};
use crate::model::{InferenceError, LoadedArtifacts};
use crate::schema::FeatureSchema;

/// Missing names beyond this many are elided from the error message.
const MAX_LISTED_MISSING: usize = 5;

enum FieldValue {
    Missing,
    Number(f64),
    Invalid,
}

fn field_value(value: Option<&Value>) -> FieldValue {
    match value {
        None | Some(Value::Null) => FieldValue::Missing,
        Some(Value::String(s)) if s.trim().is_empty() => FieldValue::Missing,
        Some(Value::String(s)) => parse_finite(s.trim()),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => FieldValue::Number(v),
            _ => FieldValue::Invalid,
        },
        Some(Value::Bool(b)) => FieldValue::Number(if *b { 1.0 } else { 0.0 }),
        Some(Value::Array(_)) | Some(Value::Object(_)) => FieldValue::Invalid,
    }
}

fn parse_finite(s: &str) -> FieldValue {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => FieldValue::Number(v),
        _ => FieldValue::Invalid,
    }
}

/// Pulls the schema's features out of `record` in schema order.
pub fn extract_features(
    schema: FeatureSchema,
    record: &Map<String, Value>,
) -> Result<Vec<f64>, PredictionError> {
    let mut features = Vec::with_capacity(schema.len());
    let mut missing = Vec::new();

    for &name in schema.names() {
        match field_value(record.get(name)) {
            FieldValue::Number(v) => features.push(v),
            FieldValue::Missing => missing.push(name),
            FieldValue::Invalid => {
                return Err(PredictionError::BadRequest(format!(
                    "Invalid value for {}. Please enter a valid number.",
                    name
                )));
            }
        }
    }

    if !missing.is_empty() {
        log::warn!("Missing features: {:?}", missing);
        return Err(PredictionError::BadRequest(missing_features_message(&missing)));
    }
    Ok(features)
}

fn missing_features_message(missing: &[&str]) -> String {
    let listed = &missing[..missing.len().min(MAX_LISTED_MISSING)];
    let ellipsis = if missing.len() > MAX_LISTED_MISSING { "..." } else { "" };
    format!("Missing required features: {}{}", listed.join(", "), ellipsis)
}

pub fn predict_single(
    artifacts: &LoadedArtifacts,
    input: &Value,
) -> Result<PredictionResult, PredictionError> {
    let (scaler, model) = artifacts
        .ready()
        .ok_or(PredictionError::ServiceUnavailable)?;

    let record = match input {
        Value::Object(map) if !map.is_empty() => map,
        _ => {
            return Err(PredictionError::BadRequest(
                "No data provided. Please fill all required fields.".to_string(),
            ));
        }
    };
    log::debug!("Received {} features", record.len());

    let features = extract_features(artifacts.schema(), record)?;
    let matrix =
        Array2::from_shape_vec((1, features.len()), features).map_err(InferenceError::from)?;

    classify(scaler, model, &matrix)?
        .pop()
        .ok_or_else(|| PredictionError::Internal("classifier returned no prediction".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::DEFAULT_CONFIDENCE;
    use crate::schema::ALL_FEATURE_COLUMNS;
    use crate::test_support::{fixture_artifacts, sample_record, svm_artifacts};
    use serde_json::json;
    use shared::Diagnosis;

    #[test]
    fn valid_record_yields_label_and_confidence() {
        let artifacts = fixture_artifacts(30, 0.01);
        let result = predict_single(&artifacts, &sample_record()).unwrap();
        assert_eq!(result.diagnosis, Diagnosis::Malignant);
        assert!((0.0..=1.0).contains(&result.confidence));

        let artifacts = fixture_artifacts(30, -0.01);
        let result = predict_single(&artifacts, &sample_record()).unwrap();
        assert_eq!(result.diagnosis, Diagnosis::Benign);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let artifacts = fixture_artifacts(30, 0.01);
        let record = sample_record();
        let first = predict_single(&artifacts, &record).unwrap();
        let second = predict_single(&artifacts, &record).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn default_confidence_for_svm() {
        let artifacts = svm_artifacts(30);
        let result = predict_single(&artifacts, &sample_record()).unwrap();
        assert_eq!(result.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn unloaded_artifacts_are_unavailable() {
        let artifacts = LoadedArtifacts::unloaded();
        assert!(matches!(
            predict_single(&artifacts, &sample_record()),
            Err(PredictionError::ServiceUnavailable)
        ));
    }

    #[test]
    fn empty_or_non_object_input_has_no_data() {
        let artifacts = fixture_artifacts(30, 0.01);
        for input in [json!({}), json!(null), json!([1, 2, 3])] {
            let err = predict_single(&artifacts, &input).unwrap_err();
            assert_eq!(
                err.to_string(),
                "No data provided. Please fill all required fields."
            );
        }
    }

    #[test]
    fn missing_features_are_listed_with_ellipsis() {
        let artifacts = fixture_artifacts(30, 0.01);
        let mut record = sample_record();
        let map = record.as_object_mut().unwrap();
        for name in &ALL_FEATURE_COLUMNS[..7] {
            map.remove(*name);
        }
        let err = predict_single(&artifacts, &record).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required features: radius_mean, texture_mean, perimeter_mean, area_mean, smoothness_mean..."
        );
    }

    #[test]
    fn null_and_blank_count_as_missing() {
        let artifacts = fixture_artifacts(30, 0.01);
        let mut record = sample_record();
        record["area_se"] = Value::Null;
        record["symmetry_worst"] = json!("  ");
        let err = predict_single(&artifacts, &record).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required features: area_se, symmetry_worst"
        );
    }

    #[test]
    fn non_numeric_value_names_the_feature() {
        let artifacts = fixture_artifacts(30, 0.01);
        let mut record = sample_record();
        record["texture_mean"] = json!("twenty");
        let err = predict_single(&artifacts, &record).unwrap_err();
        assert!(matches!(err, PredictionError::BadRequest(_)));
        assert_eq!(
            err.to_string(),
            "Invalid value for texture_mean. Please enter a valid number."
        );
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let artifacts = fixture_artifacts(30, 0.01);
        let mut record = sample_record();
        record["radius_mean"] = json!(" 14.2 ");
        assert!(predict_single(&artifacts, &record).is_ok());
    }

    #[test]
    fn truncated_schema_only_needs_leading_features() {
        let artifacts = fixture_artifacts(10, 0.01);
        let record: Map<String, Value> = ALL_FEATURE_COLUMNS[..10]
            .iter()
            .map(|name| (name.to_string(), json!(1.5)))
            .collect();
        let result = predict_single(&artifacts, &Value::Object(record)).unwrap();
        assert_eq!(result.diagnosis, Diagnosis::Malignant);
    }
}
