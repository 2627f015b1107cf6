//! Fixtures shared by the unit tests.

use serde_json::{Map, Value};

use crate::model::{ClassifierArtifact, FeatureScaler, LoadedArtifacts, ScalerArtifact};
use crate::schema::ALL_FEATURE_COLUMNS;

/// First record of the Wisconsin diagnostic dataset, canonical order.
pub const SAMPLE_VALUES: [f64; 30] = [
    17.99, 10.38, 122.8, 1001.0, 0.1184, 0.2776, 0.3001, 0.1471, 0.2419, 0.07871, 1.095, 0.9053,
    8.589, 153.4, 0.006399, 0.04904, 0.05373, 0.01587, 0.03003, 0.006193, 25.38, 17.33, 184.6,
    2019.0, 0.1622, 0.6656, 0.7119, 0.2654, 0.4601, 0.1189,
];

fn identity_scaler(n: usize) -> FeatureScaler {
    FeatureScaler::from_artifact(ScalerArtifact::Standard {
        mean: vec![0.0; n],
        scale: vec![1.0; n],
        n_features_in: Some(n),
    })
    .unwrap()
}

/// Logistic regression with every coefficient equal to `weight` behind an
/// identity scaler.
pub fn fixture_artifacts(n: usize, weight: f64) -> LoadedArtifacts {
    let model = ClassifierArtifact::LogisticRegression {
        coefficients: vec![weight; n],
        intercept: 0.0,
    }
    .into_classifier()
    .unwrap();
    LoadedArtifacts::from_parts(model, identity_scaler(n)).unwrap()
}

pub fn svm_artifacts(n: usize) -> LoadedArtifacts {
    let model = ClassifierArtifact::LinearSvm {
        coefficients: vec![0.01; n],
        intercept: 0.0,
    }
    .into_classifier()
    .unwrap();
    LoadedArtifacts::from_parts(model, identity_scaler(n)).unwrap()
}

pub fn sample_record() -> Value {
    let map: Map<String, Value> = ALL_FEATURE_COLUMNS
        .iter()
        .zip(SAMPLE_VALUES)
        .map(|(name, value)| (name.to_string(), Value::from(value)))
        .collect();
    Value::Object(map)
}

/// `Patient_ID`, the 30 feature columns, then `Diagnosis`.
pub fn feature_csv(rows: usize) -> String {
    let mut csv = format!("Patient_ID,{},Diagnosis\n", ALL_FEATURE_COLUMNS.join(","));
    for row in 0..rows {
        let factor = 1.0 + row as f64 * 0.1;
        let values: Vec<String> = SAMPLE_VALUES
            .iter()
            .map(|v| format!("{}", v * factor))
            .collect();
        let diagnosis = if row % 2 == 0 { "M" } else { "B" };
        csv.push_str(&format!("{},{},{}\n", 842302 + row, values.join(","), diagnosis));
    }
    csv
}
