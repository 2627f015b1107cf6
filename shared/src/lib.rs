use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Binary diagnosis produced by the classifier. Label 1 is malignant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum Diagnosis {
    Malignant,
    Benign,
}

impl Diagnosis {
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Diagnosis::Malignant
        } else {
            Diagnosis::Benign
        }
    }

    pub fn label(&self) -> u8 {
        match self {
            Diagnosis::Malignant => 1,
            Diagnosis::Benign => 0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PredictionResponse {
    pub prediction: Diagnosis,
    pub confidence: f64,
    pub status: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BatchPrediction {
    pub prediction: Diagnosis,
    pub confidence: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BatchPredictionResponse {
    pub predictions: Vec<BatchPrediction>,
    pub total_samples: usize,
    pub benign_count: usize,
    pub malignant_count: usize,
    pub features_used: usize,
    pub selected_columns: Vec<String>,
    pub excluded_columns: Vec<String>,
    pub original_columns: usize,
    pub delimiter_used: String,
    pub status: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub scaler_loaded: bool,
    pub expected_features: usize,
    pub feature_columns_available: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn label_mapping() {
        assert_eq!(Diagnosis::from_label(1), Diagnosis::Malignant);
        assert_eq!(Diagnosis::from_label(0), Diagnosis::Benign);
        assert_eq!(Diagnosis::Malignant.label(), 1);
        assert_eq!(Diagnosis::Benign.to_string(), "Benign");
        assert_eq!(Diagnosis::from_str("Malignant").unwrap(), Diagnosis::Malignant);
    }

    #[test]
    fn prediction_serializes_plain_label() {
        let response = PredictionResponse {
            prediction: Diagnosis::Malignant,
            confidence: 0.9,
            status: "success".into(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["prediction"], "Malignant");
        assert_eq!(value["status"], "success");
    }
}
