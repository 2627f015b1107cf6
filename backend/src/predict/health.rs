use shared::HealthResponse;

use crate::model::LoadedArtifacts;

pub fn health_report(artifacts: &LoadedArtifacts) -> HealthResponse {
    HealthResponse {
        status: "healthy".to_string(),
        model_loaded: artifacts.model().is_some(),
        scaler_loaded: artifacts.scaler().is_some(),
        expected_features: artifacts.expected_features(),
        feature_columns_available: artifacts.schema().len(),
    }
}
