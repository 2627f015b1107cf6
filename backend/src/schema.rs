/// Canonical column order of the Wisconsin diagnostic dataset. The scaler and
/// classifier consume features by position in this order.
pub const ALL_FEATURE_COLUMNS: [&str; 30] = [
    "radius_mean",
    "texture_mean",
    "perimeter_mean",
    "area_mean",
    "smoothness_mean",
    "compactness_mean",
    "concavity_mean",
    "concave_points_mean",
    "symmetry_mean",
    "fractal_dimension_mean",
    "radius_se",
    "texture_se",
    "perimeter_se",
    "area_se",
    "smoothness_se",
    "compactness_se",
    "concavity_se",
    "concave_points_se",
    "symmetry_se",
    "fractal_dimension_se",
    "radius_worst",
    "texture_worst",
    "perimeter_worst",
    "area_worst",
    "smoothness_worst",
    "compactness_worst",
    "concavity_worst",
    "concave_points_worst",
    "symmetry_worst",
    "fractal_dimension_worst",
];

pub const FULL_FEATURE_COUNT: usize = ALL_FEATURE_COLUMNS.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    names: &'static [&'static str],
}

impl FeatureSchema {
    pub fn full() -> Self {
        Self {
            names: &ALL_FEATURE_COLUMNS,
        }
    }

    /// Keeps the leading `expected_features` names. Assumes a model trained on
    /// fewer features used a prefix of the canonical order; nothing verifies it.
    pub fn truncated(expected_features: usize) -> Self {
        let len = expected_features.min(FULL_FEATURE_COUNT);
        Self {
            names: &ALL_FEATURE_COLUMNS[..len],
        }
    }

    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
