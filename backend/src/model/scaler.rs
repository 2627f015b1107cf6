use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::{InferenceError, ParameterError};

/// On-disk scaler document, tagged by `kind`.
///
/// ```json
/// {"kind": "standard", "mean": [14.1, 19.3], "scale": [3.5, 4.3]}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    /// `(x - mean) / scale`
    Standard {
        mean: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default)]
        n_features_in: Option<usize>,
    },
    /// `x * scale + min`
    MinMax {
        min: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default)]
        n_features_in: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalingMethod {
    Standard,
    MinMax,
}

#[derive(Debug, Clone)]
pub struct FeatureScaler {
    method: ScalingMethod,
    offset: Array1<f64>,
    scale: Array1<f64>,
}

impl FeatureScaler {
    pub fn from_artifact(artifact: ScalerArtifact) -> Result<Self, ParameterError> {
        let (method, offset, scale, declared) = match artifact {
            ScalerArtifact::Standard {
                mean,
                scale,
                n_features_in,
            } => (ScalingMethod::Standard, mean, scale, n_features_in),
            ScalerArtifact::MinMax {
                min,
                scale,
                n_features_in,
            } => (ScalingMethod::MinMax, min, scale, n_features_in),
        };

        if offset.is_empty() {
            return Err(ParameterError::Empty {
                component: "scaler",
            });
        }
        if offset.len() != scale.len() {
            return Err(ParameterError::LengthMismatch {
                offset: offset.len(),
                scale: scale.len(),
            });
        }
        if let Some(declared) = declared {
            if declared != offset.len() {
                return Err(ParameterError::DeclaredWidth {
                    declared,
                    actual: offset.len(),
                });
            }
        }
        if offset.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err(ParameterError::NonFinite {
                component: "scaler",
            });
        }

        // Zero-variance features are left unscaled.
        let scale = match method {
            ScalingMethod::Standard => scale
                .into_iter()
                .map(|s| if s == 0.0 { 1.0 } else { s })
                .collect(),
            ScalingMethod::MinMax => scale,
        };

        Ok(Self {
            method,
            offset: Array1::from(offset),
            scale: Array1::from(scale),
        })
    }

    pub fn method(&self) -> ScalingMethod {
        self.method
    }

    pub fn n_features_in(&self) -> usize {
        self.offset.len()
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, InferenceError> {
        if x.ncols() != self.n_features_in() {
            return Err(InferenceError::FeatureMismatch {
                component: "the scaler",
                expected: self.n_features_in(),
                got: x.ncols(),
            });
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::NonFinite);
        }

        let scaled = match self.method {
            ScalingMethod::Standard => (x - &self.offset) / &self.scale,
            ScalingMethod::MinMax => x * &self.scale + &self.offset,
        };
        // Finite inputs can still overflow.
        if !scaled.iter().all(|v| v.is_finite()) {
            return Err(InferenceError::NonFinite);
        }
        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn standard(mean: Vec<f64>, scale: Vec<f64>) -> FeatureScaler {
        FeatureScaler::from_artifact(ScalerArtifact::Standard {
            mean,
            scale,
            n_features_in: None,
        })
        .unwrap()
    }

    #[test]
    fn standard_scaling_centers_and_divides() {
        let scaler = standard(vec![1.0, 10.0], vec![2.0, 5.0]);
        let scaled = scaler.transform(&array![[3.0, 20.0], [1.0, 0.0]]).unwrap();
        assert_eq!(scaled, array![[1.0, 2.0], [0.0, -2.0]]);
    }

    #[test]
    fn zero_scale_is_treated_as_unit() {
        let scaler = standard(vec![0.0], vec![0.0]);
        assert_eq!(scaler.transform(&array![[4.0]]).unwrap(), array![[4.0]]);
    }

    #[test]
    fn min_max_scaling() {
        let scaler = FeatureScaler::from_artifact(ScalerArtifact::MinMax {
            min: vec![-1.0],
            scale: vec![0.5],
            n_features_in: Some(1),
        })
        .unwrap();
        assert_eq!(scaler.method(), ScalingMethod::MinMax);
        assert_eq!(scaler.transform(&array![[4.0]]).unwrap(), array![[1.0]]);
    }

    #[test]
    fn rejects_wrong_width() {
        let scaler = standard(vec![0.0, 0.0], vec![1.0, 1.0]);
        let err = scaler.transform(&array![[1.0, 2.0, 3.0]]).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::FeatureMismatch {
                expected: 2,
                got: 3,
                ..
            }
        ));
    }

    #[test]
    fn rejects_inconsistent_artifacts() {
        assert_eq!(
            FeatureScaler::from_artifact(ScalerArtifact::Standard {
                mean: vec![0.0, 1.0],
                scale: vec![1.0],
                n_features_in: None,
            })
            .unwrap_err(),
            ParameterError::LengthMismatch {
                offset: 2,
                scale: 1
            }
        );
        assert_eq!(
            FeatureScaler::from_artifact(ScalerArtifact::Standard {
                mean: vec![0.0],
                scale: vec![1.0],
                n_features_in: Some(3),
            })
            .unwrap_err(),
            ParameterError::DeclaredWidth {
                declared: 3,
                actual: 1
            }
        );
        assert_eq!(
            FeatureScaler::from_artifact(ScalerArtifact::MinMax {
                min: vec![],
                scale: vec![],
                n_features_in: None,
            })
            .unwrap_err(),
            ParameterError::Empty {
                component: "scaler"
            }
        );
    }

    #[test]
    fn overflow_during_scaling_is_rejected() {
        let scaler = standard(vec![-1e308], vec![1.0]);
        assert!(matches!(
            scaler.transform(&array![[1e308]]),
            Err(InferenceError::NonFinite)
        ));

        let scaler = FeatureScaler::from_artifact(ScalerArtifact::MinMax {
            min: vec![0.0],
            scale: vec![1e300],
            n_features_in: None,
        })
        .unwrap();
        assert!(matches!(
            scaler.transform(&array![[1e10]]),
            Err(InferenceError::NonFinite)
        ));
    }

    #[test]
    fn parses_tagged_json() {
        let artifact: ScalerArtifact =
            serde_json::from_str(r#"{"kind":"standard","mean":[1.0],"scale":[2.0]}"#).unwrap();
        assert_eq!(FeatureScaler::from_artifact(artifact).unwrap().n_features_in(), 1);
    }
}
