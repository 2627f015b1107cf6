use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use super::{InferenceError, ParameterError};

/// On-disk classifier document, tagged by `kind`.
///
/// ```json
/// {"kind": "logistic_regression", "coefficients": [0.4, -1.2], "intercept": 0.1}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LogisticRegression { coefficients: Vec<f64>, intercept: f64 },
    LinearSvm { coefficients: Vec<f64>, intercept: f64 },
}

impl ClassifierArtifact {
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, ParameterError> {
        match self {
            ClassifierArtifact::LogisticRegression {
                coefficients,
                intercept,
            } => Ok(Box::new(LogisticRegression(LinearModel::new(
                coefficients,
                intercept,
            )?))),
            ClassifierArtifact::LinearSvm {
                coefficients,
                intercept,
            } => Ok(Box::new(LinearSvm(LinearModel::new(coefficients, intercept)?))),
        }
    }
}

/// Binary classifier over scaled feature rows. Labels are 1 (malignant) and 0 (benign).
pub trait Classifier: Send + Sync {
    fn n_features(&self) -> usize;

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>, InferenceError>;

    /// `None` when the model cannot estimate class probabilities.
    fn probability_estimator(&self) -> Option<&dyn ProbabilityEstimator> {
        None
    }
}

pub trait ProbabilityEstimator {
    /// One row per sample, columns ordered `[P(label 0), P(label 1)]`.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, InferenceError>;
}

#[derive(Debug, Clone)]
struct LinearModel {
    coefficients: Array1<f64>,
    intercept: f64,
}

impl LinearModel {
    fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self, ParameterError> {
        if coefficients.is_empty() {
            return Err(ParameterError::Empty {
                component: "classifier",
            });
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ParameterError::NonFinite {
                component: "classifier",
            });
        }
        Ok(Self {
            coefficients: Array1::from(coefficients),
            intercept,
        })
    }

    fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>, InferenceError> {
        if x.ncols() != self.coefficients.len() {
            return Err(InferenceError::FeatureMismatch {
                component: "the classifier",
                expected: self.coefficients.len(),
                got: x.ncols(),
            });
        }
        Ok(x.dot(&self.coefficients) + self.intercept)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>, InferenceError> {
        Ok(self
            .decision_function(x)?
            .mapv(|score| if score > 0.0 { 1 } else { 0 }))
    }
}

#[derive(Debug, Clone)]
pub struct LogisticRegression(LinearModel);

impl Classifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.0.coefficients.len()
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>, InferenceError> {
        self.0.predict(x)
    }

    fn probability_estimator(&self) -> Option<&dyn ProbabilityEstimator> {
        Some(self)
    }
}

impl ProbabilityEstimator for LogisticRegression {
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>, InferenceError> {
        let positive = self.0.decision_function(x)?.mapv(sigmoid);
        let negative = positive.mapv(|p| 1.0 - p);
        Ok(ndarray::stack(Axis(1), &[negative.view(), positive.view()])?)
    }
}

/// Decision function only; has no probability calibration.
#[derive(Debug, Clone)]
pub struct LinearSvm(LinearModel);

impl Classifier for LinearSvm {
    fn n_features(&self) -> usize {
        self.0.coefficients.len()
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>, InferenceError> {
        self.0.predict(x)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn logistic(coefficients: Vec<f64>, intercept: f64) -> Box<dyn Classifier> {
        ClassifierArtifact::LogisticRegression {
            coefficients,
            intercept,
        }
        .into_classifier()
        .unwrap()
    }

    #[test]
    fn logistic_predicts_sign_of_decision() {
        let model = logistic(vec![1.0, -1.0], 0.0);
        let labels = model.predict(&array![[2.0, 1.0], [1.0, 2.0]]).unwrap();
        assert_eq!(labels, array![1u8, 0u8]);
    }

    #[test]
    fn logistic_probabilities_sum_to_one() {
        let model = logistic(vec![0.5, 0.25], -0.1);
        let estimator = model.probability_estimator().expect("logistic exposes probabilities");
        let proba = estimator
            .predict_proba(&array![[1.0, 2.0], [-3.0, 0.5]])
            .unwrap();
        assert_eq!(proba.dim(), (2, 2));
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
            assert!(row.iter().all(|p| (0.0..=1.0).contains(p)));
        }
        // decision 0.5 + 0.5 - 0.1 > 0 favours label 1
        assert!(proba[[0, 1]] > proba[[0, 0]]);
    }

    #[test]
    fn svm_has_no_probability_estimator() {
        let model = ClassifierArtifact::LinearSvm {
            coefficients: vec![1.0],
            intercept: -1.0,
        }
        .into_classifier()
        .unwrap();
        assert!(model.probability_estimator().is_none());
        assert_eq!(model.predict(&array![[3.0], [0.5]]).unwrap(), array![1u8, 0u8]);
    }

    #[test]
    fn rejects_width_mismatch() {
        let model = logistic(vec![1.0, 1.0], 0.0);
        assert!(matches!(
            model.predict(&array![[1.0]]),
            Err(InferenceError::FeatureMismatch { expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn rejects_unusable_parameters() {
        assert!(matches!(
            ClassifierArtifact::LinearSvm {
                coefficients: vec![],
                intercept: 0.0,
            }
            .into_classifier(),
            Err(ParameterError::Empty {
                component: "classifier"
            })
        ));
        assert!(matches!(
            ClassifierArtifact::LogisticRegression {
                coefficients: vec![1.0, f64::NAN],
                intercept: 0.0,
            }
            .into_classifier(),
            Err(ParameterError::NonFinite { .. })
        ));
    }

    #[test]
    fn parses_tagged_json() {
        let artifact: ClassifierArtifact = serde_json::from_str(
            r#"{"kind":"linear_svm","coefficients":[1.0,2.0],"intercept":0.0}"#,
        )
        .unwrap();
        assert_eq!(artifact.into_classifier().unwrap().n_features(), 2);
    }
}
