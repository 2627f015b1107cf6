pub mod artifacts;
pub mod classifier;
pub mod scaler;

pub use artifacts::{ArtifactError, LoadedArtifacts};
pub use classifier::{Classifier, ClassifierArtifact, ProbabilityEstimator};
pub use scaler::{FeatureScaler, ScalerArtifact};

/// A deserialized artifact whose parameters cannot describe a usable model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    #[error("{component} has no parameters")]
    Empty { component: &'static str },
    #[error("scaler offset has {offset} entries but scale has {scale}")]
    LengthMismatch { offset: usize, scale: usize },
    #[error("scaler declares {declared} input features but carries {actual} parameters")]
    DeclaredWidth { declared: usize, actual: usize },
    #[error("{component} parameters must be finite")]
    NonFinite { component: &'static str },
}

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("X has {got} features, but {component} is expecting {expected} features as input")]
    FeatureMismatch {
        component: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("Input contains non-finite values")]
    NonFinite,
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
