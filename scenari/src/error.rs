use std::{
    error::Error,
    fmt::{self, Display},
};

use ndarray::ShapeError;

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, ScenarioErr>;

/// The crate's error type.
#[derive(Debug)]
pub enum ScenarioErr {
    UnknownStream {
        stream: String,
    },
    EmptyStream {
        stream: String,
    },
    MissingParameter {
        entity: String,
        parameter: String,
    },
    IncompatibleLearningScenarios {
        scenario: &'static str,
        layer: String,
    },
    InvalidHyperParameter {
        name: &'static str,
        value: f32,
        reason: &'static str,
    },
    NoGradient {
        parameter: String,
    },
    GradientShapeMismatch {
        parameter: String,
        got: Vec<usize>,
        expected: Vec<usize>,
    },
    DanglingParameter {
        name: String,
    },
    Shape(ShapeError),
    InvalidSpec(String),
}

impl Display for ScenarioErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioErr::UnknownStream { stream } => {
                write!(f, "There is no stream by the name of: '{stream}'")
            }
            ScenarioErr::EmptyStream { stream } => {
                write!(f, "Stream '{stream}' holds no value")
            }
            ScenarioErr::MissingParameter { entity, parameter } => {
                write!(f, "{entity} has no parameter {parameter}")
            }
            ScenarioErr::IncompatibleLearningScenarios { scenario, layer } => write!(
                f,
                "Learning scenario: '{scenario}' is incompatible with previous updates (layer: '{layer}')"
            ),
            ScenarioErr::InvalidHyperParameter {
                name,
                value,
                reason,
            } => write!(f, "Invalid hyperparameter {name} = {value}: {reason}"),
            ScenarioErr::NoGradient { parameter } => {
                write!(f, "The loss has no gradient for parameter {parameter}")
            }
            ScenarioErr::GradientShapeMismatch {
                parameter,
                got,
                expected,
            } => write!(
                f,
                "Gradient of {parameter} has shape {got:?}, expected {expected:?}"
            ),
            ScenarioErr::DanglingParameter { name } => {
                write!(f, "Parameter {name} was dropped before its update was committed")
            }
            ScenarioErr::Shape(e) => write!(f, "shape error: {e}"),
            ScenarioErr::InvalidSpec(msg) => write!(f, "invalid scenario spec: {msg}"),
        }
    }
}

impl Error for ScenarioErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ScenarioErr::Shape(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShapeError> for ScenarioErr {
    fn from(value: ShapeError) -> Self {
        Self::Shape(value)
    }
}

impl From<serde_json::Error> for ScenarioErr {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidSpec(value.to_string())
    }
}
