mod parameter;
mod parameters;

pub use parameter::{DEFAULT_TAGS, Parameter, ShapeMismatch};
pub use parameters::{ParameterHost, Parameters};
