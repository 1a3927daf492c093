mod loss;
mod variable;

pub use loss::{CostFunction, StreamLoss};
pub use variable::{DEFAULT_STREAMS, Inputs, MultiStreamVariable, Targets};
