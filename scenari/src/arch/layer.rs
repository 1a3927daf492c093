use crate::{events::LayerEventSink, params::ParameterHost};

/// A layer of a network, as seen by the learning scenarios.
pub trait Layer: ParameterHost {
    /// The audit sink of the network this layer belongs to.
    fn network(&self) -> &dyn LayerEventSink;
}
