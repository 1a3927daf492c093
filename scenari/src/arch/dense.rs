use std::sync::Arc;

use ndarray::{Array1, Array2, ArrayD, ArrayView2, Axis, ErrorKind, Ix1, Ix2, ShapeError};

use super::Layer;
use crate::{
    Result, ScenarioErr,
    events::LayerEventSink,
    params::{Parameter, ParameterHost, Parameters},
    streams::{DEFAULT_STREAMS, MultiStreamVariable},
};

/// An affine layer, `y = x·W + b`.
///
/// The input of each stream's last forward pass is kept for its backward pass.
pub struct Dense {
    name: String,
    params: Parameters,
    weights: Arc<Parameter>,
    bias: Arc<Parameter>,
    network: Arc<dyn LayerEventSink>,

    // Forward metadata
    x: MultiStreamVariable<Array2<f32>>,
}

impl Dense {
    /// Creates a new `Dense` layer over the default streams.
    ///
    /// # Arguments
    /// * `name` - The name of the layer, its parameters are named after it.
    /// * `weights` - The initial weights, shaped `(inputs, outputs)`.
    /// * `bias` - The initial bias, one per output.
    /// * `network` - The audit sink of the owning network.
    ///
    /// # Returns
    /// A new `Dense` instance or a shape error if the bias doesn't match the weights.
    pub fn new(
        name: impl Into<String>,
        weights: Array2<f32>,
        bias: Array1<f32>,
        network: Arc<dyn LayerEventSink>,
    ) -> Result<Self> {
        Self::with_streams(name, weights, bias, network, DEFAULT_STREAMS)
    }

    /// Same as `Dense::new` with an explicit set of streams.
    pub fn with_streams<I, S>(
        name: impl Into<String>,
        weights: Array2<f32>,
        bias: Array1<f32>,
        network: Arc<dyn LayerEventSink>,
        streams: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();

        if weights.ncols() != bias.len() {
            return Err(ShapeError::from_kind(ErrorKind::IncompatibleShape).into());
        }

        let mut params = Parameters::new();
        let weights = params.insert(
            "weights",
            Parameter::new(format!("{name}.weights"), weights.into_dyn()),
        );
        let bias = params.insert(
            "bias",
            Parameter::with_tags(format!("{name}.bias"), [] as [&str; 0], bias.into_dyn()),
        );

        Ok(Self {
            name,
            params,
            weights,
            bias,
            network,
            x: MultiStreamVariable::new(streams),
        })
    }

    /// Makes a forward pass for `stream`.
    ///
    /// # Arguments
    /// * `stream` - The stream the input belongs to.
    /// * `x` - A batch of inputs, one per row.
    ///
    /// # Returns
    /// The outputs of the layer, one per row.
    pub fn forward(&mut self, stream: &str, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let w = self.weights.value().into_dimensionality::<Ix2>()?;
        let b = self.bias.value().into_dimensionality::<Ix1>()?;

        if x.ncols() != w.nrows() {
            return Err(ShapeError::from_kind(ErrorKind::IncompatibleShape).into());
        }

        let z = x.dot(&w) + &b;
        self.x.set(stream, x.to_owned())?;
        Ok(z)
    }

    /// Computes the gradient of every parameter given the gradient of the loss with respect to
    /// the outputs of `stream`'s last forward pass.
    ///
    /// # Arguments
    /// * `stream` - The stream to backpropagate.
    /// * `delta` - The gradient of the loss with respect to the outputs.
    ///
    /// # Returns
    /// The gradient of each parameter, keyed by parameter name.
    pub fn backward(
        &self,
        stream: &str,
        delta: ArrayView2<f32>,
    ) -> Result<Vec<(String, ArrayD<f32>)>> {
        let x = self
            .x
            .get(stream)?
            .ok_or_else(|| ScenarioErr::EmptyStream {
                stream: stream.to_string(),
            })?;

        let dw = x.t().dot(&delta);
        let db = delta.sum_axis(Axis(0));

        Ok(vec![
            (self.weights.name().to_string(), dw.into_dyn()),
            (self.bias.name().to_string(), db.into_dyn()),
        ])
    }

    pub fn weights(&self) -> &Arc<Parameter> {
        &self.weights
    }

    pub fn bias(&self) -> &Arc<Parameter> {
        &self.bias
    }
}

impl ParameterHost for Dense {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }
}

impl Layer for Dense {
    fn network(&self) -> &dyn LayerEventSink {
        self.network.as_ref()
    }
}
