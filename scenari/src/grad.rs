use std::collections::HashMap;

use ndarray::ArrayD;

use crate::{Result, ScenarioErr, params::Parameter};

/// The differentiable side of a scalar loss: the tensor engine hands these to the scenarios so
/// they can ask for the gradient of the loss with respect to any parameter.
pub trait GradientProvider {
    /// Returns the scalar value of the loss.
    fn value(&self) -> f32;

    /// Computes the gradient of the loss with respect to `param`.
    ///
    /// # Arguments
    /// * `param` - The parameter to differentiate against.
    ///
    /// # Returns
    /// The gradient, shaped like the parameter, or an error if the loss does not depend on it.
    fn grad(&self, param: &Parameter) -> Result<ArrayD<f32>>;
}

/// A loss whose gradients were already computed by a backward pass, indexed by parameter name.
#[derive(Debug, Clone, Default)]
pub struct BackpropLoss {
    value: f32,
    grads: HashMap<String, ArrayD<f32>>,
}

impl BackpropLoss {
    /// Creates a new `BackpropLoss`.
    ///
    /// # Arguments
    /// * `value` - The scalar loss.
    /// * `grads` - The gradient of the loss for each parameter name.
    ///
    /// # Returns
    /// A new `BackpropLoss` instance.
    pub fn new<I>(value: f32, grads: I) -> Self
    where
        I: IntoIterator<Item = (String, ArrayD<f32>)>,
    {
        Self {
            value,
            grads: grads.into_iter().collect(),
        }
    }

    /// Adds `penalty` to the loss value and `grad` to the gradient of `param`, used to layer a
    /// regularization term on top of an existing loss.
    ///
    /// # Returns
    /// An error if `grad` is not shaped like the gradient already held for `param`, in which
    /// case the loss is left untouched.
    pub fn add_term(&mut self, param: &Parameter, penalty: f32, grad: ArrayD<f32>) -> Result<()> {
        let g = self
            .grads
            .entry(param.name().to_string())
            .or_insert_with(|| ArrayD::zeros(grad.raw_dim()));

        if g.shape() != grad.shape() {
            return Err(ScenarioErr::GradientShapeMismatch {
                parameter: param.name().to_string(),
                got: grad.shape().to_vec(),
                expected: g.shape().to_vec(),
            });
        }

        *g += &grad;
        self.value += penalty;
        Ok(())
    }
}

impl GradientProvider for BackpropLoss {
    fn value(&self) -> f32 {
        self.value
    }

    fn grad(&self, param: &Parameter) -> Result<ArrayD<f32>> {
        self.grads
            .get(param.name())
            .cloned()
            .ok_or_else(|| ScenarioErr::NoGradient {
                parameter: param.name().to_string(),
            })
    }
}
