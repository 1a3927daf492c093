use ndarray::Array2;

use super::Dense;
use crate::{Result, ScenarioErr, grad::BackpropLoss, streams::CostFunction};

/// Mean squared error loss function.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mse;

impl Mse {
    /// Returns a new `Mse`.
    pub fn new() -> Self {
        Self
    }
}

impl CostFunction<Array2<f32>, Dense> for Mse {
    type Loss = BackpropLoss;

    fn apply(
        &self,
        layer: &Dense,
        target: Option<&Array2<f32>>,
        output: Option<&Array2<f32>>,
        stream: &str,
    ) -> Result<BackpropLoss> {
        let (Some(y), Some(y_pred)) = (target, output) else {
            return Err(ScenarioErr::EmptyStream {
                stream: stream.to_string(),
            });
        };

        let diff = y_pred - y;
        let loss = diff.mapv(|x| x.powi(2)).mean().unwrap_or_default();
        let delta = diff * (2.0 / y_pred.len() as f32);
        let grads = layer.backward(stream, delta.view())?;

        Ok(BackpropLoss::new(loss, grads))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ndarray::{arr1, arr2};

    use super::*;
    use crate::{events::LogSink, grad::GradientProvider};

    #[test]
    fn loss_and_gradients() {
        let mut layer = Dense::new(
            "dense",
            arr2(&[[1.0]]),
            arr1(&[0.0]),
            Arc::new(LogSink),
        )
        .unwrap();

        let x = arr2(&[[1.0], [2.0]]);
        let y = arr2(&[[2.0], [4.0]]);
        let y_pred = layer.forward("train", x.view()).unwrap();

        let loss = Mse::new()
            .apply(&layer, Some(&y), Some(&y_pred), "train")
            .unwrap();

        // diff = [-1, -2], mean of squares = 2.5, delta = diff * 2 / 2
        assert_eq!(loss.value(), 2.5);
        assert_eq!(
            loss.grad(layer.weights()).unwrap(),
            arr2(&[[-5.0]]).into_dyn()
        );
        assert_eq!(loss.grad(layer.bias()).unwrap(), arr1(&[-3.0]).into_dyn());
    }

    #[test]
    fn empty_streams_have_no_loss() {
        let layer = Dense::new("dense", arr2(&[[1.0]]), arr1(&[0.0]), Arc::new(LogSink)).unwrap();
        let y = arr2(&[[1.0]]);

        assert!(matches!(
            Mse::new().apply(&layer, Some(&y), None, "test"),
            Err(ScenarioErr::EmptyStream { stream }) if stream == "test"
        ));
    }
}
