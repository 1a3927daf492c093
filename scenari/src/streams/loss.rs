use super::{MultiStreamVariable, Targets};
use crate::{Result, ScenarioErr, arch::Layer};

/// Computes the scalar loss of a layer for a single stream.
pub trait CostFunction<T, Ly: ?Sized = dyn Layer> {
    type Loss;

    /// Computes the loss of `layer` on `stream`.
    ///
    /// # Arguments
    /// * `layer` - The layer whose outputs are measured.
    /// * `target` - The expected output for the stream, if any.
    /// * `output` - The layer's output for the stream, if any.
    /// * `stream` - The name of the stream.
    ///
    /// # Returns
    /// The loss or an error if it can't be computed.
    fn apply(
        &self,
        layer: &Ly,
        target: Option<&T>,
        output: Option<&T>,
        stream: &str,
    ) -> Result<Self::Loss>;
}

/// The losses of a layer, one per stream of its targets, computed eagerly on construction.
#[derive(Debug)]
pub struct StreamLoss<T, C, L> {
    layer: String,
    cost: C,
    targets: Targets<T>,
    outputs: MultiStreamVariable<T>,
    store: MultiStreamVariable<L>,
}

impl<T, C, L> StreamLoss<T, C, L> {
    /// Creates a new `StreamLoss` computing the loss of every target stream.
    ///
    /// # Arguments
    /// * `layer` - The layer the losses belong to.
    /// * `cost` - The cost function.
    /// * `targets` - The expected outputs.
    /// * `outputs` - The layer's outputs, must declare every stream `targets` declares.
    ///
    /// # Returns
    /// A new `StreamLoss` instance or the first error the cost function raised.
    pub fn new<Ly>(
        layer: &Ly,
        cost: C,
        targets: Targets<T>,
        outputs: MultiStreamVariable<T>,
    ) -> Result<Self>
    where
        Ly: Layer + ?Sized,
        C: CostFunction<T, Ly, Loss = L>,
    {
        let mut store = MultiStreamVariable::new(targets.streams().iter().cloned());

        for (stream, target) in targets.iter() {
            let output = outputs.get(stream)?;
            let loss = cost.apply(layer, target, output, stream)?;
            store.set(stream, loss)?;
        }

        Ok(Self {
            layer: layer.name().to_string(),
            cost,
            targets,
            outputs,
            store,
        })
    }

    /// Returns the loss of `stream`.
    pub fn get(&self, stream: &str) -> Result<&L> {
        self.store
            .get(stream)?
            .ok_or_else(|| ScenarioErr::EmptyStream {
                stream: stream.to_string(),
            })
    }

    pub fn get_mut(&mut self, stream: &str) -> Result<&mut L> {
        self.store
            .get_mut(stream)?
            .ok_or_else(|| ScenarioErr::EmptyStream {
                stream: stream.to_string(),
            })
    }

    /// Overwrites the loss of `stream`, e.g. to add a regularization term.
    ///
    /// # Returns
    /// The loss that was replaced.
    pub fn set(&mut self, stream: &str, loss: L) -> Result<Option<L>> {
        self.store.set(stream, loss)
    }

    pub fn streams(&self) -> &[String] {
        self.store.streams()
    }

    pub fn layer_name(&self) -> &str {
        &self.layer
    }

    pub fn cost(&self) -> &C {
        &self.cost
    }

    pub fn targets(&self) -> &Targets<T> {
        &self.targets
    }

    pub fn outputs(&self) -> &MultiStreamVariable<T> {
        &self.outputs
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::{
        events::{LayerEventSink, LogSink},
        params::{ParameterHost, Parameters},
    };

    struct Probe {
        params: Parameters,
    }

    impl ParameterHost for Probe {
        fn name(&self) -> &str {
            "probe"
        }

        fn parameters(&self) -> &Parameters {
            &self.params
        }
    }

    impl Layer for Probe {
        fn network(&self) -> &dyn LayerEventSink {
            &LogSink
        }
    }

    /// Absolute difference, remembering every call it gets.
    #[derive(Default)]
    struct AbsDiff {
        calls: RefCell<Vec<String>>,
    }

    impl CostFunction<f32, Probe> for AbsDiff {
        type Loss = f32;

        fn apply(
            &self,
            layer: &Probe,
            target: Option<&f32>,
            output: Option<&f32>,
            stream: &str,
        ) -> Result<f32> {
            self.calls.borrow_mut().push(format!("{}:{stream}", layer.name()));
            Ok((target.copied().unwrap_or(0.) - output.copied().unwrap_or(0.)).abs())
        }
    }

    fn probe() -> Probe {
        Probe {
            params: Parameters::new(),
        }
    }

    fn targets() -> Targets<f32> {
        let mut targets = Targets::from(MultiStreamVariable::new(["train", "test"]));
        targets.set("train", 1.0).unwrap();
        targets.set("test", 3.0).unwrap();
        targets
    }

    #[test]
    fn one_loss_per_stream_on_construction() {
        let layer = probe();
        let mut outputs = MultiStreamVariable::new(["train", "test"]);
        outputs.set("train", 0.5).unwrap();
        outputs.set("test", 5.0).unwrap();

        let losses = StreamLoss::new(&layer, AbsDiff::default(), targets(), outputs)
            .unwrap();

        assert_eq!(losses.streams(), ["train", "test"]);
        assert_eq!(*losses.get("train").unwrap(), 0.5);
        assert_eq!(*losses.get("test").unwrap(), 2.0);
        assert_eq!(*losses.cost().calls.borrow(), ["probe:train", "probe:test"]);
        assert_eq!(losses.layer_name(), "probe");
    }

    #[test]
    fn losses_can_be_overwritten() {
        let layer = probe();
        let outputs = MultiStreamVariable::new(["train", "test"]);
        let mut losses =
            StreamLoss::new(&layer, AbsDiff::default(), targets(), outputs)
                .unwrap();

        assert_eq!(losses.set("train", 10.0).unwrap(), Some(1.0));
        *losses.get_mut("test").unwrap() += 1.0;

        assert_eq!(*losses.get("train").unwrap(), 10.0);
        assert_eq!(*losses.get("test").unwrap(), 4.0);
        assert!(losses.get("validation").is_err());
    }

    #[test]
    fn outputs_missing_a_target_stream_fail() {
        let layer = probe();
        let outputs = MultiStreamVariable::new(["train"]);

        let result = StreamLoss::new(&layer, AbsDiff::default(), targets(), outputs);
        assert!(matches!(
            result,
            Err(ScenarioErr::UnknownStream { stream }) if stream == "test"
        ));
    }
}
