use super::{LearningScenario, ScenarioOutcome};
use crate::{Result, arch::Layer, grad::GradientProvider, params::ParameterHost};

/// An ordered list of learning scenarios applied one after the other to the same parameters.
///
/// Each scenario sees the outcome of the ones before it and merges its own with its conflict
/// resolver. Scenarios that don't apply to a parameter leave the outcome as it was.
#[derive(Default)]
pub struct ScenarioChain {
    scenarios: Vec<Box<dyn LearningScenario>>,
}

impl ScenarioChain {
    /// Creates a new empty `ScenarioChain`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `scenario` to the end of the chain.
    pub fn with<S>(mut self, scenario: S) -> Self
    where
        S: LearningScenario + 'static,
    {
        self.scenarios.push(Box::new(scenario));
        self
    }

    pub fn push(&mut self, scenario: Box<dyn LearningScenario>) {
        self.scenarios.push(scenario);
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn LearningScenario> {
        self.scenarios.iter().map(|s| s.as_ref())
    }

    /// Returns the scenarios a child layer would inherit, in chain order.
    pub fn inheritable(&self) -> impl Iterator<Item = &dyn LearningScenario> {
        self.iter().filter(|s| s.settings().is_inheritable())
    }

    /// Applies every scenario, in order, to the parameter `param_name` of `entity`.
    ///
    /// # Arguments
    /// * `layer` - The layer being trained.
    /// * `entity` - The owner of the parameter.
    /// * `param_name` - The name `entity` knows the parameter by.
    /// * `loss` - The loss to minimize.
    ///
    /// # Returns
    /// The merged outcome, or `None` if no scenario applied to the parameter.
    pub fn apply(
        &mut self,
        layer: &dyn Layer,
        entity: &dyn ParameterHost,
        param_name: &str,
        loss: &dyn GradientProvider,
    ) -> Result<Option<ScenarioOutcome>> {
        self.scenarios.iter_mut().try_fold(None, |acc, scenario| {
            let outcome = scenario.apply(layer, entity, param_name, loss, acc.as_ref())?;
            Ok(outcome.or(acc))
        })
    }

    /// Applies the chain to every parameter of `layer`.
    ///
    /// # Returns
    /// The outcome of each parameter some scenario applied to, in the layer's parameter order.
    pub fn optimize<L>(
        &mut self,
        layer: &L,
        loss: &dyn GradientProvider,
    ) -> Result<Vec<ScenarioOutcome>>
    where
        L: Layer,
    {
        let mut outcomes = Vec::with_capacity(layer.parameters().len());

        for name in layer.parameters().names() {
            if let Some(outcome) = self.apply(layer, layer, name, loss)? {
                outcomes.push(outcome);
            }
        }

        Ok(outcomes)
    }
}
