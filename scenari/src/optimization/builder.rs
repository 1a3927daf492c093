use scenari_specs::{ChainSpec, ResolverSpec, ScenarioSpec};

use super::{Fixed, GradientDescent, LearningScenario, ScenarioChain, ScenarioSettings};
use crate::Result;

/// Builds learning scenarios given a specification.
#[derive(Default)]
pub struct ScenarioBuilder;

impl ScenarioBuilder {
    /// Creates a new `ScenarioBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new scenario following a spec.
    ///
    /// # Arguments
    /// * `spec` - The specification for the scenario.
    ///
    /// # Returns
    /// The scenario, or an error if one of its hyperparameters is invalid.
    pub fn build(&self, spec: &ScenarioSpec) -> Result<Box<dyn LearningScenario>> {
        match spec {
            ScenarioSpec::Fixed {
                apply_to,
                inheritable,
                conflict,
            } => {
                let fixed = Fixed::new();
                let settings =
                    self.resolve_settings(fixed.settings(), apply_to, *inheritable, *conflict);
                Ok(Box::new(fixed.with_settings(settings)))
            }
            ScenarioSpec::GradientDescent {
                learning_rate,
                momentum,
                reverse,
                apply_to,
                inheritable,
                conflict,
            } => {
                let gd = GradientDescent::new(*learning_rate, *momentum, *reverse)?;
                let settings =
                    self.resolve_settings(gd.settings(), apply_to, *inheritable, *conflict);
                Ok(Box::new(gd.with_settings(settings)))
            }
        }
    }

    /// Builds every scenario of the spec, keeping its order.
    pub fn build_chain(&self, spec: &ChainSpec) -> Result<ScenarioChain> {
        let mut chain = ScenarioChain::new();

        for scenario in &spec.scenarios {
            chain.push(self.build(scenario)?);
        }

        Ok(chain)
    }

    /// Parses a JSON `ChainSpec` and builds it.
    pub fn from_json(&self, json: &str) -> Result<ScenarioChain> {
        let spec: ChainSpec = serde_json::from_str(json)?;
        self.build_chain(&spec)
    }

    fn resolve_settings(
        &self,
        defaults: &ScenarioSettings,
        apply_to: &Option<Vec<String>>,
        inheritable: Option<bool>,
        conflict: Option<ResolverSpec>,
    ) -> ScenarioSettings {
        let mut settings = defaults.clone();

        if let Some(names) = apply_to {
            settings = settings.with_apply_to(names.iter().cloned());
        }

        if let Some(inheritable) = inheritable {
            settings = settings.with_inheritable(inheritable);
        }

        if let Some(conflict) = conflict {
            settings = settings.with_conflict(conflict.into());
        }

        settings
    }
}
