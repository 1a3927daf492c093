use std::{collections::BTreeSet, sync::Arc};

use serde_json::{Value, json};

use super::{ConflictResolver, ScenarioOutcome};
use crate::{
    Result, ScenarioErr,
    arch::Layer,
    grad::GradientProvider,
    params::{Parameter, ParameterHost},
};

/// The settings every learning scenario shares.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSettings {
    apply_to: Option<BTreeSet<String>>,
    inheritable: bool,
    conflict: ConflictResolver,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            apply_to: None,
            inheritable: true,
            conflict: ConflictResolver::DIE,
        }
    }
}

impl ScenarioSettings {
    /// Creates the default settings: applies to every parameter, inheritable, and conflicts
    /// are errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the scenario to the parameters named in `names`.
    pub fn with_apply_to<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apply_to = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_inheritable(mut self, inheritable: bool) -> Self {
        self.inheritable = inheritable;
        self
    }

    pub fn with_conflict(mut self, conflict: ConflictResolver) -> Self {
        self.conflict = conflict;
        self
    }

    pub fn apply_to(&self) -> Option<&BTreeSet<String>> {
        self.apply_to.as_ref()
    }

    pub fn is_inheritable(&self) -> bool {
        self.inheritable
    }

    pub fn conflict(&self) -> ConflictResolver {
        self.conflict
    }

    /// Whether a scenario with these settings acts on the parameter `name`.
    pub fn applies_to(&self, name: &str) -> bool {
        self.apply_to
            .as_ref()
            .is_none_or(|names| names.contains(name))
    }

    /// The settings as a JSON object, for audit logs.
    pub fn hyper_parameters(&self) -> Value {
        json!({
            "apply_to": self.apply_to,
            "inheritable": self.inheritable,
            "conflict": self.conflict.resolution().to_string(),
        })
    }
}

/// Everything `LearningScenario::run` may need besides the parameter and the loss.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    pub layer: &'a dyn Layer,
    pub entity: &'a dyn ParameterHost,
    pub param_name: &'a str,
    pub previous: Option<&'a ScenarioOutcome>,
}

/// A parameter update policy.
///
/// Scenarios only compute updates, writing them into the parameters is up to the caller (see
/// `ScenarioOutcome::commit`).
pub trait LearningScenario {
    /// The name of the scenario, used in diagnostics.
    fn kind(&self) -> &'static str;

    fn settings(&self) -> &ScenarioSettings;

    /// The hyperparameters of the scenario, settings included.
    fn hyper_parameters(&self) -> Value;

    /// Computes the update of `param`.
    ///
    /// # Arguments
    /// * `param` - The parameter to update.
    /// * `loss` - The loss to minimize.
    /// * `ctx` - Where the parameter comes from and what was computed for it before.
    ///
    /// # Returns
    /// The outcome of the scenario for this parameter.
    fn run(
        &mut self,
        param: &Arc<Parameter>,
        loss: &dyn GradientProvider,
        ctx: &RunContext<'_>,
    ) -> Result<ScenarioOutcome>;

    /// Applies the scenario to the parameter `param_name` of `entity`.
    ///
    /// # Arguments
    /// * `layer` - The layer being trained.
    /// * `entity` - The owner of the parameter, usually `layer` itself.
    /// * `param_name` - The name `entity` knows the parameter by.
    /// * `loss` - The loss to minimize.
    /// * `previous` - The outcome of the scenarios chained before this one, if any.
    ///
    /// # Returns
    /// `None` if the scenario does not apply to the parameter, otherwise its outcome merged
    /// with `previous` through the configured conflict resolver.
    fn apply(
        &mut self,
        layer: &dyn Layer,
        entity: &dyn ParameterHost,
        param_name: &str,
        loss: &dyn GradientProvider,
        previous: Option<&ScenarioOutcome>,
    ) -> Result<Option<ScenarioOutcome>> {
        if !self.settings().applies_to(param_name) {
            return Ok(None);
        }

        let message = format!(
            "{} uses optimizer {} of layer {}",
            entity.name(),
            self.kind(),
            layer.name()
        );
        layer
            .network()
            .log_layer_event(layer.name(), &message, &self.hyper_parameters());

        let param = entity.parameters().get(param_name).cloned().ok_or_else(|| {
            ScenarioErr::MissingParameter {
                entity: entity.name().to_string(),
                parameter: param_name.to_string(),
            }
        })?;

        let ctx = RunContext {
            layer,
            entity,
            param_name,
            previous,
        };
        let outcome = self.run(&param, loss, &ctx)?;

        let Some(previous) = previous else {
            return Ok(Some(outcome));
        };

        self.settings()
            .conflict()
            .resolve(previous, outcome)
            .map(Some)
            .map_err(|_| ScenarioErr::IncompatibleLearningScenarios {
                scenario: self.kind(),
                layer: layer.name().to_string(),
            })
    }
}
