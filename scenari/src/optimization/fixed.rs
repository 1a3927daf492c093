use std::sync::Arc;

use serde_json::Value;

use super::{
    ConflictResolver, LearningScenario, RunContext, ScenarioOutcome, ScenarioSettings, UpdateRecord,
};
use crate::{Result, grad::GradientProvider, params::Parameter};

/// No learning, the parameters stay fixed.
///
/// Its outcome carries neither a new value nor a gradient. By default it overwrites whatever
/// was scheduled before it and is not inherited.
#[derive(Debug, Clone)]
pub struct Fixed {
    settings: ScenarioSettings,
}

impl Fixed {
    /// Creates a new `Fixed` scenario with its default settings.
    pub fn new() -> Self {
        let settings = ScenarioSettings::new()
            .with_inheritable(false)
            .with_conflict(ConflictResolver::OVERWRITE);

        Self { settings }
    }

    pub fn with_settings(mut self, settings: ScenarioSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl Default for Fixed {
    fn default() -> Self {
        Self::new()
    }
}

impl LearningScenario for Fixed {
    fn kind(&self) -> &'static str {
        "Fixed"
    }

    fn settings(&self) -> &ScenarioSettings {
        &self.settings
    }

    fn hyper_parameters(&self) -> Value {
        self.settings.hyper_parameters()
    }

    fn run(
        &mut self,
        param: &Arc<Parameter>,
        _: &dyn GradientProvider,
        ctx: &RunContext<'_>,
    ) -> Result<ScenarioOutcome> {
        let record = UpdateRecord::new(param, ctx.param_name, None, None);
        Ok(ScenarioOutcome::new(record))
    }
}
