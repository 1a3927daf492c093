use std::{
    collections::HashMap,
    sync::{Arc, Weak},
};

use log::debug;
use ndarray::ArrayD;
use serde_json::{Value, json};

use super::{LearningScenario, RunContext, ScenarioOutcome, ScenarioSettings, UpdateRecord};
use crate::{Result, ScenarioErr, grad::GradientProvider, params::Parameter};

/// Gradient descent with a fixed learning rate and optional momentum.
///
/// With momentum, every parameter gets a velocity buffer owned by this scenario. The buffer is
/// a co-parameter: its update travels in the same outcome as the parameter's.
#[derive(Debug)]
pub struct GradientDescent {
    settings: ScenarioSettings,
    learning_rate: f32,
    momentum: f32,
    reverse: bool,
    velocities: HashMap<String, Velocity>,
}

/// A velocity buffer and the parameter it tracks.
#[derive(Debug)]
struct Velocity {
    owner: Weak<Parameter>,
    buffer: Arc<Parameter>,
}

impl GradientDescent {
    /// Creates a new `GradientDescent` scenario with the default settings.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps, must be finite and positive.
    /// * `momentum` - How much of the previous step is kept, in `[0, 1)`. Zero disables it.
    /// * `reverse` - Whether to climb the gradient instead of descending it.
    ///
    /// # Returns
    /// A new `GradientDescent` instance or an error if a hyperparameter is out of range.
    pub fn new(learning_rate: f32, momentum: f32, reverse: bool) -> Result<Self> {
        if !learning_rate.is_finite() || learning_rate <= 0. {
            return Err(ScenarioErr::InvalidHyperParameter {
                name: "learning_rate",
                value: learning_rate,
                reason: "must be finite and positive",
            });
        }

        if !(0. ..1.).contains(&momentum) {
            return Err(ScenarioErr::InvalidHyperParameter {
                name: "momentum",
                value: momentum,
                reason: "must be in [0, 1)",
            });
        }

        Ok(Self {
            settings: ScenarioSettings::new(),
            learning_rate,
            momentum,
            reverse,
            velocities: HashMap::new(),
        })
    }

    pub fn with_settings(mut self, settings: ScenarioSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn momentum(&self) -> f32 {
        self.momentum
    }

    pub fn is_reversed(&self) -> bool {
        self.reverse
    }

    /// Returns the velocity buffer of the parameter named `param_name`, if one was created.
    pub fn velocity(&self, param_name: &str) -> Option<&Arc<Parameter>> {
        self.velocities.get(param_name).map(|v| &v.buffer)
    }

    /// Returns the velocity buffer for `param`. A buffer tracking another parameter, or one
    /// whose shape went stale, is replaced by a zeroed one.
    fn velocity_for(&mut self, param: &Arc<Parameter>) -> Arc<Parameter> {
        let shape = param.shape();

        match self.velocities.get(param.name()) {
            Some(v)
                if Weak::as_ptr(&v.owner) == Arc::as_ptr(param) && v.buffer.shape() == shape =>
            {
                return Arc::clone(&v.buffer);
            }
            _ => {}
        }

        let name = format!("momentum.{}", param.name());
        debug!("creating velocity buffer {name} with shape {shape:?}");

        let buffer = Arc::new(Parameter::with_tags(
            name,
            [] as [&str; 0],
            ArrayD::zeros(shape),
        ));
        self.velocities.insert(
            param.name().to_string(),
            Velocity {
                owner: Arc::downgrade(param),
                buffer: Arc::clone(&buffer),
            },
        );
        buffer
    }
}

impl LearningScenario for GradientDescent {
    fn kind(&self) -> &'static str {
        "GradientDescent"
    }

    fn settings(&self) -> &ScenarioSettings {
        &self.settings
    }

    fn hyper_parameters(&self) -> Value {
        let mut hps = self.settings.hyper_parameters();
        hps["lr"] = json!(self.learning_rate);
        hps["momentum"] = json!(self.momentum);
        hps["reverse"] = json!(self.reverse);
        hps
    }

    fn run(
        &mut self,
        param: &Arc<Parameter>,
        loss: &dyn GradientProvider,
        ctx: &RunContext<'_>,
    ) -> Result<ScenarioOutcome> {
        let grad = loss.grad(param)?;
        let value = param.value();

        if grad.shape() != value.shape() {
            return Err(ScenarioErr::GradientShapeMismatch {
                parameter: param.name().to_string(),
                got: grad.shape().to_vec(),
                expected: value.shape().to_vec(),
            });
        }

        let step = if self.reverse {
            self.learning_rate
        } else {
            -self.learning_rate
        };

        if self.momentum == 0. {
            let mut update = value;
            update.scaled_add(step, &grad);

            let record = UpdateRecord::new(param, ctx.param_name, Some(update), Some(grad));
            return Ok(ScenarioOutcome::new(record));
        }

        let mu = self.momentum;
        let buffer = self.velocity_for(param);

        let mut velocity = buffer.value() * mu;
        velocity.scaled_add(1. - mu, &grad);

        let mut update = value;
        update.scaled_add(step, &velocity);

        let mut outcome = ScenarioOutcome::new(UpdateRecord::new(
            param,
            ctx.param_name,
            Some(update),
            Some(grad),
        ));
        outcome.add_co_parameter(UpdateRecord::new(&buffer, "momentum", Some(velocity), None));

        Ok(outcome)
    }
}
