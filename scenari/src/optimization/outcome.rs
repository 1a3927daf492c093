use std::sync::{Arc, Weak};

use ndarray::ArrayD;

use crate::{
    Result, ScenarioErr,
    params::{Parameter, ShapeMismatch},
};

/// "`parameter` receives `new_value`, computed from `gradient`".
///
/// The record does not keep the parameter alive.
#[derive(Debug, Clone)]
pub struct UpdateRecord {
    parameter: Weak<Parameter>,
    name: String,
    new_value: Option<ArrayD<f32>>,
    gradient: Option<ArrayD<f32>>,
}

impl UpdateRecord {
    /// Creates a new `UpdateRecord`.
    ///
    /// # Arguments
    /// * `parameter` - The parameter to update.
    /// * `name` - The role of the update, e.g. `momentum`.
    /// * `new_value` - The next value of the parameter, `None` leaves it untouched.
    /// * `gradient` - The gradient the new value was computed from, if any.
    ///
    /// # Returns
    /// A new `UpdateRecord` instance.
    pub fn new(
        parameter: &Arc<Parameter>,
        name: impl Into<String>,
        new_value: Option<ArrayD<f32>>,
        gradient: Option<ArrayD<f32>>,
    ) -> Self {
        Self {
            parameter: Arc::downgrade(parameter),
            name: name.into(),
            new_value,
            gradient,
        }
    }

    /// Returns the parameter this record updates, unless it was dropped.
    pub fn parameter(&self) -> Option<Arc<Parameter>> {
        self.parameter.upgrade()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn new_value(&self) -> Option<&ArrayD<f32>> {
        self.new_value.as_ref()
    }

    pub fn gradient(&self) -> Option<&ArrayD<f32>> {
        self.gradient.as_ref()
    }

    /// Whether both records target the same parameter.
    pub fn targets(&self, other: &UpdateRecord) -> bool {
        Weak::ptr_eq(&self.parameter, &other.parameter)
    }
}

impl PartialEq for UpdateRecord {
    fn eq(&self, other: &Self) -> bool {
        self.targets(other)
            && self.name == other.name
            && self.new_value == other.new_value
            && self.gradient == other.gradient
    }
}

/// The updates a scenario computed for one parameter: the parameter's own update plus the
/// updates of its co-parameters (e.g. momentum buffers).
///
/// Every record comes from the same gradient pass, they are committed together or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOutcome {
    primary: UpdateRecord,
    co_parameters: Vec<UpdateRecord>,
}

impl ScenarioOutcome {
    /// Creates a new `ScenarioOutcome` without co-parameters.
    pub fn new(primary: UpdateRecord) -> Self {
        Self {
            primary,
            co_parameters: Vec::new(),
        }
    }

    pub fn add_co_parameter(&mut self, record: UpdateRecord) {
        self.co_parameters.push(record);
    }

    pub fn primary(&self) -> &UpdateRecord {
        &self.primary
    }

    pub fn co_parameters(&self) -> &[UpdateRecord] {
        &self.co_parameters
    }

    /// Returns the co-parameter update named `name`.
    pub fn co_parameter(&self, name: &str) -> Option<&UpdateRecord> {
        self.co_parameters.iter().find(|r| r.name == name)
    }

    /// Iterates over the primary record followed by the co-parameter records.
    pub fn records(&self) -> impl Iterator<Item = &UpdateRecord> {
        std::iter::once(&self.primary).chain(&self.co_parameters)
    }

    /// Writes every update of this outcome into its parameter.
    ///
    /// Every parameter is resolved before anything is written, so a dropped parameter leaves
    /// all of them untouched. Records without a new value are skipped.
    ///
    /// # Returns
    /// The shape mismatches found while writing, or an error if a parameter was dropped.
    pub fn commit(&self) -> Result<Vec<ShapeMismatch>> {
        let mut targets = Vec::with_capacity(1 + self.co_parameters.len());

        for record in self.records() {
            let param = record
                .parameter()
                .ok_or_else(|| ScenarioErr::DanglingParameter {
                    name: record.name.clone(),
                })?;

            targets.push((param, record));
        }

        let mismatches = targets
            .into_iter()
            .filter_map(|(param, record)| {
                let value = record.new_value.clone()?;
                param.update(value)
            })
            .collect();

        Ok(mismatches)
    }
}
