use std::sync::Arc;

use super::Parameter;

/// Anything that owns parameters, layers being the most common.
pub trait ParameterHost {
    /// The name used in diagnostics.
    fn name(&self) -> &str;

    fn parameters(&self) -> &Parameters;
}

/// The parameters of a host, indexed by the role they play in it (e.g. `weights`, `bias`) and
/// kept in insertion order.
#[derive(Debug, Default, Clone)]
pub struct Parameters {
    entries: Vec<(String, Arc<Parameter>)>,
}

impl Parameters {
    /// Creates a new empty `Parameters`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `param` under `role`, replacing whatever was there before.
    ///
    /// # Arguments
    /// * `role` - The name the host knows the parameter by.
    /// * `param` - The parameter.
    ///
    /// # Returns
    /// A handle to the inserted parameter.
    pub fn insert(&mut self, role: impl Into<String>, param: Parameter) -> Arc<Parameter> {
        let role = role.into();
        let param = Arc::new(param);

        match self.entries.iter_mut().find(|(r, _)| *r == role) {
            Some((_, slot)) => *slot = Arc::clone(&param),
            None => self.entries.push((role, Arc::clone(&param))),
        }

        param
    }

    pub fn get(&self, role: &str) -> Option<&Arc<Parameter>> {
        self.entries
            .iter()
            .find_map(|(r, param)| (r == role).then_some(param))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(role, _)| role.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Parameter>)> {
        self.entries.iter().map(|(role, param)| (role.as_str(), param))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
