use std::{
    collections::BTreeSet,
    fmt::{self, Display},
};

use log::warn;
use ndarray::{ArrayD, ArrayViewD};
use parking_lot::RwLock;

/// The tags every parameter gets unless told otherwise.
pub const DEFAULT_TAGS: [&str; 1] = ["regularizable"];

/// A named, tagged and mutable tensor.
///
/// Parameters are shared through `Arc`s between their layer, the scenarios that compute their
/// updates and the driver that commits them, so the value and the tags sit behind locks.
#[derive(Debug)]
pub struct Parameter {
    name: String,
    tags: RwLock<BTreeSet<String>>,
    value: RwLock<ArrayD<f32>>,
}

/// Diagnostic for an update whose value has a different shape than the one it replaced.
///
/// This is not an error, the update is applied anyway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMismatch {
    pub parameter: String,
    pub from: Vec<usize>,
    pub to: Vec<usize>,
}

impl Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Update of {} has a different shape: {:?} -> {:?}",
            self.parameter, self.from, self.to
        )
    }
}

impl Parameter {
    /// Creates a new `Parameter` tagged with `DEFAULT_TAGS`.
    ///
    /// # Arguments
    /// * `name` - The unique name of the parameter.
    /// * `value` - Its initial value.
    ///
    /// # Returns
    /// A new `Parameter` instance.
    pub fn new(name: impl Into<String>, value: ArrayD<f32>) -> Self {
        Self::with_tags(name, DEFAULT_TAGS, value)
    }

    /// Creates a new `Parameter` with an explicit set of tags.
    ///
    /// # Arguments
    /// * `name` - The unique name of the parameter.
    /// * `tags` - The tags of the parameter, may be empty.
    /// * `value` - Its initial value.
    ///
    /// # Returns
    /// A new `Parameter` instance.
    pub fn with_tags<I, S>(name: impl Into<String>, tags: I, value: ArrayD<f32>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            tags: RwLock::new(tags.into_iter().map(Into::into).collect()),
            value: RwLock::new(value),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tags of this parameter in lexicographic order.
    pub fn tags(&self) -> Vec<String> {
        self.tags.read().iter().cloned().collect()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.read().contains(tag)
    }

    pub fn add_tag(&self, tag: impl Into<String>) {
        self.tags.write().insert(tag.into());
    }

    /// Removes `tag` from this parameter.
    ///
    /// # Returns
    /// Whether the tag was present.
    pub fn remove_tag(&self, tag: &str) -> bool {
        self.tags.write().remove(tag)
    }

    /// Returns a copy of the current value.
    pub fn value(&self) -> ArrayD<f32> {
        self.value.read().clone()
    }

    /// Runs `f` over a view of the current value without copying it.
    pub fn with_value<R>(&self, f: impl FnOnce(ArrayViewD<'_, f32>) -> R) -> R {
        f(self.value.read().view())
    }

    pub fn shape(&self) -> Vec<usize> {
        self.value.read().shape().to_vec()
    }

    /// Sets the value of this parameter regardless of its current shape.
    pub fn init(&self, value: ArrayD<f32>) {
        *self.value.write() = value;
    }

    /// Replaces the value of this parameter.
    ///
    /// A value with a different shape is still accepted, but a warning is logged and returned.
    ///
    /// # Arguments
    /// * `value` - The new value.
    ///
    /// # Returns
    /// The shape mismatch, if there was one.
    pub fn update(&self, value: ArrayD<f32>) -> Option<ShapeMismatch> {
        let mut current = self.value.write();

        let mismatch = (current.shape() != value.shape()).then(|| ShapeMismatch {
            parameter: self.name.clone(),
            from: current.shape().to_vec(),
            to: value.shape().to_vec(),
        });

        if let Some(mismatch) = &mismatch {
            warn!("{mismatch}");
        }

        *current = value;
        mismatch
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Parameter: {}, {:?}>", self.name, self.shape())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{arr1, arr2};

    use super::*;

    #[test]
    fn regularizable_by_default() {
        let param = Parameter::new("w", arr1(&[1.0]).into_dyn());
        assert_eq!(param.tags(), ["regularizable"]);
    }

    #[test]
    fn tags_can_be_added_and_removed() {
        let param = Parameter::with_tags("w", ["a"], arr1(&[1.0]).into_dyn());

        param.add_tag("b");
        assert!(param.has_tag("a"));
        assert!(param.has_tag("b"));

        assert!(param.remove_tag("a"));
        assert!(!param.remove_tag("a"));
        assert_eq!(param.tags(), ["b"]);
    }

    #[test]
    fn update_with_same_shape_is_silent() {
        let param = Parameter::new("w", arr1(&[1.0, 2.0]).into_dyn());

        assert!(param.update(arr1(&[3.0, 4.0]).into_dyn()).is_none());
        assert_eq!(param.value(), arr1(&[3.0, 4.0]).into_dyn());
    }

    #[test]
    fn update_with_different_shape_warns_but_proceeds() {
        let param = Parameter::new("w", arr1(&[1.0, 2.0]).into_dyn());

        let mismatch = param
            .update(arr2(&[[1.0], [2.0], [3.0]]).into_dyn())
            .unwrap();

        assert_eq!(mismatch.parameter, "w");
        assert_eq!(mismatch.from, [2]);
        assert_eq!(mismatch.to, [3, 1]);
        assert_eq!(param.shape(), [3, 1]);
    }

    #[test]
    fn display() {
        let param = Parameter::new("dense.weights", arr2(&[[1.0, 2.0]]).into_dyn());
        assert_eq!(param.to_string(), "<Parameter: dense.weights, [1, 2]>");
    }
}
