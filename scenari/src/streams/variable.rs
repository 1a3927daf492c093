use std::ops::{Deref, DerefMut};

use crate::{Result, ScenarioErr};

/// The streams a variable holds when none are given.
pub const DEFAULT_STREAMS: [&str; 2] = ["train", "test"];

/// Holds one value per named data stream.
///
/// The set of streams is fixed at construction, asking for any other stream is an error.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiStreamVariable<T> {
    streams: Vec<String>,
    values: Vec<Option<T>>,
}

impl<T> MultiStreamVariable<T> {
    /// Creates a new `MultiStreamVariable` with no values.
    ///
    /// # Arguments
    /// * `streams` - The stream names, repeated names are only kept once.
    ///
    /// # Returns
    /// A new `MultiStreamVariable` instance.
    pub fn new<I, S>(streams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();

        for stream in streams {
            let stream = stream.into();
            if !names.contains(&stream) {
                names.push(stream);
            }
        }

        let values = names.iter().map(|_| None).collect();
        Self {
            streams: names,
            values,
        }
    }

    /// Creates a new `MultiStreamVariable` with a fresh value for every stream.
    ///
    /// # Arguments
    /// * `streams` - The stream names, repeated names are only kept once.
    /// * `factory` - Builds the value of a stream given its name.
    ///
    /// # Returns
    /// A new `MultiStreamVariable` instance.
    pub fn with_factory<I, S, F>(streams: I, mut factory: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnMut(&str) -> T,
    {
        let mut var = Self::new(streams);
        for (stream, value) in var.streams.iter().zip(var.values.iter_mut()) {
            *value = Some(factory(stream));
        }

        var
    }

    pub fn streams(&self) -> &[String] {
        &self.streams
    }

    pub fn contains(&self, stream: &str) -> bool {
        self.streams.iter().any(|s| s == stream)
    }

    /// Returns the value of `stream`, which may be absent.
    pub fn get(&self, stream: &str) -> Result<Option<&T>> {
        let idx = self.index(stream)?;
        Ok(self.values[idx].as_ref())
    }

    pub fn get_mut(&mut self, stream: &str) -> Result<Option<&mut T>> {
        let idx = self.index(stream)?;
        Ok(self.values[idx].as_mut())
    }

    /// Replaces the value of `stream`.
    ///
    /// # Returns
    /// The previous value of the stream.
    pub fn set(&mut self, stream: &str, value: T) -> Result<Option<T>> {
        let idx = self.index(stream)?;
        Ok(self.values[idx].replace(value))
    }

    /// Removes the value of `stream`, leaving it absent.
    pub fn take(&mut self, stream: &str) -> Result<Option<T>> {
        let idx = self.index(stream)?;
        Ok(self.values[idx].take())
    }

    /// Iterates over every stream and its value, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&T>)> {
        self.streams
            .iter()
            .zip(&self.values)
            .map(|(s, v)| (s.as_str(), v.as_ref()))
    }

    fn index(&self, stream: &str) -> Result<usize> {
        self.streams
            .iter()
            .position(|s| s == stream)
            .ok_or_else(|| ScenarioErr::UnknownStream {
                stream: stream.to_string(),
            })
    }
}

impl<T> Default for MultiStreamVariable<T> {
    fn default() -> Self {
        Self::new(DEFAULT_STREAMS)
    }
}

/// The inputs of a model, one per stream.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Inputs<T>(pub MultiStreamVariable<T>);

/// The ground truth of a model, one per stream.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Targets<T>(pub MultiStreamVariable<T>);

impl<T> From<MultiStreamVariable<T>> for Inputs<T> {
    fn from(value: MultiStreamVariable<T>) -> Self {
        Self(value)
    }
}

impl<T> From<MultiStreamVariable<T>> for Targets<T> {
    fn from(value: MultiStreamVariable<T>) -> Self {
        Self(value)
    }
}

impl<T> Deref for Inputs<T> {
    type Target = MultiStreamVariable<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Inputs<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> Deref for Targets<T> {
    type Target = MultiStreamVariable<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Targets<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_streams_start_empty() {
        let var: MultiStreamVariable<f32> = MultiStreamVariable::default();

        assert_eq!(var.streams(), ["train", "test"]);
        assert_eq!(var.get("train").unwrap(), None);
        assert_eq!(var.get("test").unwrap(), None);
    }

    #[test]
    fn undeclared_streams_fail() {
        let mut var = MultiStreamVariable::new(["train"]);

        assert!(matches!(
            var.get("validation"),
            Err(ScenarioErr::UnknownStream { stream }) if stream == "validation"
        ));
        assert!(var.set("validation", 1.0).is_err());
        assert!(!var.contains("validation"));
        assert_eq!(var.streams(), ["train"]);
    }

    #[test]
    fn factory_builds_one_value_per_stream() {
        let var = MultiStreamVariable::with_factory(["train", "test", "train"], |s| s.len());

        assert_eq!(var.streams(), ["train", "test"]);
        assert_eq!(var.get("train").unwrap(), Some(&5));
        assert_eq!(var.get("test").unwrap(), Some(&4));
    }

    #[test]
    fn values_can_be_replaced_per_stream() {
        let mut var = MultiStreamVariable::new(["train", "test"]);

        assert_eq!(var.set("train", 1).unwrap(), None);
        assert_eq!(var.set("train", 2).unwrap(), Some(1));
        *var.get_mut("train").unwrap().unwrap() += 1;

        assert_eq!(var.get("train").unwrap(), Some(&3));
        assert_eq!(var.take("train").unwrap(), Some(3));
        assert_eq!(var.iter().collect::<Vec<_>>(), [("train", None), ("test", None)]);
    }

    #[test]
    fn targets_behave_like_the_inner_variable() {
        let mut targets = Targets::from(MultiStreamVariable::new(["train"]));
        targets.set("train", 1.0).unwrap();

        assert_eq!(targets.get("train").unwrap(), Some(&1.0));
        assert!(targets.get("test").is_err());
    }
}
