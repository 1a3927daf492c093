use std::{
    error::Error,
    fmt::{self, Display},
};

use log::info;
use scenari_specs::{ResolutionSpec, ResolverSpec};

use super::ScenarioOutcome;

/// What to do when two chained scenarios compute an update for the same parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// The last scenario wins.
    Overwrite,
    /// The first scenario wins.
    Ignore,
    /// Differing updates are a configuration error.
    #[default]
    Die,
}

impl Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Resolution::Overwrite => "Overwrite",
            Resolution::Ignore => "Ignore",
            Resolution::Die => "Die",
        };

        f.write_str(s)
    }
}

impl From<ResolutionSpec> for Resolution {
    fn from(value: ResolutionSpec) -> Self {
        match value {
            ResolutionSpec::Overwrite => Self::Overwrite,
            ResolutionSpec::Ignore => Self::Ignore,
            ResolutionSpec::Die => Self::Die,
        }
    }
}

/// Returned by a `Die` resolver when the updates differ.
#[derive(Debug)]
pub struct Conflict;

impl Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Learning scenario is incompatible with previous ones")
    }
}

impl Error for Conflict {}

/// Merges the outcome of a scenario with the outcome of the scenarios chained before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConflictResolver {
    resolution: Resolution,
    verbose: bool,
}

impl ConflictResolver {
    pub const OVERWRITE: Self = Self::new(Resolution::Overwrite);
    pub const IGNORE: Self = Self::new(Resolution::Ignore);
    pub const DIE: Self = Self::new(Resolution::Die);

    /// Creates a new quiet `ConflictResolver`.
    pub const fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            verbose: false,
        }
    }

    /// Makes the resolver log every conflict it resolves.
    pub const fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Resolves the conflict between two outcomes for the same parameter.
    ///
    /// # Arguments
    /// * `previous` - The outcome of the scenarios that ran before.
    /// * `current` - The outcome of the scenario that just ran.
    ///
    /// # Returns
    /// The outcome to keep, or a `Conflict` if the resolution is `Die` and the outcomes differ.
    pub fn resolve(
        &self,
        previous: &ScenarioOutcome,
        current: ScenarioOutcome,
    ) -> Result<ScenarioOutcome, Conflict> {
        if self.verbose {
            info!(
                "Resolving conflict between scenari using {}",
                self.resolution
            );
        }

        match self.resolution {
            Resolution::Overwrite => Ok(current),
            Resolution::Ignore => Ok(previous.clone()),
            Resolution::Die if *previous == current => Ok(current),
            Resolution::Die => Err(Conflict),
        }
    }
}

impl From<ResolverSpec> for ConflictResolver {
    fn from(value: ResolverSpec) -> Self {
        Self {
            resolution: value.resolution.into(),
            verbose: value.verbose,
        }
    }
}
