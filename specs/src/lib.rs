mod scenario;

pub use scenario::{ChainSpec, ResolutionSpec, ResolverSpec, ScenarioSpec};
