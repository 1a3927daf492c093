mod builder;
mod chain;
mod fixed;
mod gradient_descent;
mod outcome;
mod resolve;
mod scenario;

pub use builder::ScenarioBuilder;
pub use chain::ScenarioChain;
pub use fixed::Fixed;
pub use gradient_descent::GradientDescent;
pub use outcome::{ScenarioOutcome, UpdateRecord};
pub use resolve::{Conflict, ConflictResolver, Resolution};
pub use scenario::{LearningScenario, RunContext, ScenarioSettings};
