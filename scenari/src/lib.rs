pub mod arch;
pub mod error;
pub mod events;
pub mod grad;
pub mod optimization;
pub mod params;
pub mod streams;

pub use error::{Result, ScenarioErr};
