mod dense;
mod layer;
mod mse;

pub use dense::Dense;
pub use layer::Layer;
pub use mse::Mse;
