mod baselines;
mod environment;
mod error;
mod graph;
mod params;

pub use baselines::Strategy;
pub use environment::{Environment, FinalValue};
pub use error::EnvError;
pub use graph::ContactGraph;
pub use params::{Dynamics, EnvParams};
