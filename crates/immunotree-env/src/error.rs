use thiserror::Error;

#[derive(Debug, Error)]
/// Error type for environment configuration, construction, and stepping.
pub enum EnvError {
    #[error("failed to read YAML file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("graph must contain at least one node")]
    EmptyGraph,

    #[error("graph has {nodes} nodes but at most {capacity} are supported")]
    TooManyNodes { nodes: usize, capacity: usize },

    #[error("cannot start with {initially_infected} infected nodes in a graph of {nodes}")]
    TooManyInfected {
        initially_infected: usize,
        nodes: usize,
    },

    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("edge ({a}, {b}) is not valid in a graph of {nodes} nodes")]
    InvalidEdge { a: usize, b: usize, nodes: usize },

    #[error("node {node} does not exist in a graph of {nodes} nodes")]
    InvalidNode { node: usize, nodes: usize },

    #[error("final value requested before the process stabilized")]
    NotStabilized,
}
