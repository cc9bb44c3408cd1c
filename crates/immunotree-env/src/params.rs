use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::EnvError;

const DEFAULT_ENV_PARAMS_YAML: &str = include_str!("../config/environment.default.yaml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Parameters for generating one random trial environment.
pub struct EnvParams {
    /// Number of nodes in the contact graph.
    pub nodes: usize,
    /// Number of distinct nodes infected at the start.
    pub initially_infected: usize,
    /// Probability that a given pair of nodes is connected.
    pub edge_probability: f64,
    /// Probability that an infected node infects a susceptible neighbour in one round.
    pub infect_probability: f64,
    /// Probability that an infected node is observed as healthy.
    pub false_negative_probability: f64,
}

impl Default for EnvParams {
    fn default() -> Self {
        Self {
            nodes: 30,
            initially_infected: 2,
            edge_probability: 0.1,
            infect_probability: 0.5,
            false_negative_probability: 0.2,
        }
    }
}

impl EnvParams {
    /// Parse and validate parameters from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, EnvError> {
        let params: EnvParams = serde_yaml::from_str(yaml)?;
        params.validate()?;
        Ok(params)
    }

    /// Parse and validate parameters from a YAML file.
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, EnvError> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Return the default YAML parameters included with this crate.
    pub fn default_yaml() -> &'static str {
        DEFAULT_ENV_PARAMS_YAML
    }

    pub fn from_default_yaml() -> Result<Self, EnvError> {
        Self::from_yaml_str(Self::default_yaml())
    }

    /// Serialize the parameters back to YAML.
    pub fn to_yaml(&self) -> Result<String, EnvError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check node counts and every probability.
    pub fn validate(&self) -> Result<(), EnvError> {
        if self.nodes == 0 {
            return Err(EnvError::EmptyGraph);
        }
        if self.nodes > immunotree_core::NodeSet::CAPACITY {
            return Err(EnvError::TooManyNodes {
                nodes: self.nodes,
                capacity: immunotree_core::NodeSet::CAPACITY,
            });
        }
        if self.initially_infected > self.nodes {
            return Err(EnvError::TooManyInfected {
                initially_infected: self.initially_infected,
                nodes: self.nodes,
            });
        }
        check_probability("edge_probability", self.edge_probability)?;
        self.dynamics().validate()
    }

    pub fn dynamics(&self) -> Dynamics {
        Dynamics {
            infect_probability: self.infect_probability,
            false_negative_probability: self.false_negative_probability,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Per-round contagion and observation probabilities.
pub struct Dynamics {
    pub infect_probability: f64,
    pub false_negative_probability: f64,
}

impl Dynamics {
    pub fn validate(&self) -> Result<(), EnvError> {
        check_probability("infect_probability", self.infect_probability)?;
        check_probability("false_negative_probability", self.false_negative_probability)
    }
}

/// NaN fails the range check as well.
fn check_probability(name: &'static str, value: f64) -> Result<(), EnvError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EnvError::InvalidProbability { name, value })
    }
}
