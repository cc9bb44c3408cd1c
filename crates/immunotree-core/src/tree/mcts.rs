use std::{
    fmt, fs,
    path::Path,
    time::{Duration, Instant},
};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tree::{
    error::SearchError,
    ids::{NodeSet, StateKey},
    model::ContagionModel,
    rollout::rollout,
    search_tree::SearchTree,
};

const DEFAULT_SEARCH_CONFIG_YAML: &str = include_str!("../../config/search.default.yaml");

/// Search configuration for one planning round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Wall-clock budget per round, checked between batches.
    pub time_budget_ms: u64,
    /// Simulations run between two deadline checks.
    pub batch_size: usize,
    /// UCB exploration constant.
    pub exploration: f64,
    /// Optional hard cap on simulations per round.
    pub max_simulations: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            time_budget_ms: 1_000,
            batch_size: 100,
            exploration: 0.8,
            max_simulations: None,
        }
    }
}

impl SearchConfig {
    /// Parse a search config from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SearchConfigError> {
        let config: SearchConfig = serde_yaml::from_str(yaml).map_err(SearchConfigError::Yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a search config from a YAML file path.
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, SearchConfigError> {
        let yaml = fs::read_to_string(path).map_err(SearchConfigError::Io)?;
        Self::from_yaml_str(&yaml)
    }

    /// Return the default YAML config included with this crate.
    pub fn default_yaml() -> &'static str {
        DEFAULT_SEARCH_CONFIG_YAML
    }

    /// Parse the default YAML config included with this crate.
    pub fn from_default_yaml() -> Result<Self, SearchConfigError> {
        Self::from_yaml_str(Self::default_yaml())
    }

    pub fn validate(&self) -> Result<(), SearchConfigError> {
        if self.batch_size == 0 {
            return Err(SearchConfigError::Invalid(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(SearchConfigError::Invalid(
                "exploration must be finite and >= 0".to_string(),
            ));
        }
        if self.max_simulations == Some(0) {
            return Err(SearchConfigError::Invalid(
                "max_simulations must be greater than 0 when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    /// Size of the next batch given how many simulations already ran.
    fn next_batch(&self, simulations: usize) -> usize {
        match self.max_simulations {
            Some(max) => self.batch_size.min(max.saturating_sub(simulations)),
            None => self.batch_size,
        }
    }

    fn budget_spent(&self, simulations: usize, elapsed: Duration) -> bool {
        elapsed >= self.time_budget()
            || self
                .max_simulations
                .is_some_and(|max| simulations >= max)
    }
}

/// Error type for loading and validating `SearchConfig`.
#[derive(Debug)]
pub enum SearchConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Invalid(String),
}

impl fmt::Display for SearchConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchConfigError::Io(err) => write!(f, "failed to read config file: {err}"),
            SearchConfigError::Yaml(err) => write!(f, "failed to parse config YAML: {err}"),
            SearchConfigError::Invalid(err) => write!(f, "invalid search config: {err}"),
        }
    }
}

impl std::error::Error for SearchConfigError {}

/// Decision returned by one planning round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Node to immunize, or `None` when the observed state has already stabilized.
    pub action: Option<usize>,
    pub simulations: usize,
}

/// Progress events emitted by `search_with_hook`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SearchEvent {
    /// The observed state was already stable; no simulation ran.
    Skipped {
        observed_infected: usize,
        resistant: usize,
    },
    BatchCompleted {
        simulations: usize,
        elapsed_ms: u64,
        tree_nodes: usize,
    },
    Decided {
        action: Option<usize>,
        simulations: usize,
        elapsed_ms: u64,
        root_visits: u64,
        root_mean: Option<f64>,
    },
}

impl SearchTree {
    /// Run one simulated trajectory from `(infected, resistant)` and back its value up the tree.
    ///
    /// A state seen for the first time is added to the tree and valued by a random rollout,
    /// so every call grows the tree by at most one node. Known states pick an action,
    /// step counterfactually and recurse; recursion depth is bounded by the number of
    /// non-resistant nodes since every step immunizes one.
    pub fn simulate<M, R>(
        &mut self,
        model: &M,
        infected: NodeSet,
        resistant: NodeSet,
        exploration: f64,
        rng: &mut R,
    ) -> Result<f64, SearchError>
    where
        M: ContagionModel,
        R: Rng + ?Sized,
    {
        if model.is_stable(infected, resistant) {
            return Ok(0.0);
        }

        let key = StateKey::new(infected, resistant);
        let candidates = model.candidates(resistant);
        if candidates.is_empty() {
            return Err(SearchError::NoCandidates { key });
        }

        if self.expand(key, candidates) {
            return Ok(rollout(model, infected, resistant, rng));
        }

        let action = self
            .node(&key)?
            .select(exploration)
            .ok_or(SearchError::NoCandidates { key })?;

        let next = model.transition(infected, resistant, action, rng);
        let value = next.reward as f64
            + self.simulate(model, next.infected, next.resistant, exploration, rng)?;

        self.node_mut(&key)?
            .record(action, value)
            .ok_or(SearchError::MissingActionStats { key, action })?;

        Ok(value)
    }
}

/// Plan one round from the model's current observation.
pub fn search<M, R>(
    model: &M,
    tree: &mut SearchTree,
    config: &SearchConfig,
    rng: &mut R,
) -> Result<SearchOutcome, SearchError>
where
    M: ContagionModel,
    R: Rng + ?Sized,
{
    search_with_hook(model, tree, config, rng, |_| {})
}

/// Plan one round and invoke a callback on every progress event.
///
/// The root is the belief state `(observed_infected, resistant)`. Batches run until the
/// time budget (or `max_simulations`) is spent; at least one batch always runs.
pub fn search_with_hook<M, R, FHook>(
    model: &M,
    tree: &mut SearchTree,
    config: &SearchConfig,
    rng: &mut R,
    mut on_event: FHook,
) -> Result<SearchOutcome, SearchError>
where
    M: ContagionModel,
    R: Rng + ?Sized,
    FHook: FnMut(&SearchEvent),
{
    let observed_infected = model.observed_infected();
    let resistant = model.resistant();

    if model.is_stable(observed_infected, resistant) {
        on_event(&SearchEvent::Skipped {
            observed_infected: observed_infected.len(),
            resistant: resistant.len(),
        });
        return Ok(SearchOutcome {
            action: None,
            simulations: 0,
        });
    }

    let root = StateKey::new(observed_infected, resistant);
    let start = Instant::now();
    let mut simulations = 0;

    loop {
        let batch = config.next_batch(simulations);
        for _ in 0..batch {
            tree.simulate(
                model,
                observed_infected,
                resistant,
                config.exploration,
                rng,
            )?;
        }
        simulations += batch;

        let elapsed = start.elapsed();
        on_event(&SearchEvent::BatchCompleted {
            simulations,
            elapsed_ms: elapsed.as_millis() as u64,
            tree_nodes: tree.node_count(),
        });

        if batch == 0 || config.budget_spent(simulations, elapsed) {
            break;
        }
    }

    let action = tree.best_action(&root)?;
    let root_node = tree.node(&root)?;
    on_event(&SearchEvent::Decided {
        action,
        simulations,
        elapsed_ms: start.elapsed().as_millis() as u64,
        root_visits: root_node.visits(),
        root_mean: action.and_then(|a| root_node.action(a)).and_then(|s| s.mean()),
    });

    Ok(SearchOutcome {
        action,
        simulations,
    })
}
