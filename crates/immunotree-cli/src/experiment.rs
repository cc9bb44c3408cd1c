use std::path::{Path, PathBuf};

use immunotree_core::{SearchConfig, SearchConfigError, SearchTree};
use immunotree_env::{EnvError, EnvParams, Strategy};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::summary::Summary;
use crate::trial::{Policy, TrialError, TrialEvent, TrialOutcome, play_trial};

const DEFAULT_EXPERIMENT_YAML: &str = include_str!("../config/experiment.default.yaml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyChoice {
    Planner,
    Random,
    RandomInfected,
    MostSusceptibleNeighbors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Everything needed to reproduce a batch of trials.
pub struct ExperimentConfig {
    pub trials: usize,
    pub seed: Option<u64>,
    pub strategy: StrategyChoice,
    pub event_log: Option<PathBuf>,
    /// Directory for per-trial search tree snapshots (planner only).
    pub snapshot_dir: Option<PathBuf>,
    pub environment: EnvParams,
    pub search: SearchConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig {
            trials: 50,
            seed: None,
            strategy: StrategyChoice::Planner,
            event_log: None,
            snapshot_dir: None,
            environment: EnvParams::default(),
            search: SearchConfig::default(),
        }
    }
}

impl ExperimentConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ExperimentError> {
        let config: ExperimentConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, ExperimentError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// The bundled default configuration, as YAML text.
    pub fn default_yaml() -> &'static str {
        DEFAULT_EXPERIMENT_YAML
    }

    pub fn from_default_yaml() -> Result<Self, ExperimentError> {
        Self::from_yaml_str(DEFAULT_EXPERIMENT_YAML)
    }

    pub fn validate(&self) -> Result<(), ExperimentError> {
        if self.trials == 0 {
            return Err(ExperimentError::Invalid(
                "trials must be greater than 0".to_string(),
            ));
        }
        self.environment.validate()?;
        if self.strategy == StrategyChoice::Planner {
            self.search.validate()?;
        }
        Ok(())
    }

    pub fn policy(&self) -> Policy {
        match self.strategy {
            StrategyChoice::Planner => Policy::Planner(self.search.clone()),
            StrategyChoice::Random => Policy::Baseline(Strategy::Random),
            StrategyChoice::RandomInfected => Policy::Baseline(Strategy::RandomInfected),
            StrategyChoice::MostSusceptibleNeighbors => {
                Policy::Baseline(Strategy::MostSusceptibleNeighbors)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("failed to read experiment config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse experiment yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid experiment config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Search(#[from] SearchConfigError),

    #[error("trial {trial} failed: {source}")]
    Trial {
        trial: usize,
        #[source]
        source: TrialError,
    },

    #[error(transparent)]
    EventLog(#[from] crate::event_log::EventLogError),

    #[error("failed to write tree snapshot {}: {source}", .path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize tree snapshot: {0}")]
    SnapshotJson(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentReport {
    pub policy: &'static str,
    pub outcomes: Vec<TrialOutcome>,
    pub summary: Summary,
}

/// Run `config.trials` independent trials from a single seeded RNG stream.
pub fn run_experiment<FHook>(
    config: &ExperimentConfig,
    mut on_event: FHook,
) -> Result<ExperimentReport, ExperimentError>
where
    FHook: FnMut(&TrialEvent),
{
    config.validate()?;

    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let policy = config.policy();

    let snapshot_dir = match (&policy, &config.snapshot_dir) {
        (Policy::Planner(_), Some(dir)) => {
            std::fs::create_dir_all(dir).map_err(|source| ExperimentError::Snapshot {
                path: dir.clone(),
                source,
            })?;
            Some(dir.as_path())
        }
        _ => None,
    };

    let mut outcomes = Vec::with_capacity(config.trials);
    for trial in 0..config.trials {
        let mut tree = SearchTree::new();
        let outcome = play_trial(
            &config.environment,
            &policy,
            trial,
            &mut tree,
            &mut rng,
            &mut on_event,
        )
        .map_err(|source| ExperimentError::Trial { trial, source })?;
        if let Some(dir) = snapshot_dir {
            write_snapshot(dir, trial, &tree)?;
        }
        outcomes.push(outcome);
    }

    let values: Vec<i64> = outcomes.iter().map(|outcome| outcome.value).collect();
    Ok(ExperimentReport {
        policy: policy.name(),
        summary: Summary::from_values(&values),
        outcomes,
    })
}

/// Write `tree` as `trial-NNN.json` under `dir`.
fn write_snapshot(dir: &Path, trial: usize, tree: &SearchTree) -> Result<(), ExperimentError> {
    let path = dir.join(format!("trial-{trial:03}.json"));
    let json = tree.snapshot().to_json_pretty()?;
    std::fs::write(&path, json).map_err(|source| ExperimentError::Snapshot { path, source })
}
