use immunotree_core::{SearchConfig, SearchError, SearchEvent, SearchTree, search_with_hook};
use immunotree_env::{EnvError, EnvParams, Environment, Strategy};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

/// How the decision loop picks a node each round.
#[derive(Debug, Clone, PartialEq)]
pub enum Policy {
    /// Belief-state Monte-Carlo tree search.
    Planner(SearchConfig),
    /// One-shot comparison heuristic.
    Baseline(Strategy),
}

impl Policy {
    pub fn name(&self) -> &'static str {
        match self {
            Policy::Planner(_) => "planner",
            Policy::Baseline(strategy) => strategy.name(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TrialError {
    #[error("environment error: {0}")]
    Env(#[from] EnvError),

    #[error("search failed: {0}")]
    Search(#[from] SearchError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Result of one trial run to equilibrium.
pub struct TrialOutcome {
    pub infected_count: usize,
    pub resistant_count: usize,
    pub value: i64,
    /// Simulations spent by the planner across all rounds; 0 for baselines.
    pub simulations: usize,
    pub rounds: usize,
}

/// Events emitted while a trial runs.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrialEvent {
    SearchProgress {
        trial: usize,
        round: usize,
        search: SearchEvent,
    },
    Round {
        trial: usize,
        round: usize,
        action: Option<usize>,
        simulations: usize,
        observed_infected: usize,
        infected: usize,
        resistant: usize,
    },
    TrialFinished {
        trial: usize,
        policy: &'static str,
        outcome: TrialOutcome,
    },
}

/// Run one trial: build a fresh environment and search tree, then alternate
/// decide/step until the true state stabilizes.
pub fn run_trial<R, FHook>(
    params: &EnvParams,
    policy: &Policy,
    trial: usize,
    rng: &mut R,
    on_event: FHook,
) -> Result<TrialOutcome, TrialError>
where
    R: Rng + ?Sized,
    FHook: FnMut(&TrialEvent),
{
    play_trial(params, policy, trial, &mut SearchTree::new(), rng, on_event)
}

/// Decision loop over a caller-owned tree, so the tree can be inspected afterwards.
pub(crate) fn play_trial<R, FHook>(
    params: &EnvParams,
    policy: &Policy,
    trial: usize,
    tree: &mut SearchTree,
    rng: &mut R,
    mut on_event: FHook,
) -> Result<TrialOutcome, TrialError>
where
    R: Rng + ?Sized,
    FHook: FnMut(&TrialEvent),
{
    let mut env = Environment::new(params, rng)?;
    let mut simulations = 0;
    let mut round = 0;

    while !env.has_stabilized() {
        let observed_infected = env.observed_infected().len();
        let (action, spent) = match policy {
            Policy::Planner(config) => {
                let outcome = search_with_hook(&env, tree, config, rng, |event| {
                    on_event(&TrialEvent::SearchProgress {
                        trial,
                        round,
                        search: event.clone(),
                    })
                })?;
                (outcome.action, outcome.simulations)
            }
            Policy::Baseline(strategy) => (strategy.choose(&env, rng), 0),
        };

        env.step(action, rng)?;
        simulations += spent;

        on_event(&TrialEvent::Round {
            trial,
            round,
            action,
            simulations: spent,
            observed_infected,
            infected: env.infected().len(),
            resistant: env.resistant().len(),
        });
        round += 1;
    }

    let value = env.value()?;
    let outcome = TrialOutcome {
        infected_count: value.infected_count,
        resistant_count: value.resistant_count,
        value: value.value,
        simulations,
        rounds: round,
    };
    on_event(&TrialEvent::TrialFinished {
        trial,
        policy: policy.name(),
        outcome,
    });
    Ok(outcome)
}
