use immunotree_core::NodeSet;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Environment;

/// One-shot heuristics used as comparison baselines for the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Any non-resistant node, uniformly.
    Random,
    /// Any observed-infected node, uniformly.
    RandomInfected,
    /// The observed-infected node with the most susceptible neighbours.
    MostSusceptibleNeighbors,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Random => "random",
            Strategy::RandomInfected => "random_infected",
            Strategy::MostSusceptibleNeighbors => "most_susceptible_neighbors",
        }
    }

    /// Pick a node to immunize from the environment's observation.
    /// Returns `None` when the observed state has already stabilized.
    pub fn choose<R: Rng + ?Sized>(&self, env: &Environment, rng: &mut R) -> Option<usize> {
        let observed = env.observed_infected();
        let resistant = env.resistant();
        if env.has_stabilized_with(Some(observed), Some(resistant)) {
            return None;
        }

        match self {
            Strategy::Random => env.graph().nodes().difference(resistant).choose(rng),
            Strategy::RandomInfected => observed.choose(rng),
            Strategy::MostSusceptibleNeighbors => most_susceptible(env, observed, resistant),
        }
    }
}

/// Ties go to the lowest node index.
fn most_susceptible(env: &Environment, observed: NodeSet, resistant: NodeSet) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for node in observed.iter() {
        let count = env
            .graph()
            .susceptible_neighbour_count(node, observed, resistant);
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((node, count)),
        }
    }
    best.map(|(node, _)| node)
}
