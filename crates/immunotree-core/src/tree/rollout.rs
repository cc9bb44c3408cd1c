use rand::Rng;

use crate::tree::{
    ids::NodeSet,
    model::{ContagionModel, Transition},
};

/// Run the default policy from `(infected, resistant)` until the state stabilizes.
///
/// Each step immunizes a uniformly random non-resistant node and accumulates the step reward.
/// `resistant` grows by one node per step, so the loop ends after at most
/// `n - |resistant|` steps.
pub fn rollout<M, R>(model: &M, infected: NodeSet, resistant: NodeSet, rng: &mut R) -> f64
where
    M: ContagionModel,
    R: Rng + ?Sized,
{
    let mut infected = infected;
    let mut resistant = resistant;
    let mut total: i64 = 0;

    while !model.is_stable(infected, resistant) {
        let Some(action) = model.candidates(resistant).choose(rng) else {
            break;
        };

        let Transition {
            infected: next_infected,
            resistant: next_resistant,
            reward,
        } = model.transition(infected, resistant, action, rng);

        total += reward;
        infected = next_infected;
        resistant = next_resistant;
    }

    total as f64
}
