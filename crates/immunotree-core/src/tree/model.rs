use rand::Rng;

use crate::tree::ids::NodeSet;

/// Result of one counterfactual immunize-then-propagate step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub infected: NodeSet,
    pub resistant: NodeSet,
    /// `|infected before| - |infected after| - 1`.
    pub reward: i64,
}

/// Interface the planner needs from a contagion environment.
///
/// The search tree never sees the simulator type, only this trait. Every method must leave
/// the environment's real state untouched; randomness is drawn from the caller's `rng`.
pub trait ContagionModel {
    /// Number of nodes in the contact graph.
    fn node_count(&self) -> usize;

    /// Current noisy view of the infected set.
    fn observed_infected(&self) -> NodeSet;

    /// Current resistant (immunized) set.
    fn resistant(&self) -> NodeSet;

    /// Whether no node in `infected` has a neighbour outside `infected ∪ resistant`.
    fn is_stable(&self, infected: NodeSet, resistant: NodeSet) -> bool;

    /// Immunize `action`, then propagate one round from the given state.
    fn transition<R: Rng + ?Sized>(
        &self,
        infected: NodeSet,
        resistant: NodeSet,
        action: usize,
        rng: &mut R,
    ) -> Transition;

    /// Nodes eligible for immunization in the given state.
    fn candidates(&self, resistant: NodeSet) -> NodeSet {
        NodeSet::full(self.node_count()).difference(resistant)
    }
}
