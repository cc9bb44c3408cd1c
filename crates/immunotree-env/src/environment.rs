use immunotree_core::{ContagionModel, NodeSet, Transition};
use rand::{Rng, seq::index};
use serde::Serialize;

use crate::{ContactGraph, Dynamics, EnvError, EnvParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Score of a finished trial. `value == -(infected_count + resistant_count)`.
pub struct FinalValue {
    pub infected_count: usize,
    pub resistant_count: usize,
    pub value: i64,
}

#[derive(Debug, Clone)]
/// Stochastic contagion process over a fixed contact graph.
///
/// Owns the hidden true state (`infected`, `resistant`) and the noisy observation derived from
/// it. Only `step` mutates the true state; every other method is a pure query or a
/// counterfactual on caller-provided sets.
pub struct Environment {
    graph: ContactGraph,
    dynamics: Dynamics,
    infected: NodeSet,
    resistant: NodeSet,
    observed_infected: NodeSet,
}

impl Environment {
    /// Generate a random graph and initial infection from `params`.
    pub fn new<R: Rng + ?Sized>(params: &EnvParams, rng: &mut R) -> Result<Self, EnvError> {
        params.validate()?;
        let graph = ContactGraph::erdos_renyi(params.nodes, params.edge_probability, rng)?;
        let infected: NodeSet = index::sample(rng, params.nodes, params.initially_infected)
            .into_iter()
            .collect();
        Self::with_graph(graph, infected, params.dynamics(), rng)
    }

    /// Start a process on an explicit graph and initial infected set.
    pub fn with_graph<R: Rng + ?Sized>(
        graph: ContactGraph,
        initially_infected: NodeSet,
        dynamics: Dynamics,
        rng: &mut R,
    ) -> Result<Self, EnvError> {
        dynamics.validate()?;
        if let Some(node) = initially_infected.difference(graph.nodes()).first() {
            return Err(EnvError::InvalidNode {
                node,
                nodes: graph.node_count(),
            });
        }

        let mut env = Self {
            graph,
            dynamics,
            infected: initially_infected,
            resistant: NodeSet::empty(),
            observed_infected: NodeSet::empty(),
        };
        env.observed_infected = env.observe(rng);
        Ok(env)
    }

    pub fn graph(&self) -> &ContactGraph {
        &self.graph
    }

    pub fn dynamics(&self) -> Dynamics {
        self.dynamics
    }

    /// The hidden true infected set. Planners should use `observed_infected`.
    pub fn infected(&self) -> NodeSet {
        self.infected
    }

    pub fn observed_infected(&self) -> NodeSet {
        self.observed_infected
    }

    pub fn resistant(&self) -> NodeSet {
        self.resistant
    }

    /// Whether the true state has reached equilibrium.
    pub fn has_stabilized(&self) -> bool {
        self.has_stabilized_with(None, None)
    }

    /// Equilibrium test with optional overrides for either set; `None` uses the true state.
    pub fn has_stabilized_with(
        &self,
        infected: Option<NodeSet>,
        resistant: Option<NodeSet>,
    ) -> bool {
        self.graph.is_stable(
            infected.unwrap_or(self.infected),
            resistant.unwrap_or(self.resistant),
        )
    }

    /// Advance the real process by one round.
    ///
    /// `Some(node)` cures and immunizes `node` before propagation; `None` lets the contagion
    /// spread without intervention. The observation is regenerated either way.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        action: Option<usize>,
        rng: &mut R,
    ) -> Result<(), EnvError> {
        if let Some(node) = action {
            self.check_node(node)?;
        }

        let (infected, resistant) = self.advance(self.infected, self.resistant, action, rng);
        self.infected = infected;
        self.resistant = resistant;
        self.observed_infected = self.observe(rng);
        Ok(())
    }

    /// Counterfactual step from `(infected, resistant)` immunizing `action`.
    /// Leaves the environment untouched.
    pub fn simulate_step<R: Rng + ?Sized>(
        &self,
        infected: NodeSet,
        resistant: NodeSet,
        action: usize,
        rng: &mut R,
    ) -> Result<Transition, EnvError> {
        self.check_node(action)?;
        Ok(self.counterfactual(infected, resistant, action, rng))
    }

    /// Final score of a stabilized process.
    pub fn value(&self) -> Result<FinalValue, EnvError> {
        if !self.has_stabilized() {
            return Err(EnvError::NotStabilized);
        }
        let infected_count = self.infected.len();
        let resistant_count = self.resistant.len();
        Ok(FinalValue {
            infected_count,
            resistant_count,
            value: -((infected_count + resistant_count) as i64),
        })
    }

    fn check_node(&self, node: usize) -> Result<(), EnvError> {
        if node < self.graph.node_count() {
            Ok(())
        } else {
            Err(EnvError::InvalidNode {
                node,
                nodes: self.graph.node_count(),
            })
        }
    }

    fn counterfactual<R: Rng + ?Sized>(
        &self,
        infected: NodeSet,
        resistant: NodeSet,
        action: usize,
        rng: &mut R,
    ) -> Transition {
        let (next_infected, next_resistant) = self.advance(infected, resistant, Some(action), rng);
        Transition {
            infected: next_infected,
            resistant: next_resistant,
            reward: infected.len() as i64 - next_infected.len() as i64 - 1,
        }
    }

    /// Immunize `action` (if any), then propagate one round.
    fn advance<R: Rng + ?Sized>(
        &self,
        mut infected: NodeSet,
        mut resistant: NodeSet,
        action: Option<usize>,
        rng: &mut R,
    ) -> (NodeSet, NodeSet) {
        if let Some(node) = action {
            infected.remove(node);
            resistant.insert(node);
        }
        let next = self
            .graph
            .propagate(infected, resistant, self.dynamics.infect_probability, rng);
        (next, resistant)
    }

    /// Reveal each infected node independently unless it is a false negative.
    fn observe<R: Rng + ?Sized>(&self, rng: &mut R) -> NodeSet {
        self.infected
            .iter()
            .filter(|_| !rng.gen_bool(self.dynamics.false_negative_probability))
            .collect()
    }
}

impl ContagionModel for Environment {
    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn observed_infected(&self) -> NodeSet {
        self.observed_infected
    }

    fn resistant(&self) -> NodeSet {
        self.resistant
    }

    fn is_stable(&self, infected: NodeSet, resistant: NodeSet) -> bool {
        self.graph.is_stable(infected, resistant)
    }

    fn transition<R: Rng + ?Sized>(
        &self,
        infected: NodeSet,
        resistant: NodeSet,
        action: usize,
        rng: &mut R,
    ) -> Transition {
        self.counterfactual(infected, resistant, action, rng)
    }
}
