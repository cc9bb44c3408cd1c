use immunotree_core::NodeSet;
use rand::Rng;

use crate::EnvError;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Static undirected contact network without self-loops.
/// Each node stores its neighbourhood as a `NodeSet`, so `adjacency[i]` holds `j` iff it holds `i`
/// in `adjacency[j]`.
pub struct ContactGraph {
    adjacency: Vec<NodeSet>,
}

impl ContactGraph {
    /// Create a graph with `n` isolated nodes.
    pub fn empty(n: usize) -> Result<Self, EnvError> {
        if n == 0 {
            return Err(EnvError::EmptyGraph);
        }
        if n > NodeSet::CAPACITY {
            return Err(EnvError::TooManyNodes {
                nodes: n,
                capacity: NodeSet::CAPACITY,
            });
        }
        Ok(Self {
            adjacency: vec![NodeSet::empty(); n],
        })
    }

    /// Sample an Erdős–Rényi graph: every unordered pair is an edge with `edge_probability`.
    pub fn erdos_renyi<R: Rng + ?Sized>(
        n: usize,
        edge_probability: f64,
        rng: &mut R,
    ) -> Result<Self, EnvError> {
        if !(0.0..=1.0).contains(&edge_probability) {
            return Err(EnvError::InvalidProbability {
                name: "edge_probability",
                value: edge_probability,
            });
        }

        let mut graph = Self::empty(n)?;
        for i in 0..n {
            for j in (i + 1)..n {
                if rng.gen_bool(edge_probability) {
                    graph.connect(i, j);
                }
            }
        }
        Ok(graph)
    }

    /// Build a graph from an explicit undirected edge list.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self, EnvError> {
        let mut graph = Self::empty(n)?;
        for &(a, b) in edges {
            if a == b || a >= n || b >= n {
                return Err(EnvError::InvalidEdge { a, b, nodes: n });
            }
            graph.connect(a, b);
        }
        Ok(graph)
    }

    fn connect(&mut self, a: usize, b: usize) {
        self.adjacency[a].insert(b);
        self.adjacency[b].insert(a);
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// The set `{0, .., n-1}`.
    pub fn nodes(&self) -> NodeSet {
        NodeSet::full(self.node_count())
    }

    /// Neighbourhood of `node`; empty for unknown nodes.
    pub fn neighbours(&self, node: usize) -> NodeSet {
        self.adjacency.get(node).copied().unwrap_or_default()
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.neighbours(a).contains(b)
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(NodeSet::len).sum::<usize>() / 2
    }

    /// Nodes adjacent to `infected` that are neither infected nor resistant.
    pub fn frontier(&self, infected: NodeSet, resistant: NodeSet) -> NodeSet {
        let closed = infected.union(resistant);
        infected
            .iter()
            .fold(NodeSet::empty(), |acc, i| acc.union(self.neighbours(i)))
            .difference(closed)
    }

    /// Whether the contagion can no longer reach a new node.
    pub fn is_stable(&self, infected: NodeSet, resistant: NodeSet) -> bool {
        self.frontier(infected, resistant).is_empty()
    }

    /// Neighbours of `node` that are neither infected nor resistant.
    pub fn susceptible_neighbour_count(
        &self,
        node: usize,
        infected: NodeSet,
        resistant: NodeSet,
    ) -> usize {
        self.neighbours(node)
            .difference(infected.union(resistant))
            .len()
    }

    /// Advance the contagion by one round and return the next infected set.
    ///
    /// Only nodes in the input `infected` set act as sources; each source makes one
    /// independent attempt with `infect_probability` on every neighbour that is not
    /// resistant and not yet infected, so concurrent attempts on one node combine as an OR.
    pub fn propagate<R: Rng + ?Sized>(
        &self,
        infected: NodeSet,
        resistant: NodeSet,
        infect_probability: f64,
        rng: &mut R,
    ) -> NodeSet {
        let mut next = infected;
        for source in infected.iter() {
            for target in self.neighbours(source).iter() {
                if resistant.contains(target) || next.contains(target) {
                    continue;
                }
                if rng.gen_bool(infect_probability) {
                    next.insert(target);
                }
            }
        }
        next
    }
}
