use std::collections::HashMap;

use crate::tree::{
    error::SearchError,
    ids::{NodeSet, StateKey},
    node::TreeNode,
    snapshot::{ActionSnapshot, NodeSnapshot, TREE_SNAPSHOT_SCHEMA_VERSION, TreeSnapshot},
};

#[derive(Debug, Clone, Default)]
/// State-keyed search tree shared by every simulation of one trial.
/// Nodes are created lazily, one per simulation, and are never removed.
pub struct SearchTree {
    nodes: HashMap<StateKey, TreeNode>,
}

impl SearchTree {
    /// Create an empty tree. One tree should live for exactly one trial.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return how many belief states the tree holds.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, key: &StateKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Return an immutable node handle.
    pub fn node(&self, key: &StateKey) -> Result<&TreeNode, SearchError> {
        self.nodes
            .get(key)
            .ok_or(SearchError::MissingNode { key: *key })
    }

    /// Return a mutable node handle.
    pub(crate) fn node_mut(&mut self, key: &StateKey) -> Result<&mut TreeNode, SearchError> {
        self.nodes
            .get_mut(key)
            .ok_or(SearchError::MissingNode { key: *key })
    }

    /// Insert a fresh node for `key` with zeroed stats for every candidate.
    /// Returns `false` if the key was already present; the existing node is kept.
    pub(crate) fn expand(&mut self, key: StateKey, candidates: NodeSet) -> bool {
        if self.nodes.contains_key(&key) {
            return false;
        }
        self.nodes.insert(key, TreeNode::new(candidates));
        true
    }

    /// Pick the action with the highest running mean at `key`.
    ///
    /// When no action at `key` has been backed up yet, the lowest-index candidate is returned.
    pub fn best_action(&self, key: &StateKey) -> Result<Option<usize>, SearchError> {
        let node = self.node(key)?;
        Ok(node
            .best_by_mean()
            .or_else(|| node.actions().map(|(action, _)| action).next()))
    }

    /// Capture a serializable, deterministically ordered view of the tree.
    pub fn snapshot(&self) -> TreeSnapshot {
        let mut nodes: Vec<NodeSnapshot> = self
            .nodes
            .iter()
            .map(|(key, node)| NodeSnapshot {
                infected: key.infected().iter().collect(),
                resistant: key.resistant().iter().collect(),
                visits: node.visits(),
                actions: node
                    .actions()
                    .map(|(action, stats)| ActionSnapshot {
                        action,
                        visits: stats.visits(),
                        mean: stats.mean(),
                    })
                    .collect(),
            })
            .collect();

        nodes.sort_by(|a, b| {
            (a.resistant.len(), &a.resistant, &a.infected).cmp(&(
                b.resistant.len(),
                &b.resistant,
                &b.infected,
            ))
        });

        TreeSnapshot {
            schema_version: TREE_SNAPSHOT_SCHEMA_VERSION,
            node_count: nodes.len(),
            nodes,
        }
    }
}
