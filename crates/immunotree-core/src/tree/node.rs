use std::collections::BTreeMap;

use crate::tree::{ids::NodeSet, stats::ActionStats};

#[derive(Debug, Clone)]
/// Memoized statistics for one belief state.
/// Holds a zeroed `ActionStats` entry for every candidate from the moment it is created,
/// keyed by node index so iteration is always in ascending order.
pub struct TreeNode {
    visits: u64,
    actions: BTreeMap<usize, ActionStats>,
}

impl TreeNode {
    /// Create an unvisited node with one entry per candidate action.
    pub fn new(candidates: NodeSet) -> Self {
        TreeNode {
            visits: 0,
            actions: candidates
                .iter()
                .map(|action| (action, ActionStats::new()))
                .collect(),
        }
    }

    /// Total backups that passed through this node.
    pub fn visits(&self) -> u64 {
        self.visits
    }

    pub fn candidate_count(&self) -> usize {
        self.actions.len()
    }

    pub fn action(&self, action: usize) -> Option<&ActionStats> {
        self.actions.get(&action)
    }

    /// Iterate `(action, stats)` pairs in ascending action order.
    pub fn actions(&self) -> impl Iterator<Item = (usize, &ActionStats)> {
        self.actions.iter().map(|(action, stats)| (*action, stats))
    }

    /// Lowest-index action that has never been backed up.
    pub fn first_unvisited(&self) -> Option<usize> {
        self.actions
            .iter()
            .find(|(_, stats)| stats.is_unvisited())
            .map(|(action, _)| *action)
    }

    /// Pick the next action to descend into.
    ///
    /// While the node has fewer visits than candidates, an untried action is chosen first,
    /// so the UCB branch never sees a zero visit count. After that the highest UCB score
    /// wins, ties going to the lowest action index.
    pub fn select(&self, c: f64) -> Option<usize> {
        if self.visits < self.actions.len() as u64 {
            if let Some(action) = self.first_unvisited() {
                return Some(action);
            }
        }
        self.select_ucb(c)
    }

    fn select_ucb(&self, c: f64) -> Option<usize> {
        let candidate_count = self.actions.len();
        let mut best: Option<(usize, f64)> = None;

        for (action, stats) in &self.actions {
            let score = stats.ucb_score(self.visits, candidate_count, c);
            match best {
                Some((_, best_score)) if best_score >= score => {}
                _ => best = Some((*action, score)),
            }
        }

        best.map(|(action, _)| action)
    }

    /// Action with the highest running mean; actions without a mean are skipped.
    /// Ties go to the lowest action index.
    pub fn best_by_mean(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;

        for (action, stats) in &self.actions {
            let Some(mean) = stats.mean() else {
                continue;
            };
            match best {
                Some((_, best_mean)) if best_mean >= mean => {}
                _ => best = Some((*action, mean)),
            }
        }

        best.map(|(action, _)| action)
    }

    /// Backpropagate one value through this node along `action`.
    /// Returns `None` if `action` is not a candidate here, leaving the node untouched.
    pub(crate) fn record(&mut self, action: usize, value: f64) -> Option<()> {
        let stats = self.actions.get_mut(&action)?;
        stats.record(value);
        self.visits += 1;
        Some(())
    }
}
