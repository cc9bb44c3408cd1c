/// Running statistics for one candidate action at one tree node.
/// The mean is updated incrementally and is `None` until the first backup.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActionStats {
    visits: u64,
    mean: Option<f64>,
}

impl ActionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve the amount of backups recorded for this action
    pub fn visits(&self) -> u64 {
        self.visits
    }

    /// Running mean of the backed-up values, if any were recorded.
    pub fn mean(&self) -> Option<f64> {
        self.mean
    }

    pub fn is_unvisited(&self) -> bool {
        self.visits == 0
    }

    /// Record one backed-up value.
    /// The first value seeds the mean; later values move it by `(value - mean) / visits`.
    pub fn record(&mut self, value: f64) {
        self.visits += 1;
        self.mean = Some(match self.mean {
            None => value,
            Some(mean) => mean + (value - mean) / self.visits as f64,
        });
    }

    /// Upper-confidence score used once every sibling has been tried.
    /// `candidate_count` scales the mean down to the exploration term's range.
    pub fn ucb_score(&self, parent_visits: u64, candidate_count: usize, c: f64) -> f64 {
        debug_assert!(self.visits > 0, "ucb_score on an unvisited action");
        let mean = self.mean.unwrap_or(0.0);
        mean / candidate_count as f64
            + c * f64::sqrt(f64::ln(parent_visits as f64) / self.visits as f64)
    }
}
