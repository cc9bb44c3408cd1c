use std::fmt;

use crate::tree::ids::StateKey;

/// Error type for search tree bookkeeping and planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// A state expected to be in the tree was not found.
    MissingNode { key: StateKey },
    /// A non-terminal state offered no candidate action.
    NoCandidates { key: StateKey },
    /// The selected action has no statistics entry on its node.
    MissingActionStats { key: StateKey, action: usize },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::MissingNode { key } => write!(f, "missing tree node for state {key}"),
            SearchError::NoCandidates { key } => {
                write!(f, "no candidate action for non-terminal state {key}")
            }
            SearchError::MissingActionStats { key, action } => write!(
                f,
                "missing statistics for action {action} on state {key}"
            ),
        }
    }
}

impl std::error::Error for SearchError {}
