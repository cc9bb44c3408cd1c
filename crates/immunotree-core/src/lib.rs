mod tree;

pub use tree::error::SearchError;
pub use tree::ids::{NodeSet, NodeSetIter, StateKey};
pub use tree::mcts::{
    SearchConfig, SearchConfigError, SearchEvent, SearchOutcome, search, search_with_hook,
};
pub use tree::model::{ContagionModel, Transition};
pub use tree::node::TreeNode;
pub use tree::rollout::rollout;
pub use tree::search_tree::SearchTree;
pub use tree::snapshot::{ActionSnapshot, NodeSnapshot, TreeSnapshot};
pub use tree::stats::ActionStats;
