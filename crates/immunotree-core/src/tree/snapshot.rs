use serde::Serialize;

pub const TREE_SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct TreeSnapshot {
    pub schema_version: u32,
    pub node_count: usize,
    pub nodes: Vec<NodeSnapshot>,
}

impl TreeSnapshot {
    /// Render the snapshot as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub infected: Vec<usize>,
    pub resistant: Vec<usize>,
    pub visits: u64,
    pub actions: Vec<ActionSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionSnapshot {
    pub action: usize,
    pub visits: u64,
    pub mean: Option<f64>,
}
