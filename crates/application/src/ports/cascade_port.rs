//! Cascade simulation port

use domain::CascadeNode;
#[cfg(test)]
use mockall::automock;
use serde::Serialize;

/// Result of evaluating one call tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    /// Whether any evaluated node failed
    pub failed: bool,
    /// Nodes evaluated
    pub nodes_evaluated: u64,
    /// Nodes that failed
    pub failed_nodes: u64,
    /// Deepest level evaluated, the root being level 0
    pub deepest_level_reached: u32,
    /// Nodes evaluated per level, indexed from the root
    pub evaluated_per_level: Vec<u64>,
    /// Nodes failed per level, indexed from the root
    pub failed_per_level: Vec<u64>,
}

/// Simulates a tree of dependent calls
#[cfg_attr(test, automock)]
pub trait CascadePort: Send + Sync + std::fmt::Debug {
    /// Evaluate the tree rooted at `root`
    ///
    /// A failed node's subtree is never evaluated.
    fn simulate(&self, root: &CascadeNode) -> CascadeReport;
}
