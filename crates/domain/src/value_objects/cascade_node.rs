//! Cascade call-tree node

use serde::Serialize;

use crate::{
    errors::ConfigurationError,
    limits::{MAX_CASCADE_DEPTH, MAX_CASCADE_FANOUT, MAX_CASCADE_NODES},
    value_objects::{Probability, policies::check_u32},
};

/// Root of a simulated call tree
///
/// Every node in the tree shares the root's fan-out and failure probability;
/// children sit one level shallower than their parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CascadeNode {
    depth: u32,
    fanout: u32,
    failure_probability: Probability,
}

impl CascadeNode {
    /// Create a validated cascade root
    pub fn new(
        depth: u32,
        fanout: u32,
        failure_probability: Probability,
    ) -> Result<Self, ConfigurationError> {
        let depth = check_u32("depth", depth, 0, MAX_CASCADE_DEPTH)?;
        let fanout = check_u32("fanout", fanout, 1, MAX_CASCADE_FANOUT)?;

        let worst_case = worst_case_nodes(depth, fanout);
        if worst_case > MAX_CASCADE_NODES {
            return Err(ConfigurationError::invalid(
                "fanout",
                format!(
                    "depth {depth} with fanout {fanout} could evaluate {worst_case} nodes \
                     (max {MAX_CASCADE_NODES})"
                ),
            ));
        }

        Ok(Self {
            depth,
            fanout,
            failure_probability,
        })
    }

    /// Remaining levels below this node
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Children per successful node
    #[must_use]
    pub const fn fanout(&self) -> u32 {
        self.fanout
    }

    /// Per-node failure probability
    #[must_use]
    pub const fn failure_probability(&self) -> Probability {
        self.failure_probability
    }

    /// Nodes evaluated if nothing fails
    #[must_use]
    pub fn worst_case_nodes(&self) -> u64 {
        worst_case_nodes(self.depth, self.fanout)
    }
}

/// `1 + f + f^2 + ... + f^depth`, saturating
fn worst_case_nodes(depth: u32, fanout: u32) -> u64 {
    let fanout = u64::from(fanout);
    let mut level = 1_u64;
    let mut total = 1_u64;
    for _ in 0..depth {
        level = level.saturating_mul(fanout);
        total = total.saturating_add(level);
    }
    total
}
