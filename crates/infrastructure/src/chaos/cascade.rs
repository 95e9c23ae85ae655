//! Cascading failure simulator
//!
//! Walks a uniform call tree depth first with an explicit stack. Tree size
//! is capped by [`CascadeNode`] validation, so a single evaluation always
//! has bounded cost.

use std::sync::Arc;

use application::ports::{CascadePort, CascadeReport, RandomPort};
use domain::CascadeNode;
use tracing::debug;

/// Cascade simulator drawing node failures from a shared random source
#[derive(Debug)]
pub struct CascadeSimulator {
    random: Arc<dyn RandomPort>,
}

impl CascadeSimulator {
    /// Create a new cascade simulator
    pub fn new(random: Arc<dyn RandomPort>) -> Self {
        Self { random }
    }
}

impl CascadePort for CascadeSimulator {
    fn simulate(&self, root: &CascadeNode) -> CascadeReport {
        let probability = root.failure_probability();
        let levels = root.depth() as usize + 1;
        let mut report = CascadeReport {
            evaluated_per_level: vec![0; levels],
            failed_per_level: vec![0; levels],
            ..CascadeReport::default()
        };

        // Each entry is the level of a pending node, the root being 0.
        let mut stack: Vec<u32> = vec![0];
        while let Some(level) = stack.pop() {
            let index = level as usize;
            report.nodes_evaluated += 1;
            report.evaluated_per_level[index] += 1;
            report.deepest_level_reached = report.deepest_level_reached.max(level);

            if probability.hit(self.random.next_f64()) {
                report.failed = true;
                report.failed_nodes += 1;
                report.failed_per_level[index] += 1;
                continue;
            }

            if level < root.depth() {
                stack.extend(std::iter::repeat_n(level + 1, root.fanout() as usize));
            }
        }

        debug!(
            depth = root.depth(),
            fanout = root.fanout(),
            nodes_evaluated = report.nodes_evaluated,
            failed_nodes = report.failed_nodes,
            "Cascade evaluated"
        );

        report
    }
}
