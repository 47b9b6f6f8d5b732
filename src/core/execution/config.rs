/// Configuration for circuit evaluation
///
/// This module provides the knobs of the evaluation driver: how many passes
/// it may take before giving up and in which order elements run in a pass.

/// Order in which a composite's elements run during one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingOrder {
    /// Sub-components (depth-first, declaration order), then the composite's own wires
    ChildrenFirst,
    /// The composite's own wires, then its sub-components (depth-first, declaration order)
    WiresFirst,
}

impl Default for SchedulingOrder {
    fn default() -> Self {
        SchedulingOrder::ChildrenFirst
    }
}

/// Configuration for evaluation
///
/// Holds the pass cap used to detect networks that never settle, and the
/// scheduling order applied inside every composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationConfig {
    /// Maximum number of full passes before the network is reported as not converging
    pub max_passes: usize,
    /// Order of sub-components and wires within a pass
    pub scheduling: SchedulingOrder,
}

impl EvaluationConfig {
    pub const DEFAULT_MAX_PASSES: usize = 100;

    /// Create a configuration with default values
    ///
    /// Default configuration allows 100 passes in children-first order
    pub fn new() -> Self {
        Self {
            max_passes: Self::DEFAULT_MAX_PASSES,
            scheduling: SchedulingOrder::default(),
        }
    }

    /// Set the pass cap
    ///
    /// # Arguments
    /// * `passes` - Maximum number of full passes; zero is raised to one
    ///
    /// # Returns
    /// Self for method chaining
    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes.max(1);
        self
    }

    /// Set the scheduling order used inside every composite
    ///
    /// # Arguments
    /// * `order` - Whether sub-components or wires run first in a pass
    ///
    /// # Returns
    /// Self for method chaining
    pub fn with_scheduling(mut self, order: SchedulingOrder) -> Self {
        self.scheduling = order;
        self
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self::new()
    }
}
