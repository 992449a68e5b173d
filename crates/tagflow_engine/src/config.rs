//! Configuration for model construction and execution.

/// Configuration for [`ModelBuilder::build`](crate::ModelBuilder::build).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelConfig {
    /// Maximum number of handler `build` invocations during fixpoint
    /// resolution. Exceeding it is a configuration error.
    pub max_handler_builds: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_handler_builds: 10_000,
        }
    }
}

impl ModelConfig {
    /// Builder method to set the handler build budget.
    #[must_use]
    pub fn with_max_handler_builds(mut self, max: usize) -> Self {
        self.max_handler_builds = max;
        self
    }
}

/// Configuration for one [`Executor`](crate::Executor) run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Maximum element nesting depth, unbounded when `None`.
    pub max_depth: Option<usize>,
}

impl RunConfig {
    /// Builder method to bound the nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}
