//! Parser configuration.

use tagflow_engine::RunConfig;

/// Configuration for a [`Parser`](crate::Parser).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParserConfig {
    /// Limits applied to every run.
    pub run: RunConfig,
    /// Trim surrounding whitespace from text parsed by the built-in
    /// tokenizer and drop text that is entirely whitespace.
    pub trim_text: bool,
}

impl ParserConfig {
    /// Builder method to set the run limits.
    #[must_use]
    pub fn with_run(mut self, run: RunConfig) -> Self {
        self.run = run;
        self
    }

    /// Builder method to bound the nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.run = self.run.with_max_depth(depth);
        self
    }

    /// Builder method to enable text trimming.
    #[must_use]
    pub fn with_trim_text(mut self, trim: bool) -> Self {
        self.trim_text = trim;
        self
    }
}
