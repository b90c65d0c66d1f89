//! Evaluation options

/// Tunable limits for one evaluation
///
/// Both limits surface as errors, never panics; the defaults are generous
/// enough that well-formed queries never hit them.
#[derive(Debug, Clone)]
pub struct EvalOptions {
    /// Maximum nesting depth of sub-query evaluation (EXISTS arguments,
    /// aggregate arguments, derived bindings, nested SELECTs)
    pub max_depth: usize,
    /// Maximum number of domain tuples enumerated across the whole
    /// evaluation; `None` means unlimited
    pub max_tuples: Option<usize>,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_tuples: None,
        }
    }
}

impl EvalOptions {
    /// Create options with the default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum sub-query nesting depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the domain tuple budget
    pub fn with_max_tuples(mut self, max_tuples: usize) -> Self {
        self.max_tuples = Some(max_tuples);
        self
    }
}
