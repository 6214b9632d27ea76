pub const DEFAULT_MAX_DEPTH: usize = 2048;

/// Limits on a single search. Left-recursive grammars never run out of
/// alternatives, so every search is bounded by `max_depth`, the number of
/// productions applied along the derivation path currently being explored.
/// `max_steps` additionally caps the total work, backtracking included.
///
/// A derivation applies at least one production per token for most
/// grammars (`S -> a S | ε` needs `n + 1` for `n` tokens), so inputs longer
/// than [`DEFAULT_MAX_DEPTH`] tokens need a larger `max_depth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeriveOptions {
    pub max_depth: usize,
    pub max_steps: Option<u64>,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_steps: None,
        }
    }
}

impl DeriveOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}
