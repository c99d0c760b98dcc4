//! Selection parameters: bounds for relevance ranking.
//!
//! [`SelectionParams`] holds the default floor and cap applied by
//! [`SelectToolsUseCase`](crate::use_cases::select_tools::SelectToolsUseCase)
//! when a request does not override them.

use opsgate_domain::selection::RankingLimits;
use serde::{Deserialize, Serialize};

/// Default bounds for one tool selection.
///
/// | Field | Applies to | Default |
/// |-------|------------|---------|
/// | `min_tools` | non-query intents (query intent has no floor) | 5 |
/// | `max_tools` | every request | 20 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionParams {
    pub min_tools: usize,
    pub max_tools: usize,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            min_tools: 5,
            max_tools: 20,
        }
    }
}

impl SelectionParams {
    pub fn with_min_tools(mut self, min: usize) -> Self {
        self.min_tools = min;
        self
    }

    pub fn with_max_tools(mut self, max: usize) -> Self {
        self.max_tools = max;
        self
    }

    /// Limits for one request, with per-request overrides applied.
    pub fn limits(&self, min_tools: Option<usize>, max_tools: Option<usize>) -> RankingLimits {
        RankingLimits {
            min_tools: min_tools.unwrap_or(self.min_tools),
            max_tools: max_tools.unwrap_or(self.max_tools),
        }
    }
}
