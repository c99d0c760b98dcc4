//! Selection configuration from TOML (`[selection]` section)
//!
//! ```toml
//! [selection]
//! min_tools = 5    # floor for non-query intents
//! max_tools = 20   # cap for every request
//! ```

use opsgate_application::SelectionParams;
use serde::{Deserialize, Serialize};

/// Raw selection configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSelectionConfig {
    pub min_tools: usize,
    pub max_tools: usize,
}

impl Default for FileSelectionConfig {
    fn default() -> Self {
        let params = SelectionParams::default();
        Self {
            min_tools: params.min_tools,
            max_tools: params.max_tools,
        }
    }
}

impl FileSelectionConfig {
    pub fn to_selection_params(&self) -> SelectionParams {
        SelectionParams::default()
            .with_min_tools(self.min_tools)
            .with_max_tools(self.max_tools)
    }
}
