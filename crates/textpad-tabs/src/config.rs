//! Tab controller configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabsConfig {
    /// Label prefix for tabs that are not bound to a file
    pub untitled_label: String,
    /// Question shown before closing a tab with unsaved changes
    pub close_prompt: String,
    /// Close the initial blank tab when the first real file is opened
    pub replace_pristine_tab: bool,
}

impl Default for TabsConfig {
    fn default() -> Self {
        Self {
            untitled_label: "Untitled".to_string(),
            close_prompt: "Do you want to save the file before closing?".to_string(),
            replace_pristine_tab: true,
        }
    }
}
