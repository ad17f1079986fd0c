//! Tab lifecycle events

use serde::{Deserialize, Serialize};

use crate::tab::TabId;

/// Copy of a tab's visible state at the moment an event was raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabSnapshot {
    pub id: TabId,
    pub name: String,
    pub path: Option<String>,
    pub saved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum TabEvent {
    #[serde(rename = "newtab")]
    Created(TabSnapshot),
    #[serde(rename = "switchtab")]
    Switched(TabSnapshot),
    #[serde(rename = "tabclosed")]
    Closed(TabSnapshot),
    /// A clean tab just became dirty
    #[serde(rename = "tabchange")]
    Changed(TabSnapshot),
    #[serde(rename = "tabsave")]
    Saved(TabSnapshot),
    /// The display name changed because the tab was bound to another file
    #[serde(rename = "tabrenamed")]
    Renamed(TabSnapshot),
    #[serde(rename = "tabsavefailed")]
    SaveFailed { tab: TabSnapshot, error: String },
}

impl TabEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TabEvent::Created(_) => "newtab",
            TabEvent::Switched(_) => "switchtab",
            TabEvent::Closed(_) => "tabclosed",
            TabEvent::Changed(_) => "tabchange",
            TabEvent::Saved(_) => "tabsave",
            TabEvent::Renamed(_) => "tabrenamed",
            TabEvent::SaveFailed { .. } => "tabsavefailed",
        }
    }

    pub fn tab(&self) -> &TabSnapshot {
        match self {
            TabEvent::Created(tab)
            | TabEvent::Switched(tab)
            | TabEvent::Closed(tab)
            | TabEvent::Changed(tab)
            | TabEvent::Saved(tab)
            | TabEvent::Renamed(tab)
            | TabEvent::SaveFailed { tab, .. } => tab,
        }
    }
}

impl std::fmt::Display for TabEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name(), self.tab().id)
    }
}
