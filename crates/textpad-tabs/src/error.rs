//! Tab error types

use thiserror::Error;

use crate::state::CloseState;
use crate::tab::TabId;

#[derive(Error, Debug)]
pub enum TabError {
    #[error("Tab not found: {0}")]
    NotFound(TabId),

    #[error("Changed session does not belong to any open tab")]
    UnknownSession,

    #[error("Tab {0} is not bound to a file")]
    NoEntry(TabId),

    #[error("Tab {0} is already being saved")]
    SaveInProgress(TabId),

    #[error("File is already open in tab {0}")]
    AlreadyOpen(TabId),

    #[error("No current tab")]
    NoCurrentTab,

    #[error("Invalid close transition: {from} -> {to}")]
    InvalidTransition { from: CloseState, to: CloseState },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
