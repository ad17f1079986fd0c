//! Textpad Tab Management
//!
//! The document/tab controller of the editor: which documents are open,
//! which one is shown, which ones have unsaved changes, and the
//! open/save/close lifecycle around them. Text editing, file access and
//! dialogs are collaborators behind the traits in [`collab`].

pub mod collab;
mod config;
mod error;
mod event;
mod manager;
mod state;
mod tab;

#[cfg(test)]
mod fakes;

pub use collab::{
    ChooseMode, ConfirmPrompt, Dialog, EditorWidget, EntryHandle, EntryWriter, EventBus,
    FileEntry, FileStore, Session, SessionHandle,
};
pub use config::TabsConfig;
pub use error::TabError;
pub use event::{TabEvent, TabSnapshot};
pub use manager::{CloseOutcome, OpenOutcome, SaveOutcome, Tabs};
pub use state::{CloseAnswer, CloseState};
pub use tab::{PendingSave, Tab, TabId};

pub type Result<T> = std::result::Result<T, TabError>;
