//! Collaborator interfaces
//!
//! The tab controller does not edit text, touch the file system or draw
//! dialogs itself. Everything it needs from the outside world comes through
//! the traits below, injected at construction time.

use std::fmt;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::event::TabEvent;

/// Editable text content owned by exactly one tab.
pub trait Session: fmt::Debug + Send + Sync {
    fn current_content(&self) -> String;
}

pub type SessionHandle = Arc<dyn Session>;

/// Sessions are compared by identity, never by content.
pub fn same_session(a: &SessionHandle, b: &SessionHandle) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// The text-editing widget.
pub trait EditorWidget: Send + Sync {
    fn new_session(&self, initial_content: Option<String>) -> SessionHandle;

    /// Bind the visible editor to `session`
    fn set_session(&self, session: SessionHandle);
}

pub type EntryWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Handle to a location in persistent storage.
#[async_trait]
pub trait FileEntry: fmt::Debug + Send + Sync {
    fn name(&self) -> String;

    async fn read_all(&self) -> io::Result<String>;

    /// Open a stream that replaces the file's contents
    async fn create_writer(&self) -> io::Result<EntryWriter>;
}

pub type EntryHandle = Arc<dyn FileEntry>;

pub fn same_entry(a: &EntryHandle, b: &EntryHandle) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChooseMode {
    /// Pick an existing, writable file
    Open,
    /// Pick a destination, creating or overwriting it
    Save,
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Let the user pick a file. `None` means the user cancelled.
    async fn choose_entry(&self, mode: ChooseMode) -> Option<EntryHandle>;

    async fn display_path(&self, entry: &EntryHandle) -> io::Result<String>;
}

/// Content of a confirmation dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmPrompt {
    text: String,
    buttons: Vec<(String, String)>,
}

impl ConfirmPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn reset_buttons(&mut self) {
        self.buttons.clear();
    }

    pub fn add_button(&mut self, key: impl Into<String>, label: impl Into<String>) {
        self.buttons.push((key.into(), label.into()));
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// `(key, label)` pairs in display order
    pub fn buttons(&self) -> &[(String, String)] {
        &self.buttons
    }
}

#[async_trait]
pub trait Dialog: Send + Sync {
    /// Present the prompt and resolve with the key of the chosen button.
    async fn show(&self, prompt: ConfirmPrompt) -> String;
}

/// Sink for tab lifecycle notifications.
pub trait EventBus: Send + Sync {
    fn publish(&self, event: TabEvent);
}
