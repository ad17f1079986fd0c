//! Textpad Core
//!
//! Application wiring for the editor: configuration, logging, the
//! in-process event hub and the [`Editor`] that ties the tab controller to
//! the editing widget.

mod config;
mod editor;
mod error;
mod hub;

pub use config::Config;
pub use editor::Editor;
pub use error::CoreError;
pub use hub::EventHub;

// Re-export the tab controller
pub use textpad_tabs::{
    ChooseMode, CloseOutcome, ConfirmPrompt, Dialog, EditorWidget, EntryHandle, EventBus,
    FileEntry, FileStore, OpenOutcome, SaveOutcome, Session, SessionHandle, Tab, TabError,
    TabEvent, TabId, TabSnapshot, Tabs, TabsConfig,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
///
/// `RUST_LOG` wins over `default_filter`.
pub fn init_logging(default_filter: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Embedders may already have installed a subscriber
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
