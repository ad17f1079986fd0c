//! Editor instance
//!
//! Owns the tab controller and the event hub for one editor window, and
//! forwards the widget's "document changed" signal to the controller.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use textpad_tabs::{Dialog, EditorWidget, FileStore, SessionHandle, TabEvent, TabId, Tabs};

use crate::config::Config;
use crate::hub::EventHub;

pub struct Editor {
    config: Config,
    hub: Arc<EventHub>,
    tabs: Tabs,
    /// Task draining the widget's change signals
    change_pump: Mutex<Option<JoinHandle<()>>>,
}

impl Editor {
    pub fn new(
        config: Config,
        widget: Arc<dyn EditorWidget>,
        store: Arc<dyn FileStore>,
        dialog: Arc<dyn Dialog>,
    ) -> Self {
        let hub = Arc::new(EventHub::new());
        let tabs = Tabs::new(widget, store, dialog, hub.clone(), config.tabs.clone());

        Self {
            config,
            hub,
            tabs,
            change_pump: Mutex::new(None),
        }
    }

    /// Open the initial blank tab. Returns the current tab.
    pub async fn initialize(&self) -> TabId {
        if let Some(id) = self.tabs.current_id() {
            return id;
        }

        let id = self.tabs.new_tab(None, None).await;

        tracing::info!(tab_id = %id, "Editor initialized");

        id
    }

    pub fn tabs(&self) -> &Tabs {
        &self.tabs
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TabEvent> {
        self.hub.subscribe()
    }

    /// Feed the widget's change signals into the tab controller.
    ///
    /// Replaces any pump started earlier. Must be called within a tokio
    /// runtime.
    pub fn spawn_change_pump(&self, mut signals: mpsc::UnboundedReceiver<SessionHandle>) {
        let tabs = self.tabs.clone();
        let handle = tokio::spawn(async move {
            while let Some(session) = signals.recv().await {
                // Failures are logged by the controller
                let _ = tabs.on_doc_changed(&session);
            }
            tracing::debug!("Change signal channel closed");
        });

        if let Some(previous) = self.change_pump.lock().replace(handle) {
            previous.abort();
        }
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        if let Some(pump) = self.change_pump.lock().take() {
            pump.abort();
        }
    }
}
