//! Tab controller
//!
//! Owns the ordered set of open tabs and the current tab, and runs the
//! open/save/close lifecycle against the injected collaborators.
//!
//! Every registry mutation happens inside one short lock scope. Locks are
//! never held across an `.await`, nor while calling the widget or publishing
//! events, so collaborators may call back into the controller.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::collab::{
    same_session, ChooseMode, ConfirmPrompt, Dialog, EditorWidget, EntryHandle, EventBus,
    FileStore, SessionHandle,
};
use crate::config::TabsConfig;
use crate::error::TabError;
use crate::event::{TabEvent, TabSnapshot};
use crate::state::{CloseAnswer, CloseFlow, CloseState};
use crate::tab::{PendingSave, Tab, TabId};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The user dismissed the file chooser
    Cancelled,
    /// The file was already open; its tab is now current
    Switched(TabId),
    Opened(TabId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The user dismissed the destination chooser
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    /// The user cancelled the save prompt
    Cancelled,
    /// Save-then-close did not end with a clean tab, so it stays open
    Kept,
}

#[derive(Default)]
struct Registry {
    /// Display order
    tabs: Vec<Tab>,
    current: Option<TabId>,
}

impl Registry {
    fn position(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id() == id)
    }

    fn get(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id() == id)
    }

    fn get_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id() == id)
    }

    /// Smallest positive id not held by an open tab
    fn allocate_id(&self) -> TabId {
        let mut id = 1;
        while self.tabs.iter().any(|t| t.id().get() == id) {
            id += 1;
        }
        TabId::new(id)
    }

    fn find_by_path(&self, path: &str) -> Option<TabId> {
        self.tabs
            .iter()
            .find(|t| t.path() == Some(path))
            .map(Tab::id)
    }

    fn find_by_session(&self, session: &SessionHandle) -> Option<TabId> {
        self.tabs
            .iter()
            .find(|t| same_session(t.session(), session))
            .map(Tab::id)
    }
}

/// Handle to the tab registry of one editor.
///
/// Clones share the same registry. Operations assume they are driven from a
/// single logical thread: each registry mutation is atomic, but a multi-step
/// operation such as closing the current tab (move to another tab, then
/// remove) may interleave with operations running on another thread.
pub struct Tabs {
    registry: Arc<RwLock<Registry>>,
    widget: Arc<dyn EditorWidget>,
    store: Arc<dyn FileStore>,
    dialog: Arc<dyn Dialog>,
    bus: Arc<dyn EventBus>,
    config: Arc<TabsConfig>,
    untitled_label: Arc<str>,
}

impl Tabs {
    pub fn new(
        widget: Arc<dyn EditorWidget>,
        store: Arc<dyn FileStore>,
        dialog: Arc<dyn Dialog>,
        bus: Arc<dyn EventBus>,
        config: TabsConfig,
    ) -> Self {
        let untitled_label = Arc::from(config.untitled_label.as_str());
        Self {
            registry: Arc::new(RwLock::new(Registry::default())),
            widget,
            store,
            dialog,
            bus,
            config: Arc::new(config),
            untitled_label,
        }
    }

    /// Get a copy of a tab by ID
    pub fn get_tab_by_id(&self, id: TabId) -> Option<Tab> {
        self.registry.read().get(id).cloned()
    }

    pub fn current_tab(&self) -> Option<Tab> {
        let registry = self.registry.read();
        registry.current.and_then(|id| registry.get(id)).cloned()
    }

    pub fn current_id(&self) -> Option<TabId> {
        self.registry.read().current
    }

    pub fn len(&self) -> usize {
        self.registry.read().tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.read().tabs.is_empty()
    }

    /// Tab ids in display order
    pub fn tab_ids(&self) -> Vec<TabId> {
        self.registry.read().tabs.iter().map(Tab::id).collect()
    }

    pub fn snapshots(&self) -> Vec<TabSnapshot> {
        self.registry.read().tabs.iter().map(Tab::snapshot).collect()
    }

    /// Create a tab, optionally bound to a file, and make it current.
    ///
    /// The display path of `entry` is resolved before the tab is added, so
    /// the tab never shows up with a pending path.
    pub async fn new_tab(&self, content: Option<String>, entry: Option<EntryHandle>) -> TabId {
        let path = match &entry {
            Some(entry) => self.resolve_path(entry).await,
            None => None,
        };
        self.insert_tab(content, entry, path)
    }

    fn insert_tab(
        &self,
        content: Option<String>,
        entry: Option<EntryHandle>,
        path: Option<String>,
    ) -> TabId {
        let session = self.widget.new_session(content);

        let snapshot = {
            let mut registry = self.registry.write();
            let id = registry.allocate_id();
            let mut tab = Tab::new(id, session, entry.clone(), Arc::clone(&self.untitled_label));
            if let (Some(entry), Some(path)) = (&entry, path) {
                tab.set_path(entry, path);
            }
            let snapshot = tab.snapshot();
            registry.tabs.push(tab);
            snapshot
        };

        tracing::info!(tab_id = %snapshot.id, name = %snapshot.name, "Created new tab");

        let id = snapshot.id;
        self.bus.publish(TabEvent::Created(snapshot));
        if let Err(e) = self.show_tab(id) {
            tracing::error!(tab_id = %id, error = %e, "Failed to show new tab");
        }
        id
    }

    /// Make a tab current and bind the editor to its session
    pub fn show_tab(&self, id: TabId) -> Result<()> {
        let (session, snapshot) = {
            let mut registry = self.registry.write();
            let Some(tab) = registry.get(id) else {
                return Err(not_found(id, "show"));
            };
            let found = (Arc::clone(tab.session()), tab.snapshot());
            registry.current = Some(id);
            found
        };

        self.widget.set_session(session);

        tracing::debug!(tab_id = %id, "Switched tab");

        self.bus.publish(TabEvent::Switched(snapshot));
        Ok(())
    }

    /// Advance to the next tab, wrapping around. Returns the new current tab.
    pub fn next_tab(&self) -> Option<TabId> {
        self.cycle(|index, len| (index + 1) % len)
    }

    pub fn previous_tab(&self) -> Option<TabId> {
        self.cycle(|index, len| (index + len - 1) % len)
    }

    fn cycle(&self, step: impl Fn(usize, usize) -> usize) -> Option<TabId> {
        let target = {
            let registry = self.registry.read();
            let index = registry.position(registry.current?)?;
            let target = step(index, registry.tabs.len());
            if target == index {
                return None;
            }
            registry.tabs[target].id()
        };

        self.show_tab(target).ok()?;
        Some(target)
    }

    /// Let the user pick a file and open it
    pub async fn open_file(&self) -> Result<OpenOutcome> {
        let entry = self.store.choose_entry(ChooseMode::Open).await;
        self.open_file_entry(entry).await
    }

    /// Open `entry` in a tab, or switch to the tab that already shows it.
    pub async fn open_file_entry(&self, entry: Option<EntryHandle>) -> Result<OpenOutcome> {
        let Some(entry) = entry else {
            tracing::debug!("Open cancelled");
            return Ok(OpenOutcome::Cancelled);
        };

        let path = self.resolve_path(&entry).await;
        if let Some(existing) = self.find_open(path.as_deref()) {
            self.show_tab(existing)?;
            return Ok(OpenOutcome::Switched(existing));
        }

        let content = entry.read_all().await.map_err(|e| {
            tracing::error!(name = %entry.name(), error = %e, "Failed to read file");
            TabError::from(e)
        })?;

        // The same file may have been opened while the read was pending
        if let Some(existing) = self.find_open(path.as_deref()) {
            self.show_tab(existing)?;
            return Ok(OpenOutcome::Switched(existing));
        }

        let id = self.insert_tab(Some(content), Some(entry), path);

        if self.config.replace_pristine_tab {
            self.close_pristine_placeholder(id);
        }

        Ok(OpenOutcome::Opened(id))
    }

    fn find_open(&self, path: Option<&str>) -> Option<TabId> {
        path.and_then(|path| self.registry.read().find_by_path(path))
    }

    /// Drop the initial blank tab once a real file sits next to it
    fn close_pristine_placeholder(&self, opened: TabId) {
        let placeholder = {
            let registry = self.registry.read();
            if registry.tabs.len() != 2 {
                return;
            }
            registry
                .tabs
                .iter()
                .find(|t| t.id() != opened && t.is_untitled() && t.is_saved())
                .map(Tab::id)
        };

        if let Some(id) = placeholder {
            tracing::debug!(tab_id = %id, "Replacing blank tab");
            if let Err(e) = self.close_tab(id) {
                tracing::warn!(tab_id = %id, error = %e, "Failed to close blank tab");
            }
        }
    }

    /// Save the current tab, asking for a destination if it has none
    pub async fn save(&self) -> Result<SaveOutcome> {
        let id = self.current_id().ok_or(TabError::NoCurrentTab)?;
        self.save_tab(id).await
    }

    pub async fn save_tab(&self, id: TabId) -> Result<SaveOutcome> {
        let has_entry = self
            .registry
            .read()
            .get(id)
            .map(|t| t.entry().is_some())
            .ok_or_else(|| not_found(id, "save"))?;

        if !has_entry {
            return self.save_as_tab(id).await;
        }

        let pending = {
            let mut registry = self.registry.write();
            let tab = registry.get_mut(id).ok_or_else(|| not_found(id, "save"))?;
            tab.begin_save().inspect_err(|e| {
                tracing::warn!(tab_id = %id, error = %e, "Save rejected");
            })?
        };

        self.write_pending(pending).await
    }

    /// Save the current tab to a newly chosen destination
    pub async fn save_as(&self) -> Result<SaveOutcome> {
        let id = self.current_id().ok_or(TabError::NoCurrentTab)?;
        self.save_as_tab(id).await
    }

    pub async fn save_as_tab(&self, id: TabId) -> Result<SaveOutcome> {
        if self.registry.read().get(id).is_none() {
            return Err(not_found(id, "save"));
        }

        let Some(entry) = self.store.choose_entry(ChooseMode::Save).await else {
            tracing::debug!(tab_id = %id, "Save as cancelled");
            return Ok(SaveOutcome::Cancelled);
        };

        // Resolved before binding so the destination can be checked against
        // the other open tabs
        let path = self.resolve_path(&entry).await;

        let (pending, renamed) = {
            let mut registry = self.registry.write();
            let open_elsewhere = path
                .as_deref()
                .and_then(|path| registry.find_by_path(path))
                .filter(|other| *other != id);
            if let Some(other) = open_elsewhere {
                tracing::warn!(
                    tab_id = %id,
                    other_id = %other,
                    "Save as rejected, destination is open in another tab"
                );
                return Err(TabError::AlreadyOpen(other));
            }

            let tab = registry.get_mut(id).ok_or_else(|| not_found(id, "save"))?;
            if tab.is_saving() {
                tracing::warn!(tab_id = %id, "Save rejected, a write is already running");
                return Err(TabError::SaveInProgress(id));
            }
            let renamed = tab.set_entry(Arc::clone(&entry));
            if let Some(path) = path {
                tab.set_path(&entry, path);
            }
            let pending = tab.begin_save()?;
            (pending, renamed.then(|| tab.snapshot()))
        };

        if let Some(snapshot) = renamed {
            tracing::info!(tab_id = %id, name = %snapshot.name, "Renamed tab");
            self.bus.publish(TabEvent::Renamed(snapshot));
        }

        self.write_pending(pending).await
    }

    async fn write_pending(&self, pending: PendingSave) -> Result<SaveOutcome> {
        let id = pending.tab_id();
        let result = pending.write().await;

        let snapshot = {
            let mut registry = self.registry.write();
            registry.get_mut(id).map(|tab| {
                tab.finish_save(&pending, &result);
                tab.snapshot()
            })
        };

        match result {
            Ok(()) => {
                tracing::info!(tab_id = %id, name = %pending.entry().name(), "Saved tab");
                if let Some(snapshot) = snapshot {
                    self.bus.publish(TabEvent::Saved(snapshot));
                }
                Ok(SaveOutcome::Saved)
            }
            Err(e) => {
                tracing::error!(
                    tab_id = %id,
                    name = %pending.entry().name(),
                    error = %e,
                    "File saving failed"
                );
                if let Some(snapshot) = snapshot {
                    self.bus.publish(TabEvent::SaveFailed {
                        tab: snapshot,
                        error: e.to_string(),
                    });
                }
                Err(e.into())
            }
        }
    }

    /// Close a tab, asking to save it first when it has unsaved changes
    pub async fn close(&self, id: TabId) -> Result<CloseOutcome> {
        let mut flow = CloseFlow::new(id);

        let saved = self
            .registry
            .read()
            .get(id)
            .map(Tab::is_saved)
            .ok_or_else(|| not_found(id, "close"))?;

        if saved {
            return self.finish_close(&mut flow);
        }

        flow.advance(CloseState::ConfirmPending)?;
        let answer = self.confirm_close().await;
        tracing::debug!(tab_id = %id, answer = answer.as_str(), "Close prompt answered");

        if self.registry.read().get(id).is_none() {
            return Err(not_found(id, "close"));
        }

        match answer {
            CloseAnswer::Cancel => {
                flow.advance(CloseState::Idle)?;
                Ok(CloseOutcome::Cancelled)
            }
            CloseAnswer::No => self.finish_close(&mut flow),
            CloseAnswer::Yes => {
                flow.advance(CloseState::SavingBeforeClose)?;
                match self.save_tab(id).await {
                    Ok(SaveOutcome::Saved) if self.is_clean(id) => self.finish_close(&mut flow),
                    Err(e @ TabError::NotFound(_)) => Err(e),
                    Ok(_) | Err(_) => {
                        tracing::info!(tab_id = %id, "Tab kept open, save did not complete");
                        flow.advance(CloseState::Idle)?;
                        Ok(CloseOutcome::Kept)
                    }
                }
            }
        }
    }

    pub async fn close_current(&self) -> Result<CloseOutcome> {
        let id = self.current_id().ok_or(TabError::NoCurrentTab)?;
        self.close(id).await
    }

    fn is_clean(&self, id: TabId) -> bool {
        self.registry.read().get(id).is_some_and(Tab::is_saved)
    }

    async fn confirm_close(&self) -> CloseAnswer {
        let mut prompt = ConfirmPrompt::new();
        prompt.set_text(self.config.close_prompt.as_str());
        prompt.reset_buttons();
        for answer in CloseAnswer::ALL {
            prompt.add_button(answer.as_str(), answer.label());
        }

        let key = self.dialog.show(prompt).await;
        key.parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Treating unknown answer as cancel");
            CloseAnswer::Cancel
        })
    }

    fn finish_close(&self, flow: &mut CloseFlow) -> Result<CloseOutcome> {
        flow.advance(CloseState::Closing)?;
        self.close_tab(flow.tab_id())?;
        flow.advance(CloseState::Closed)?;
        Ok(CloseOutcome::Closed)
    }

    /// The closing procedure: move off the tab if it is current, then remove it
    fn close_tab(&self, id: TabId) -> Result<()> {
        let (is_current, has_others) = {
            let registry = self.registry.read();
            if registry.position(id).is_none() {
                return Err(not_found(id, "close"));
            }
            (registry.current == Some(id), registry.tabs.len() > 1)
        };

        if is_current {
            if has_others {
                self.next_tab();
            } else {
                self.insert_tab(None, None, None);
            }
        }

        let removed = {
            let mut registry = self.registry.write();
            let index = registry
                .position(id)
                .ok_or_else(|| not_found(id, "close"))?;
            registry.tabs.remove(index)
        };

        tracing::info!(tab_id = %id, name = %removed.name(), "Closed tab");

        self.bus.publish(TabEvent::Closed(removed.snapshot()));
        Ok(())
    }

    /// Route the editor's "document changed" signal to the tab owning `session`
    pub fn on_doc_changed(&self, session: &SessionHandle) -> Result<()> {
        let snapshot = {
            let mut registry = self.registry.write();
            let current = registry.current.filter(|id| {
                registry
                    .get(*id)
                    .is_some_and(|t| same_session(t.session(), session))
            });

            let owner = match current {
                Some(id) => id,
                None => match registry.find_by_session(session) {
                    Some(id) => {
                        tracing::debug!(tab_id = %id, "Background tab changed");
                        id
                    }
                    None => {
                        tracing::error!(?session, "Changed session belongs to no open tab");
                        return Err(TabError::UnknownSession);
                    }
                },
            };

            registry
                .get_mut(owner)
                .and_then(|tab| tab.changed().then(|| tab.snapshot()))
        };

        if let Some(snapshot) = snapshot {
            tracing::debug!(tab_id = %snapshot.id, "Tab has unsaved changes");
            self.bus.publish(TabEvent::Changed(snapshot));
        }
        Ok(())
    }

    async fn resolve_path(&self, entry: &EntryHandle) -> Option<String> {
        match self.store.display_path(entry).await {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(name = %entry.name(), error = %e, "Failed to resolve display path");
                None
            }
        }
    }
}

impl Clone for Tabs {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            widget: Arc::clone(&self.widget),
            store: Arc::clone(&self.store),
            dialog: Arc::clone(&self.dialog),
            bus: Arc::clone(&self.bus),
            config: Arc::clone(&self.config),
            untitled_label: Arc::clone(&self.untitled_label),
        }
    }
}

fn not_found(id: TabId, action: &str) -> TabError {
    tracing::error!(tab_id = %id, action, "Can't find tab");
    TabError::NotFound(id)
}
