//! Tab data structure
//!
//! A tab is one open document: an editing session, an optional file it is
//! bound to, the display path of that file and whether the content has been
//! saved since the last write.

use std::io;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::collab::{same_entry, EntryHandle, SessionHandle};
use crate::error::TabError;
use crate::event::TabSnapshot;
use crate::Result;

/// Positive tab identifier, unique among the open tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(u32);

impl TabId {
    pub(crate) fn new(id: u32) -> Self {
        debug_assert!(id > 0, "tab ids start at 1");
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cloning a tab copies its handles; the registry keeps the live one.
#[derive(Debug, Clone)]
pub struct Tab {
    id: TabId,
    session: SessionHandle,
    entry: Option<EntryHandle>,
    /// Cached display path of `entry`, `None` until resolved
    path: Option<String>,
    saved: bool,
    saving: bool,
    /// Change notifications received so far
    edits: u64,
    untitled_label: Arc<str>,
}

impl Tab {
    pub(crate) fn new(
        id: TabId,
        session: SessionHandle,
        entry: Option<EntryHandle>,
        untitled_label: Arc<str>,
    ) -> Self {
        Self {
            id,
            session,
            entry,
            path: None,
            saved: true,
            saving: false,
            edits: 0,
            untitled_label,
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn entry(&self) -> Option<&EntryHandle> {
        self.entry.as_ref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn is_untitled(&self) -> bool {
        self.entry.is_none()
    }

    pub fn name(&self) -> String {
        match &self.entry {
            Some(entry) => entry.name(),
            None => format!("{} {}", self.untitled_label, self.id),
        }
    }

    /// Bind the tab to another file.
    ///
    /// Clears the cached path until the new one is resolved. Returns `true`
    /// when the display name changed.
    pub fn set_entry(&mut self, entry: EntryHandle) -> bool {
        let renamed = self.name() != entry.name();
        self.entry = Some(entry);
        self.path = None;
        renamed
    }

    /// Store a resolved display path, unless the tab was rebound meanwhile.
    pub(crate) fn set_path(&mut self, resolved_for: &EntryHandle, path: String) -> bool {
        match &self.entry {
            Some(entry) if same_entry(entry, resolved_for) => {
                self.path = Some(path);
                true
            }
            _ => false,
        }
    }

    /// Mark the content as diverged from the last saved state.
    ///
    /// Returns `true` only on the clean -> dirty transition.
    pub fn changed(&mut self) -> bool {
        self.edits += 1;
        if self.saved {
            self.saved = false;
            true
        } else {
            false
        }
    }

    /// Snapshot the content for writing and mark a save as in flight.
    pub fn begin_save(&mut self) -> Result<PendingSave> {
        let entry = self.entry.clone().ok_or(TabError::NoEntry(self.id))?;
        if self.saving {
            return Err(TabError::SaveInProgress(self.id));
        }

        self.saving = true;
        Ok(PendingSave {
            tab_id: self.id,
            entry,
            content: self.session.current_content(),
            edits: self.edits,
        })
    }

    /// Record the outcome of a write started with [`Tab::begin_save`].
    ///
    /// Returns whether the tab is clean afterwards. A failed write leaves
    /// the dirty flag alone, and so do edits made while the write ran.
    pub fn finish_save(&mut self, pending: &PendingSave, result: &io::Result<()>) -> bool {
        self.saving = false;
        if result.is_ok() && pending.edits == self.edits {
            self.saved = true;
        }
        self.saved
    }

    pub fn snapshot(&self) -> TabSnapshot {
        TabSnapshot {
            id: self.id,
            name: self.name(),
            path: self.path.clone(),
            saved: self.saved,
        }
    }
}

/// Content captured for one write, detached from the registry lock.
#[derive(Debug)]
pub struct PendingSave {
    tab_id: TabId,
    entry: EntryHandle,
    content: String,
    edits: u64,
}

impl PendingSave {
    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    pub fn entry(&self) -> &EntryHandle {
        &self.entry
    }

    /// Write the captured content to the entry as plain text.
    pub async fn write(&self) -> io::Result<()> {
        let mut writer = self.entry.create_writer().await?;
        writer.write_all(self.content.as_bytes()).await?;
        writer.shutdown().await?;
        Ok(())
    }
}
