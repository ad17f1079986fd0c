//! In-memory collaborators for tests

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::AsyncWrite;
use tokio::sync::Notify;

use crate::collab::{
    same_entry, same_session, ChooseMode, ConfirmPrompt, Dialog, EditorWidget, EntryHandle,
    EntryWriter, EventBus, FileEntry, FileStore, Session, SessionHandle,
};
use crate::config::TabsConfig;
use crate::event::TabEvent;
use crate::manager::Tabs;
use crate::tab::TabId;

#[derive(Debug)]
pub struct FakeSession {
    content: Mutex<String>,
}

impl FakeSession {
    pub fn new(content: &str) -> Self {
        Self {
            content: Mutex::new(content.to_string()),
        }
    }

    pub fn set_content(&self, content: &str) {
        *self.content.lock() = content.to_string();
    }
}

impl Session for FakeSession {
    fn current_content(&self) -> String {
        self.content.lock().clone()
    }
}

#[derive(Default)]
pub struct FakeWidget {
    shown: Mutex<Vec<SessionHandle>>,
}

impl FakeWidget {
    pub fn is_showing(&self, session: &SessionHandle) -> bool {
        self.shown
            .lock()
            .last()
            .is_some_and(|shown| same_session(shown, session))
    }
}

impl EditorWidget for FakeWidget {
    fn new_session(&self, initial_content: Option<String>) -> SessionHandle {
        Arc::new(FakeSession::new(initial_content.as_deref().unwrap_or("")))
    }

    fn set_session(&self, session: SessionHandle) {
        self.shown.lock().push(session);
    }
}

#[derive(Debug)]
pub struct MemoryEntry {
    name: String,
    content: Arc<Mutex<String>>,
    fail_writes: bool,
    fail_reads: bool,
    /// Writers are only handed out once this is notified
    gate: Option<Arc<Notify>>,
    writes: Mutex<usize>,
}

impl MemoryEntry {
    pub fn new(name: &str, content: &str) -> Arc<Self> {
        Arc::new(Self::build(name, content, false, false))
    }

    pub fn read_only(name: &str, content: &str) -> Arc<Self> {
        Arc::new(Self::build(name, content, true, false))
    }

    pub fn unreadable(name: &str) -> Arc<Self> {
        Arc::new(Self::build(name, "", false, true))
    }

    pub fn gated(name: &str, content: &str, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            gate: Some(gate),
            ..Self::build(name, content, false, false)
        })
    }

    fn build(name: &str, content: &str, fail_writes: bool, fail_reads: bool) -> Self {
        Self {
            name: name.to_string(),
            content: Arc::new(Mutex::new(content.to_string())),
            fail_writes,
            fail_reads,
            gate: None,
            writes: Mutex::new(0),
        }
    }

    pub fn content(&self) -> String {
        self.content.lock().clone()
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock()
    }
}

#[async_trait]
impl FileEntry for MemoryEntry {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn read_all(&self) -> io::Result<String> {
        if self.fail_reads {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file vanished"));
        }
        Ok(self.content())
    }

    async fn create_writer(&self) -> io::Result<EntryWriter> {
        if self.fail_writes {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "read-only file",
            ));
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        *self.writes.lock() += 1;
        Ok(Box::new(MemoryWriter {
            buf: Vec::new(),
            target: Arc::clone(&self.content),
        }))
    }
}

struct MemoryWriter {
    buf: Vec<u8>,
    target: Arc<Mutex<String>>,
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.buf.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        *self.target.lock() = String::from_utf8_lossy(&self.buf).into_owned();
        Poll::Ready(Ok(()))
    }
}

/// Entry whose read lets another open of the same file finish first.
#[derive(Debug)]
pub struct RacingEntry {
    name: String,
    content: String,
    rival: Mutex<Option<(TabsHandle, EntryHandle)>>,
}

pub struct TabsHandle(pub Tabs);

impl std::fmt::Debug for TabsHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Tabs")
    }
}

impl RacingEntry {
    pub fn new(name: &str, content: &str, tabs: Tabs, rival: EntryHandle) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            content: content.to_string(),
            rival: Mutex::new(Some((TabsHandle(tabs), rival))),
        })
    }
}

#[async_trait]
impl FileEntry for RacingEntry {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn read_all(&self) -> io::Result<String> {
        let rival = self.rival.lock().take();
        if let Some((TabsHandle(tabs), entry)) = rival {
            tabs.open_file_entry(Some(entry))
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        }
        Ok(self.content.clone())
    }

    async fn create_writer(&self) -> io::Result<EntryWriter> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "racing entry"))
    }
}

/// File store that hands out queued choices and resolves registered paths.
#[derive(Default)]
pub struct MemoryStore {
    choices: Mutex<VecDeque<Option<EntryHandle>>>,
    paths: Mutex<Vec<(EntryHandle, String)>>,
    prompts: Mutex<Vec<ChooseMode>>,
}

impl MemoryStore {
    pub fn register(&self, entry: EntryHandle, path: &str) {
        self.paths.lock().push((entry, path.to_string()));
    }

    /// Queue the answer for the next choose dialog
    pub fn will_choose(&self, entry: Option<EntryHandle>) {
        self.choices.lock().push_back(entry);
    }

    pub fn prompts(&self) -> Vec<ChooseMode> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn choose_entry(&self, mode: ChooseMode) -> Option<EntryHandle> {
        self.prompts.lock().push(mode);
        self.choices.lock().pop_front().flatten()
    }

    async fn display_path(&self, entry: &EntryHandle) -> io::Result<String> {
        self.paths
            .lock()
            .iter()
            .find(|(known, _)| same_entry(known, entry))
            .map(|(_, path)| path.clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "unknown entry"))
    }
}

/// Dialog answering from a script; answers "cancel" once the script runs out.
#[derive(Default)]
pub struct ScriptedDialog {
    answers: Mutex<VecDeque<String>>,
    shown: Mutex<Vec<ConfirmPrompt>>,
    /// Tab to close through the controller while the next prompt is up
    close_while_shown: Mutex<Option<(Tabs, TabId)>>,
}

impl ScriptedDialog {
    pub fn will_answer(&self, key: &str) {
        self.answers.lock().push_back(key.to_string());
    }

    pub fn close_while_shown(&self, tabs: Tabs, id: TabId) {
        *self.close_while_shown.lock() = Some((tabs, id));
    }

    pub fn times_shown(&self) -> usize {
        self.shown.lock().len()
    }

    pub fn last_prompt(&self) -> Option<ConfirmPrompt> {
        self.shown.lock().last().cloned()
    }
}

#[async_trait]
impl Dialog for ScriptedDialog {
    async fn show(&self, prompt: ConfirmPrompt) -> String {
        self.shown.lock().push(prompt);
        let pending = self.close_while_shown.lock().take();
        if let Some((tabs, id)) = pending {
            let _ = tabs.close(id).await;
        }
        self.answers
            .lock()
            .pop_front()
            .unwrap_or_else(|| "cancel".to_string())
    }
}

#[derive(Default)]
pub struct RecordingBus {
    events: Mutex<Vec<TabEvent>>,
}

impl RecordingBus {
    pub fn events(&self) -> Vec<TabEvent> {
        self.events.lock().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(TabEvent::name).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventBus for RecordingBus {
    fn publish(&self, event: TabEvent) {
        self.events.lock().push(event);
    }
}

pub struct Harness {
    pub tabs: Tabs,
    pub widget: Arc<FakeWidget>,
    pub store: Arc<MemoryStore>,
    pub dialog: Arc<ScriptedDialog>,
    pub bus: Arc<RecordingBus>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(TabsConfig::default())
    }

    pub fn with_config(config: TabsConfig) -> Self {
        let widget = Arc::new(FakeWidget::default());
        let store = Arc::new(MemoryStore::default());
        let dialog = Arc::new(ScriptedDialog::default());
        let bus = Arc::new(RecordingBus::default());
        let tabs = Tabs::new(
            widget.clone(),
            store.clone(),
            dialog.clone(),
            bus.clone(),
            config,
        );

        Self {
            tabs,
            widget,
            store,
            dialog,
            bus,
        }
    }

    /// A file the store knows the display path of
    pub fn file(&self, name: &str, path: &str, content: &str) -> Arc<MemoryEntry> {
        let entry = MemoryEntry::new(name, content);
        self.store.register(entry.clone(), path);
        entry
    }
}
