//! In-process host bridge and editor used by the demo binary and tests.

use std::path::Path;

use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::Mutex;
use parking_lot::RwLock;
use tracing::debug;
use tracing::info;

use super::Editor;
use super::HostBridge;
use super::OpenedDocument;
use super::PluginInfo;
use super::SessionInfo;
use crate::Error;
use crate::Result;

/// Host bridge backed by the local file system and an in-memory buffer store
#[derive(Debug)]
pub struct LocalBridge {
    user_id: String,
    reference_prefix: String,
    buffers: DashMap<String, Bytes>,
    source_path: RwLock<Option<String>>,
    base_url_override: Option<String>,
    plugins: Vec<PluginInfo>,
    spellcheck_languages: Vec<u32>,
}

impl LocalBridge {
    /// `reference_prefix` is prepended to every token handed out by [`Self::stash`]
    pub fn new(reference_prefix: impl Into<String>) -> Self {
        Self {
            user_id: nanoid::nanoid!(),
            reference_prefix: reference_prefix.into(),
            buffers: DashMap::new(),
            source_path: RwLock::new(None),
            base_url_override: None,
            plugins: Vec::new(),
            spellcheck_languages: Vec::new(),
        }
    }

    pub fn with_base_url_override(
        mut self,
        base_url: impl Into<String>,
    ) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    pub fn with_plugins(
        mut self,
        plugins: Vec<PluginInfo>,
    ) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn with_spellcheck_languages(
        mut self,
        languages: Vec<u32>,
    ) -> Self {
        self.spellcheck_languages = languages;
        self
    }

    /// Buffers `data` and returns the reference token naming it
    pub fn stash(
        &self,
        data: Bytes,
    ) -> String {
        let token = format!("{}{}", self.reference_prefix, nanoid::nanoid!());
        debug!(token = %token, len = data.len(), "buffered binary content");
        self.buffers.insert(token.clone(), data);
        token
    }

    /// Reads a file into the buffer store and remembers it as the source path
    pub async fn stash_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<String> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await.map_err(Error::Io)?;
        self.set_source_path(path.to_string_lossy());
        Ok(self.stash(Bytes::from(data)))
    }

    pub fn set_source_path(
        &self,
        path: impl Into<String>,
    ) {
        *self.source_path.write() = Some(path.into());
    }

    pub fn buffered_count(&self) -> usize {
        self.buffers.len()
    }
}

impl HostBridge for LocalBridge {
    fn resolve_reference(
        &self,
        token: &str,
    ) -> Option<Bytes> {
        self.buffers.get(token).map(|data| data.clone())
    }

    fn user_id(&self) -> String {
        self.user_id.clone()
    }

    fn source_path(&self) -> Option<String> {
        self.source_path.read().clone()
    }

    fn base_url_override(&self) -> Option<String> {
        self.base_url_override.clone()
    }

    fn plugins(&self) -> Result<Vec<PluginInfo>> {
        Ok(self.plugins.clone())
    }

    fn spellcheck_languages(&self) -> Result<Vec<u32>> {
        Ok(self.spellcheck_languages.clone())
    }
}

/// Everything a [`HeadlessEditor`] has been told so far
#[derive(Debug, Clone)]
pub struct HeadlessState {
    pub session: Option<SessionInfo>,
    pub opened: Option<OpenedDocument>,
    pub document_name: Option<String>,
    pub fast_collaborative: bool,
    pub plugins: Vec<PluginInfo>,
    pub open_calls: usize,
}

impl Default for HeadlessState {
    fn default() -> Self {
        Self {
            session: None,
            opened: None,
            document_name: None,
            // the SDK starts in fast co-editing mode
            fast_collaborative: true,
            plugins: Vec::new(),
            open_calls: 0,
        }
    }
}

/// Editor without a UI; records what the loader tells it
#[derive(Debug, Default)]
pub struct HeadlessEditor {
    state: Mutex<HeadlessState>,
    password_protected: bool,
}

impl HeadlessEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn password_protected() -> Self {
        Self {
            state: Mutex::new(HeadlessState::default()),
            password_protected: true,
        }
    }

    pub fn state(&self) -> HeadlessState {
        self.state.lock().clone()
    }
}

impl Editor for HeadlessEditor {
    fn set_session(
        &self,
        session: SessionInfo,
    ) {
        debug!(user_id = %session.user_id, "session registered");
        self.state.lock().session = Some(session);
    }

    fn open_document(
        &self,
        document: OpenedDocument,
    ) -> Result<()> {
        info!(
            base_url = %document.base_url,
            format = ?document.format,
            len = document.data.len(),
            "document opened"
        );
        let mut state = self.state.lock();
        state.open_calls += 1;
        state.opened = Some(document);
        Ok(())
    }

    fn set_fast_collaborative(
        &self,
        enabled: bool,
    ) {
        self.state.lock().fast_collaborative = enabled;
    }

    fn set_document_name(
        &self,
        name: &str,
    ) {
        debug!(name, "document renamed");
        self.state.lock().document_name = Some(name.to_string());
    }

    fn refresh_plugins(
        &self,
        plugins: Vec<PluginInfo>,
    ) {
        self.state.lock().plugins = plugins;
    }

    fn has_password(&self) -> bool {
        self.password_protected
    }
}
