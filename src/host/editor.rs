use std::sync::Arc;
use std::time::SystemTime;

use arc_swap::ArcSwapOption;
use bytes::Bytes;
#[cfg(test)]
use mockall::automock;

use super::PluginInfo;
use crate::Result;

/// How the editor should treat a decoded payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// Already in the editor's native serialized format
    Native,
    /// Needs the editor's regular import path
    Import,
}

/// Decoded document handed to [`Editor::open_document`]
#[derive(Debug, Clone)]
pub struct OpenedDocument {
    pub base_url: String,
    pub data: Bytes,
    pub format: PayloadFormat,
}

/// Per-load session details registered with the editor before opening
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub user_id: String,
    pub load_started_at: SystemTime,
}

/// The live editor instance of the hosted SDK
#[cfg_attr(test, automock)]
pub trait Editor: Send + Sync + 'static {
    fn set_session(
        &self,
        session: SessionInfo,
    );

    fn open_document(
        &self,
        document: OpenedDocument,
    ) -> Result<()>;

    fn set_fast_collaborative(
        &self,
        enabled: bool,
    );

    fn set_document_name(
        &self,
        name: &str,
    );

    fn refresh_plugins(
        &self,
        plugins: Vec<PluginInfo>,
    );

    /// Whether the currently opened document is password protected
    fn has_password(&self) -> bool;
}

/// Lock-free slot holding the editor instance once the SDK created it
#[derive(Default)]
pub struct EditorSlot {
    editor: ArcSwapOption<Arc<dyn Editor>>,
}

impl std::fmt::Debug for EditorSlot {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("EditorSlot")
            .field("installed", &self.editor.load().is_some())
            .finish()
    }
}

impl EditorSlot {
    pub fn install(
        &self,
        editor: Arc<dyn Editor>,
    ) {
        self.editor.store(Some(Arc::new(editor)));
    }

    pub fn clear(&self) {
        self.editor.store(None);
    }

    pub fn get(&self) -> Option<Arc<dyn Editor>> {
        self.editor.load_full().map(|editor| Arc::clone(editor.as_ref()))
    }
}
