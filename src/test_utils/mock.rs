use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::ChannelEventSink;
use crate::DocumentEvent;
use crate::DocumentLoader;
use crate::HeadlessEditor;
use crate::HostBridge;
use crate::LoaderConfig;
use crate::MockHostBridge;
use crate::ReadinessBarrier;
use crate::Realm;

/// Bridge mock answering every query with an empty or default value.
///
/// `resolve_reference` and `decode_content` carry no expectation, so a test
/// must set one before the sequence reaches them.
pub(crate) fn mock_bridge() -> MockHostBridge {
    let mut bridge = MockHostBridge::new();
    bridge.expect_user_id().returning(|| "user-1".to_string());
    bridge.expect_source_path().returning(|| None);
    bridge.expect_base_url_override().returning(|| None);
    bridge.expect_plugins().returning(|| Ok(Vec::new()));
    bridge.expect_spellcheck_languages().returning(|| Ok(vec![1033]));
    bridge
}

/// A loader wired to a fresh realm, a headless editor and a channel sink
pub(crate) struct LoaderHarness {
    pub realm: Arc<Realm>,
    pub barrier: ReadinessBarrier,
    pub editor: Arc<HeadlessEditor>,
    pub events: UnboundedReceiver<DocumentEvent>,
    pub loader: Arc<DocumentLoader>,
}

impl LoaderHarness {
    pub(crate) fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self::with_editor(bridge, Arc::new(HeadlessEditor::new()))
    }

    pub(crate) fn with_editor(
        bridge: Arc<dyn HostBridge>,
        editor: Arc<HeadlessEditor>,
    ) -> Self {
        let realm = Arc::new(Realm::new());
        realm.install_editor(editor.clone());
        let barrier = ReadinessBarrier::default();
        let (sink, events) = ChannelEventSink::new();
        let loader = Arc::new(DocumentLoader::new(
            Arc::clone(&realm),
            barrier.clone(),
            bridge,
            Arc::new(sink),
            LoaderConfig::default(),
        ));
        Self {
            realm,
            barrier,
            editor,
            events,
            loader,
        }
    }
}
