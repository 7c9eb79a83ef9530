use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use docgate::ChannelEventSink;
use docgate::DocumentEvent;
use docgate::DocumentLoader;
use docgate::GateConfig;
use docgate::HeadlessEditor;
use docgate::HostValue;
use docgate::LoadOutcome;
use docgate::LoadState;
use docgate::LocalBridge;
use docgate::MarkerPatch;
use docgate::PayloadFormat;
use docgate::ReadinessBarrier;
use docgate::ReadinessCoordinator;
use docgate::Realm;
use docgate::Startup;
use docgate::PATCHED_MARKER_PROPERTY;
use tokio::time::Instant;

use crate::enable_logger;

struct Page {
    realm: Arc<Realm>,
    barrier: ReadinessBarrier,
    editor: Arc<HeadlessEditor>,
    bridge: Arc<LocalBridge>,
    coordinator: ReadinessCoordinator,
}

fn page() -> Page {
    let settings = GateConfig::default();
    let realm = Arc::new(Realm::new());
    let barrier = ReadinessBarrier::default();
    let editor = Arc::new(HeadlessEditor::new());
    realm.install_editor(editor.clone());
    Page {
        coordinator: ReadinessCoordinator::new(&settings, barrier.clone(), MarkerPatch::all()),
        bridge: Arc::new(LocalBridge::new(settings.loader.reference_prefix.clone())),
        realm,
        barrier,
        editor,
    }
}

#[tokio::test(start_paused = true)]
async fn test_staggered_sdk_load_then_single_document_open() {
    enable_logger();
    let page = page();
    let (sink, mut events) = ChannelEventSink::new();

    let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    file.write_all(b"PK\x03\x04workbook").unwrap();
    let path = file.path().to_string_lossy().to_string();
    let token = page.bridge.stash_file(&path).await.unwrap();

    let startup = page.coordinator.start(page.realm.root());
    assert!(matches!(startup, Startup::Armed(_)));

    let loader = Arc::new(DocumentLoader::new(
        Arc::clone(&page.realm),
        page.barrier.clone(),
        page.bridge.clone(),
        Arc::new(sink),
        GateConfig::default().loader,
    ));
    let started = Instant::now();
    let load = tokio::spawn({
        let loader = Arc::clone(&loader);
        let path = path.clone();
        async move { loader.load_from_host(&path, HostValue::from(token.as_str()), 0).await }
    });

    for (delay, dotted) in [
        (25, "AscFonts.FontPickerByCharacter"),
        (25, "Asc.spreadsheet_api"),
        (25, "AscCommon.baseEditorsApi"),
    ] {
        tokio::time::sleep(Duration::from_millis(delay)).await;
        assert_eq!(loader.state(), LoadState::Waiting);
        page.realm.ensure_path(dotted);
    }

    assert_eq!(load.await.unwrap(), LoadOutcome::Dispatched);
    assert!(started.elapsed() < Duration::from_millis(200));
    startup.join().await;
    loader.join_deferred().await;

    for dotted in [
        "AscCommon.baseEditorsApi",
        "AscFonts.FontPickerByCharacter",
        "Asc.spreadsheet_api",
    ] {
        let object = page.realm.ensure_path(dotted);
        assert_eq!(object.get(PATCHED_MARKER_PROPERTY).and_then(|v| v.as_bool()), Some(true));
    }

    let state = page.editor.state();
    let opened = state.opened.unwrap();
    assert!(opened.base_url.starts_with("file:///"));
    assert_eq!(opened.format, PayloadFormat::Import);
    assert_eq!(&opened.data[..], b"PK\x03\x04workbook");

    let title = file.path().file_name().unwrap().to_string_lossy().to_string();
    assert_eq!(state.document_name.as_deref(), Some(title.as_str()));

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    assert_eq!(
        received,
        vec![
            DocumentEvent::SpellCheckLanguages(Vec::new()),
            DocumentEvent::PasswordPrompt { has_password: false },
            DocumentEvent::DocumentNameChanged(title),
        ]
    );

    let again = loader.load_from_host(&path, HostValue::Null, 0).await;
    assert_eq!(again, LoadOutcome::Duplicate);
    assert_eq!(page.editor.state().open_calls, 1);
}

#[tokio::test(start_paused = true)]
async fn test_fast_path_build_loads_without_waiting() {
    let page = page();
    page.realm.ensure_path("AscCommon");
    let token = page.bridge.stash(bytes_of("XLSY;v2;8;"));

    let started = Instant::now();
    let startup = page.coordinator.start(page.realm.root());
    assert!(matches!(startup, Startup::FastPath));

    let (sink, _events) = ChannelEventSink::new();
    let loader = DocumentLoader::new(
        Arc::clone(&page.realm),
        page.barrier.clone(),
        page.bridge.clone(),
        Arc::new(sink),
        GateConfig::default().loader,
    );
    let outcome = loader.load_from_host("/srv/q3.xlsy", HostValue::from(token.as_str()), 0).await;

    assert_eq!(outcome, LoadOutcome::Dispatched);
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(page.editor.state().opened.unwrap().format, PayloadFormat::Native);
}

#[tokio::test(start_paused = true)]
async fn test_missing_subsystem_degrades_and_document_still_opens() {
    let page = page();
    page.realm.ensure_path("AscCommon.baseEditorsApi");
    page.realm.ensure_path("Asc.spreadsheet_api");
    let token = page.bridge.stash(bytes_of("data"));

    let startup = page.coordinator.start(page.realm.root());
    let (sink, _events) = ChannelEventSink::new();
    let loader = DocumentLoader::new(
        Arc::clone(&page.realm),
        page.barrier.clone(),
        page.bridge.clone(),
        Arc::new(sink),
        GateConfig::default().loader,
    );

    let started = Instant::now();
    let outcome = loader.load_from_host("/srv/q3.xlsx", HostValue::from(token.as_str()), 0).await;
    let waited = started.elapsed();

    assert_eq!(outcome, LoadOutcome::Dispatched);
    assert!(waited >= Duration::from_millis(9_990), "waited {waited:?}");
    assert!(waited <= Duration::from_millis(10_010), "waited {waited:?}");
    assert!(page.barrier.is_complete());
    startup.join().await;
}

fn bytes_of(text: &'static str) -> bytes::Bytes {
    bytes::Bytes::from_static(text.as_bytes())
}
