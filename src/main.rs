use std::env;
use std::sync::Arc;
use std::time::Duration;

use docgate::metrics;
use docgate::DocumentLoader;
use docgate::Error;
use docgate::GateConfig;
use docgate::HeadlessEditor;
use docgate::HostValue;
use docgate::LocalBridge;
use docgate::MarkerPatch;
use docgate::ReadinessBarrier;
use docgate::ReadinessCoordinator;
use docgate::Realm;
use docgate::Result;
use docgate::Subsystem;
use docgate::SubsystemPaths;
use docgate::TracingEventSink;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Delay between two simulated subsystems finishing their load
const SDK_LOAD_STEP: Duration = Duration::from_millis(30);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_observability();

    let Some(file) = env::args().nth(1) else {
        eprintln!("usage: docgate <file>");
        return Err(Error::Fatal("missing document path".to_string()));
    };
    let settings = GateConfig::new()?.validate()?;

    let realm = Arc::new(Realm::new());
    let barrier = ReadinessBarrier::default();
    let coordinator = ReadinessCoordinator::new(&settings, barrier.clone(), MarkerPatch::all());
    let startup = coordinator.start(realm.root());
    simulate_sdk_load(Arc::clone(&realm), &settings.subsystems);

    let editor = Arc::new(HeadlessEditor::new());
    realm.install_editor(editor.clone());

    let bridge = Arc::new(LocalBridge::new(settings.loader.reference_prefix.clone()));
    let token = bridge.stash_file(&file).await?;

    let loader = DocumentLoader::new(
        Arc::clone(&realm),
        barrier,
        bridge,
        Arc::new(TracingEventSink),
        settings.loader.clone(),
    );
    let outcome = loader.load_from_host(&file, HostValue::from(token.as_str()), 0).await;
    loader.join_deferred().await;
    startup.join().await;

    let state = editor.state();
    info!(?outcome, name = ?state.document_name, "load finished");
    println!("outcome: {outcome:?}");
    if let Some(opened) = &state.opened {
        println!(
            "opened {} ({:?}, {} bytes) as {}",
            opened.base_url,
            opened.format,
            opened.data.len(),
            state.document_name.as_deref().unwrap_or("<untitled>")
        );
    }
    print!("{}", metrics::gather_text());
    Ok(())
}

/// Stands in for the SDK: each subsystem object appears after a delay
fn simulate_sdk_load(
    realm: Arc<Realm>,
    paths: &SubsystemPaths,
) {
    let paths = Subsystem::ALL
        .into_iter()
        .map(|s| paths.path_for(s).to_string())
        .collect::<Vec<_>>();

    tokio::spawn(async move {
        for path in paths {
            tokio::time::sleep(SDK_LOAD_STEP).await;
            info!(%path, "sdk subsystem loaded");
            realm.ensure_path(&path);
        }
    });
}

fn init_observability() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}
