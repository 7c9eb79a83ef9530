use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use super::*;
use crate::constants::PATCHED_MARKER_PROPERTY;
use crate::test_utils::enable_logger;
use crate::test_utils::populate_sdk;
use crate::Error;
use crate::GateConfig;
use crate::HostValue;
use crate::Realm;

fn coordinator(patches: Vec<Arc<dyn Patch>>) -> ReadinessCoordinator {
    ReadinessCoordinator::new(&GateConfig::default(), ReadinessBarrier::default(), patches)
}

fn is_patched(
    realm: &Realm,
    path: &str,
) -> bool {
    realm
        .ensure_path(path)
        .get(PATCHED_MARKER_PROPERTY)
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

#[tokio::test]
async fn test_fast_path_completes_without_arming_watchers() {
    let realm = Realm::new();
    realm.ensure_path("AscCommon");
    let coordinator = coordinator(MarkerPatch::all());

    let startup = coordinator.start(realm.root());

    assert!(matches!(startup, Startup::FastPath));
    assert!(coordinator.barrier().is_complete());
    assert!(coordinator.barrier().completion().is_fired());
}

#[tokio::test]
async fn test_paths_present_at_startup_are_patched_synchronously() {
    let realm = Realm::new();
    populate_sdk(&realm);
    let coordinator = coordinator(MarkerPatch::all());

    let startup = coordinator.start(realm.root());

    match &startup {
        Startup::Armed(watchers) => {
            assert_eq!(watchers.len(), 3);
            assert!(watchers.iter().all(|(_, armed)| !armed.is_pending()));
        }
        Startup::FastPath => panic!("extension point exists, fast path must not trigger"),
    }
    assert!(coordinator.barrier().is_complete());
    assert!(is_patched(&realm, "AscCommon.baseEditorsApi"));
    assert!(is_patched(&realm, "AscFonts.FontPickerByCharacter"));
    assert!(is_patched(&realm, "Asc.spreadsheet_api"));
}

#[tokio::test(start_paused = true)]
async fn test_barrier_completes_after_last_subsystem_arrives() {
    enable_logger();
    let realm = Arc::new(Realm::new());
    let coordinator = coordinator(MarkerPatch::all());
    let startup = coordinator.start(realm.root());
    let mut signal = coordinator.barrier().completion();

    let sdk = Arc::clone(&realm);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(40)).await;
        sdk.ensure_path("Asc.spreadsheet_api");
        tokio::time::sleep(Duration::from_millis(40)).await;
        sdk.ensure_path("AscCommon.baseEditorsApi");
        tokio::time::sleep(Duration::from_millis(40)).await;
        sdk.ensure_path("AscFonts.FontPickerByCharacter");
    });

    let started = Instant::now();
    assert!(signal.wait().await);
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(120));
    assert!(elapsed <= Duration::from_millis(130));
    assert!(is_patched(&realm, "AscFonts.FontPickerByCharacter"));
    startup.join().await;
}

#[tokio::test(start_paused = true)]
async fn test_missing_subsystem_degrades_after_timeout() {
    let realm = Arc::new(Realm::new());
    realm.ensure_path("AscCommon.baseEditorsApi");
    realm.ensure_path("Asc.spreadsheet_api");
    let coordinator = coordinator(MarkerPatch::all());

    let started = Instant::now();
    let startup = coordinator.start(realm.root());
    assert!(!coordinator.barrier().is_complete());
    assert_eq!(coordinator.barrier().pending(), vec![Subsystem::Fonts]);

    startup.join().await;

    assert!(started.elapsed() >= Duration::from_secs(10) - Duration::from_millis(10));
    assert!(coordinator.barrier().is_complete());
    assert!(!is_patched(&realm, "AscFonts.FontPickerByCharacter"));
}

#[tokio::test]
async fn test_failing_patch_still_marks_subsystem_ready() {
    let realm = Realm::new();
    realm.ensure_path("Asc.spreadsheet_api");

    let mut patch = MockPatch::new();
    patch.expect_subsystem().return_const(Subsystem::Sdk);
    patch.expect_apply().times(1).returning(|_| {
        Err(Error::Patch {
            subsystem: Subsystem::Sdk,
            reason: "prototype frozen".to_string(),
        })
    });

    let coordinator = ReadinessCoordinator::new(
        &GateConfig::default(),
        ReadinessBarrier::new(&[Subsystem::Sdk]),
        vec![Arc::new(patch)],
    );
    coordinator.start(realm.root());

    assert!(coordinator.barrier().is_ready(Subsystem::Sdk));
    assert!(coordinator.barrier().is_complete());
}

#[test]
fn test_marker_patch_rejects_non_object_target() {
    let patch = MarkerPatch::new(Subsystem::Fonts);

    let result = patch.apply(&HostValue::from("not an object"));

    assert!(matches!(
        result,
        Err(Error::Patch {
            subsystem: Subsystem::Fonts,
            ..
        })
    ));
}

#[test]
fn test_marker_patch_is_idempotent() {
    let realm = Realm::new();
    let target = HostValue::Object(realm.ensure_path("AscFonts"));
    let patch = MarkerPatch::new(Subsystem::Fonts);

    patch.apply(&target).unwrap();
    patch.apply(&target).unwrap();

    assert_eq!(
        target
            .as_object()
            .unwrap()
            .get(PATCHED_MARKER_PROPERTY)
            .and_then(|v| v.as_bool()),
        Some(true)
    );
}
