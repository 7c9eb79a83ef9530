use tokio::sync::mpsc::UnboundedReceiver;

use crate::DocumentEvent;
use crate::Realm;
use crate::Subsystem;
use crate::SubsystemPaths;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

/// Creates every subsystem object the default paths name
pub(crate) fn populate_sdk(realm: &Realm) {
    let paths = SubsystemPaths::default();
    for subsystem in Subsystem::ALL {
        realm.ensure_path(paths.path_for(subsystem));
    }
}

/// Everything emitted so far, without waiting
pub(crate) fn drain_events(rx: &mut UnboundedReceiver<DocumentEvent>) -> Vec<DocumentEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
