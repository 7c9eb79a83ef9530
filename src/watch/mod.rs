//! Waiting for host objects and properties that appear asynchronously.
//!
//! - [`PropertyWatcher`] waits for the first value of one property, through
//!   a one-shot subscription, or by polling when another party already
//!   installed an accessor on it.
//! - [`PathWatcher`] resolves a dotted chain from a root object, polling
//!   each missing hop until a ceiling, and force-completes the
//!   [`crate::ReadinessBarrier`] instead of hanging when the chain never
//!   resolves.

mod path_watcher;
mod property_watcher;

pub use path_watcher::*;
pub use property_watcher::*;


use tokio::task::JoinHandle;

/// What arming a watcher did
#[derive(Debug)]
pub enum Armed {
    /// The value was already there; the callback ran before returning
    Resolved,
    /// A task is waiting; the callback runs when it resolves
    Pending(JoinHandle<()>),
    /// Nothing to wait on; a diagnostic was emitted
    Abandoned,
}

impl Armed {
    pub fn is_pending(&self) -> bool {
        matches!(self, Armed::Pending(_))
    }

    /// Waits for a pending watch to finish, whichever way it ends
    pub async fn join(self) {
        if let Armed::Pending(handle) = self {
            let _ = handle.await;
        }
    }
}
