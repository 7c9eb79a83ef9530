use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;
use tracing::error;

use crate::Result;

/// Runs `task` once `delay` has elapsed, without blocking the caller.
///
/// The handle is pushed into `handles` when one is supplied so the owner
/// can await every deferred task later.
pub(crate) fn spawn_deferred<Fut>(
    name: &str,
    delay: Duration,
    task: Fut,
    handles: Option<&mut Vec<JoinHandle<()>>>,
) where
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let name = name.to_string();
    let handle = tokio::spawn(async move {
        if !delay.is_zero() {
            sleep(delay).await;
        }
        match task.await {
            Ok(()) => debug!(task = %name, "deferred task finished"),
            Err(e) => error!("deferred task: {name} encountered an error: {:?}", e),
        }
    });

    if let Some(h) = handles {
        h.push(handle);
    }
}
