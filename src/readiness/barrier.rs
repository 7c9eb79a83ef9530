//! One-way readiness latch over a fixed set of subsystems.
//!
//! Every subsystem flag starts false and can only become true. The shared
//! completion signal flips exactly once: on the call that turns the last
//! flag true, or on the first [`ReadinessBarrier::force_complete`]. Any
//! number of [`CompletionSignal`]s may observe it.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;
use tracing::trace;

use crate::metrics;

/// Subsystems whose patches gate document loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subsystem {
    BaseApi,
    Fonts,
    Sdk,
}

impl Subsystem {
    pub const ALL: [Subsystem; 3] = [Subsystem::BaseApi, Subsystem::Fonts, Subsystem::Sdk];

    pub fn name(&self) -> &'static str {
        match self {
            Subsystem::BaseApi => "baseApi",
            Subsystem::Fonts => "fonts",
            Subsystem::Sdk => "sdk",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

struct BarrierInner {
    flags: Mutex<BTreeMap<Subsystem, bool>>,
    signal: watch::Sender<bool>,
}

#[derive(Clone)]
pub struct ReadinessBarrier {
    inner: Arc<BarrierInner>,
}

impl fmt::Debug for ReadinessBarrier {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("ReadinessBarrier")
            .field("flags", &*self.inner.flags.lock())
            .field("complete", &self.is_complete())
            .finish()
    }
}

impl Default for ReadinessBarrier {
    fn default() -> Self {
        Self::new(&Subsystem::ALL)
    }
}

impl ReadinessBarrier {
    pub fn new(subsystems: &[Subsystem]) -> Self {
        let flags = subsystems.iter().map(|s| (*s, false)).collect();
        let (signal, _) = watch::channel(false);
        Self {
            inner: Arc::new(BarrierInner {
                flags: Mutex::new(flags),
                signal,
            }),
        }
    }

    /// Sets one subsystem's flag. Idempotent.
    ///
    /// Returns `true` only for the call that completed the barrier.
    pub fn mark_ready(
        &self,
        subsystem: Subsystem,
    ) -> bool {
        let all_ready = {
            let mut flags = self.inner.flags.lock();
            match flags.get_mut(&subsystem) {
                Some(flag) if *flag => {
                    trace!(%subsystem, "already ready");
                    return false;
                }
                Some(flag) => *flag = true,
                None => {
                    debug!(%subsystem, "not tracked by this barrier, ignored");
                    return false;
                }
            }
            debug!(%subsystem, "subsystem ready");
            flags.values().all(|ready| *ready)
        };

        all_ready && self.fire("all_ready")
    }

    /// Sets every flag and fires the signal, whatever the current state.
    ///
    /// Returns `true` if this call fired the signal.
    pub fn force_complete(&self) -> bool {
        self.inner
            .flags
            .lock()
            .values_mut()
            .for_each(|ready| *ready = true);
        self.fire("forced")
    }

    fn fire(
        &self,
        cause: &'static str,
    ) -> bool {
        let fired = self.inner.signal.send_if_modified(|complete| {
            if *complete {
                false
            } else {
                *complete = true;
                true
            }
        });

        if fired {
            info!(cause, "readiness barrier complete");
            metrics::BARRIER_COMPLETIONS.with_label_values(&[cause]).inc();
        }
        fired
    }

    pub fn is_complete(&self) -> bool {
        *self.inner.signal.borrow()
    }

    pub fn is_ready(
        &self,
        subsystem: Subsystem,
    ) -> bool {
        self.inner
            .flags
            .lock()
            .get(&subsystem)
            .copied()
            .unwrap_or(false)
    }

    /// Subsystems still waiting for their patch
    pub fn pending(&self) -> Vec<Subsystem> {
        self.inner
            .flags
            .lock()
            .iter()
            .filter(|(_, ready)| !**ready)
            .map(|(s, _)| *s)
            .collect()
    }

    /// A new listener on the completion signal
    pub fn completion(&self) -> CompletionSignal {
        CompletionSignal {
            rx: self.inner.signal.subscribe(),
        }
    }

    /// Runs `work` once the barrier completes, on the current runtime
    pub fn when_ready<F>(
        &self,
        name: &str,
        work: F,
    ) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let name = name.to_string();
        let mut completion = self.completion();
        tokio::spawn(async move {
            if completion.wait().await {
                trace!(task = %name, "running deferred work after readiness");
                work.await;
            } else {
                debug!(task = %name, "barrier dropped before completion, work skipped");
            }
        })
    }
}

/// Listener on a [`ReadinessBarrier`]'s completion signal
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    rx: watch::Receiver<bool>,
}

impl CompletionSignal {
    pub fn is_fired(&self) -> bool {
        *self.rx.borrow()
    }

    /// Waits until the barrier completes.
    ///
    /// Returns immediately if it already has. Returns `false` only if every
    /// handle to the barrier was dropped while still incomplete.
    pub async fn wait(&mut self) -> bool {
        if *self.rx.borrow_and_update() {
            return true;
        }

        loop {
            if self.rx.changed().await.is_err() {
                return *self.rx.borrow();
            }
            if *self.rx.borrow_and_update() {
                return true;
            }
        }
    }

    /// Whether the signal changed since this listener last looked
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }
}
