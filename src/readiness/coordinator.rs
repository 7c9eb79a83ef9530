//! Startup wiring: fast-path detection, then one path watcher per subsystem.

use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use tracing::debug;
use tracing::error;
use tracing::info;

use super::FastPathDetector;
use super::FastPathVerdict;
use super::ReadinessBarrier;
use super::Subsystem;
use crate::constants::PATCHED_MARKER_PROPERTY;
use crate::Armed;
use crate::Error;
use crate::GateConfig;
use crate::HostObject;
use crate::HostValue;
use crate::PathWatcher;
use crate::Result;
use crate::SubsystemPaths;

/// Patch applied to a subsystem once its path resolves
#[cfg_attr(test, automock)]
pub trait Patch: Send + Sync + 'static {
    fn subsystem(&self) -> Subsystem;

    fn apply(
        &self,
        target: &HostValue,
    ) -> Result<()>;
}

/// Stamps a marker property on the resolved object.
///
/// Stands in for a subsystem whose behaviour needs no change beyond being
/// known to have loaded.
#[derive(Debug, Clone, Copy)]
pub struct MarkerPatch {
    subsystem: Subsystem,
}

impl MarkerPatch {
    pub fn new(subsystem: Subsystem) -> Self {
        Self { subsystem }
    }

    /// One marker patch per tracked subsystem
    pub fn all() -> Vec<Arc<dyn Patch>> {
        Subsystem::ALL
            .into_iter()
            .map(|s| Arc::new(MarkerPatch::new(s)) as Arc<dyn Patch>)
            .collect()
    }
}

impl Patch for MarkerPatch {
    fn subsystem(&self) -> Subsystem {
        self.subsystem
    }

    fn apply(
        &self,
        target: &HostValue,
    ) -> Result<()> {
        let object = target.as_object().ok_or_else(|| Error::Patch {
            subsystem: self.subsystem,
            reason: format!("expected an object, found {target:?}"),
        })?;

        if object.has(PATCHED_MARKER_PROPERTY) {
            debug!(subsystem = %self.subsystem, "already patched");
            return Ok(());
        }
        object.set(PATCHED_MARKER_PROPERTY, true);
        Ok(())
    }
}

/// How startup went
#[derive(Debug)]
pub enum Startup {
    /// The SDK build needs no patches; the barrier is already complete
    FastPath,
    /// One entry per armed subsystem watcher
    Armed(Vec<(Subsystem, Armed)>),
}

impl Startup {
    /// Waits for every armed watcher to resolve or give up
    pub async fn join(self) {
        if let Startup::Armed(watchers) = self {
            for (_, armed) in watchers {
                armed.join().await;
            }
        }
    }
}

/// Arms the readiness machinery for one page load
pub struct ReadinessCoordinator {
    barrier: ReadinessBarrier,
    paths: SubsystemPaths,
    detector: FastPathDetector,
    watcher: PathWatcher,
    patches: Vec<Arc<dyn Patch>>,
}

impl std::fmt::Debug for ReadinessCoordinator {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ReadinessCoordinator")
            .field("barrier", &self.barrier)
            .field("paths", &self.paths)
            .field("patches", &self.patches.len())
            .finish()
    }
}

impl ReadinessCoordinator {
    pub fn new(
        config: &GateConfig,
        barrier: ReadinessBarrier,
        patches: Vec<Arc<dyn Patch>>,
    ) -> Self {
        Self {
            detector: FastPathDetector::new(&config.subsystems),
            watcher: PathWatcher::from_config(&config.watch, barrier.clone()),
            paths: config.subsystems.clone(),
            barrier,
            patches,
        }
    }

    pub fn barrier(&self) -> &ReadinessBarrier {
        &self.barrier
    }

    /// Runs the fast-path check, then arms one watcher per patch.
    ///
    /// Must run before the SDK finishes loading for the watchers to be
    /// useful; paths already present are patched before this returns.
    pub fn start(
        &self,
        root: &Arc<HostObject>,
    ) -> Startup {
        if self.detector.apply(root, &self.barrier) == FastPathVerdict::Bypass {
            return Startup::FastPath;
        }

        let watchers = self
            .patches
            .iter()
            .map(|patch| {
                let subsystem = patch.subsystem();
                let path = self.paths.path_for(subsystem);
                let patch = Arc::clone(patch);
                let barrier = self.barrier.clone();
                let armed = self.watcher.watch(root, path, move |target| {
                    apply_and_mark(patch.as_ref(), &target, &barrier)
                });
                (subsystem, armed)
            })
            .collect::<Vec<_>>();

        info!(
            armed = watchers.iter().filter(|(_, a)| a.is_pending()).count(),
            pending = ?self.barrier.pending(),
            "readiness watchers armed"
        );
        Startup::Armed(watchers)
    }
}

/// A failed patch still marks its subsystem ready: waiting forever on it
/// would block every document load.
fn apply_and_mark(
    patch: &dyn Patch,
    target: &HostValue,
    barrier: &ReadinessBarrier,
) {
    let subsystem = patch.subsystem();
    match patch.apply(target) {
        Ok(()) => debug!(%subsystem, "patch applied"),
        Err(e) => error!(%subsystem, error = %e, "patch failed, continuing unpatched"),
    }
    barrier.mark_ready(subsystem);
}
