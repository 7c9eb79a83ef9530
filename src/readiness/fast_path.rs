use tracing::debug;
use tracing::info;

use super::ReadinessBarrier;
use crate::metrics;
use crate::HostObject;
use crate::SubsystemPaths;

/// Outcome of the one-shot startup inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastPathVerdict {
    /// The SDK already carries the patched behaviour; nothing to wait for
    Bypass,
    /// Arm the path watchers
    ArmWatchers,
}

/// Detects SDK builds whose extension points were compiled away.
///
/// The signature is a root namespace that is present but lacks the
/// extension point the patches hook into. Such builds inline equivalent
/// behaviour under minified names, so the watched paths would never appear.
#[derive(Debug, Clone)]
pub struct FastPathDetector {
    namespace: String,
    extension_point: String,
}

impl FastPathDetector {
    pub fn new(paths: &SubsystemPaths) -> Self {
        Self {
            namespace: paths.fast_path_namespace.clone(),
            extension_point: paths.fast_path_extension_point.clone(),
        }
    }

    /// Inspects `root` once, synchronously
    pub fn detect(
        &self,
        root: &HostObject,
    ) -> FastPathVerdict {
        match root.child(&self.namespace) {
            Some(namespace)
                if !namespace.has(&self.extension_point)
                    && !namespace.has_accessor(&self.extension_point) =>
            {
                FastPathVerdict::Bypass
            }
            Some(_) => FastPathVerdict::ArmWatchers,
            None => {
                debug!(namespace = %self.namespace, "namespace not loaded yet");
                FastPathVerdict::ArmWatchers
            }
        }
    }

    /// Runs [`Self::detect`] and force-completes `barrier` on a match
    pub fn apply(
        &self,
        root: &HostObject,
        barrier: &ReadinessBarrier,
    ) -> FastPathVerdict {
        let verdict = self.detect(root);
        if verdict == FastPathVerdict::Bypass {
            info!(
                namespace = %self.namespace,
                extension_point = %self.extension_point,
                "extension point absent, SDK build needs no patches"
            );
            metrics::FAST_PATH_BYPASS.inc();
            barrier.force_complete();
        }
        verdict
    }
}
