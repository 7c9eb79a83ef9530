//! Readiness coordination for the patched SDK subsystems.
//!
//! ```text
//! start ──► FastPathDetector ──match──► barrier.force_complete()
//!                 │
//!                 └─no match──► PathWatcher × 3 ──► Patch::apply ──► barrier.mark_ready(s)
//!
//! DocumentLoader::load ──► CompletionSignal::wait ──► load sequence
//! ```

mod barrier;
mod coordinator;
mod fast_path;

pub use barrier::*;
pub use coordinator::*;
pub use fast_path::*;

#[cfg(test)]
mod coordinator_test;
