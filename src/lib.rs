//! Readiness coordination and single-fire document loading for a locally
//! hosted document-editing SDK.
//!
//! Several SDK subsystems finish loading in no particular order. Each one is
//! watched for, patched once it appears, and flagged on a shared
//! [`ReadinessBarrier`]. The [`DocumentLoader`] opens the document exactly
//! once, after the barrier fires. A path that never appears force-completes
//! the barrier instead of stalling the load.

mod config;
mod constants;
mod errors;
mod host;
mod loader;
mod readiness;
mod watch;

pub mod metrics;
mod utils;

pub use config::*;
pub use constants::PATCHED_MARKER_PROPERTY;
pub use errors::*;
pub use host::*;
pub use loader::*;
pub use readiness::*;
pub use watch::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
