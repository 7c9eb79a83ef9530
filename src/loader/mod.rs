//! Document-load orchestration.
//!
//! [`DocumentLoader`] is armed once per page. Its first invocation waits on
//! the [`crate::ReadinessBarrier`], then resolves the base URL, decodes the
//! payload, opens it in the editor and raises the follow-up
//! [`DocumentEvent`]s. Failures halt the sequence and surface as events.

mod events;
mod orchestrator;
mod payload;
mod request;
mod url;

pub use events::*;
pub use orchestrator::*;
pub use payload::*;
pub use request::*;
pub use url::*;
