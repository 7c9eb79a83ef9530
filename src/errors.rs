//! Error hierarchy for the readiness and document-load layer
//!
//! Errors are grouped by the component that raises them. Failures inside the
//! document-load sequence never escape [`crate::DocumentLoader::load`]; they
//! are converted into host events there and surface here only so the
//! sequence itself can be written with `?`.

use std::time::Duration;

use config::ConfigError;

use crate::Subsystem;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A watched property or path never resolved
    #[error(transparent)]
    Watch(#[from] WatchError),

    /// Document-load sequence failures
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A subsystem patch could not be applied to its resolved target
    #[error("Patch for {subsystem} failed: {reason}")]
    Patch {
        subsystem: Subsystem,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Unrecoverable failures
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The object the watch was armed against does not exist
    #[error("Watch target for `{path}` is missing")]
    MissingTarget { path: String },

    /// The path did not resolve before the deadline
    #[error("Path `{path}` unresolved at `{segment}` after {elapsed:?}")]
    Timeout {
        path: String,
        segment: String,
        elapsed: Duration,
    },

    /// An intermediate hop resolved to null or to a non-object value
    #[error("Path `{path}` hit a null intermediate at `{segment}`")]
    NullIntermediate { path: String, segment: String },
}

impl WatchError {
    /// Segment at which resolution stopped, if any
    pub fn segment(&self) -> Option<&str> {
        match self {
            WatchError::MissingTarget { .. } => None,
            WatchError::Timeout { segment, .. } | WatchError::NullIntermediate { segment, .. } => {
                Some(segment)
            }
        }
    }

    pub fn path(&self) -> &str {
        match self {
            WatchError::MissingTarget { path }
            | WatchError::Timeout { path, .. }
            | WatchError::NullIntermediate { path, .. } => path,
        }
    }

    /// Metric label for the failure kind
    pub fn reason(&self) -> &'static str {
        match self {
            WatchError::MissingTarget { .. } => "missing_target",
            WatchError::Timeout { .. } => "timeout",
            WatchError::NullIntermediate { .. } => "null_intermediate",
        }
    }
}

/// Classification attached to a document-open error event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenErrorKind {
    /// The payload could not be converted into something the editor opens
    Conversion,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// No live editor instance; the host is not in a loadable state
    #[error("No editor instance available")]
    MissingEditor,

    #[error("Document payload is empty")]
    EmptyPayload,

    /// The host bridge returned no data for a reference token
    #[error("Reference token `{token}` did not resolve to binary data")]
    ReferenceUnresolved { token: String },

    #[error("Payload decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// The editor rejected the decoded document
    #[error("Editor failed to open document: {0}")]
    Open(String),
}

impl LoadError {
    /// Event classification for this failure.
    ///
    /// `None` means no event is emitted: there is no editor to show it.
    pub fn classification(&self) -> Option<OpenErrorKind> {
        match self {
            LoadError::MissingEditor => None,
            LoadError::EmptyPayload
            | LoadError::ReferenceUnresolved { .. }
            | LoadError::Decode(_)
            | LoadError::Open(_) => Some(OpenErrorKind::Conversion),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    #[error("Decoded {actual} bytes, host reported {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}
