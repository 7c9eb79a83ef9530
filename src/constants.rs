// -
// Host object model

/// Property stamped on a target object once a [`crate::MarkerPatch`] ran
pub const PATCHED_MARKER_PROPERTY: &str = "__docgate_patched__";

/// Separator of dotted watch paths
pub(crate) const PATH_SEPARATOR: char = '.';

// -
// Locators

pub(crate) const FILE_SCHEME_PREFIX: &str = "file://";

// -
// Task names

pub(crate) const TITLE_UPDATE_TASK: &str = "document_title_update";
pub(crate) const POST_OPEN_HOOKS_TASK: &str = "post_open_hooks";
