use super::LocatorKind;
use crate::constants::FILE_SCHEME_PREFIX;

/// Effective base URL of the document being opened.
///
/// An override loses one trailing separator and is otherwise used verbatim.
/// A plain file path becomes a `file://` URI with exactly one leading `/`
/// and forward slashes throughout.
pub fn resolve_base_url(
    locator: &str,
    base_override: Option<&str>,
    reference_prefix: &str,
) -> String {
    if let Some(base) = base_override {
        return strip_trailing_separator(base).to_string();
    }

    match LocatorKind::classify(locator, reference_prefix) {
        LocatorKind::Uri { .. } | LocatorKind::Reference => locator.to_string(),
        LocatorKind::FilePath => {
            let path = locator.replace('\\', "/");
            format!("{FILE_SCHEME_PREFIX}/{}", path.trim_start_matches('/'))
        }
    }
}

fn strip_trailing_separator(base: &str) -> &str {
    base.strip_suffix('/')
        .or_else(|| base.strip_suffix('\\'))
        .unwrap_or(base)
}

/// Display title: the last non-empty path segment, preferring the
/// host-reported source path over the locator
pub fn derive_title(
    source_path: Option<&str>,
    locator: &str,
) -> Option<String> {
    let source = source_path.filter(|p| !p.trim().is_empty()).unwrap_or(locator);
    let end = source.find(['?', '#']).unwrap_or(source.len());

    source[..end]
        .split(['/', '\\'])
        .rev()
        .find(|segment| !segment.trim().is_empty())
        .map(str::to_string)
}
