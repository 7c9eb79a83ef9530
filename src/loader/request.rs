use bytes::Bytes;

use crate::HostValue;

/// How a locator string should be interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorKind {
    /// A file-system path, with or without a drive letter
    FilePath,
    /// A URI carrying an explicit scheme
    Uri { scheme: String },
    /// A token naming content buffered by the host bridge
    Reference,
}

impl LocatorKind {
    pub fn classify(
        locator: &str,
        reference_prefix: &str,
    ) -> Self {
        if is_reference(locator, reference_prefix) {
            return LocatorKind::Reference;
        }
        match uri_scheme(locator) {
            Some(scheme) => LocatorKind::Uri {
                scheme: scheme.to_ascii_lowercase(),
            },
            None => LocatorKind::FilePath,
        }
    }
}

fn is_reference(
    text: &str,
    reference_prefix: &str,
) -> bool {
    !reference_prefix.is_empty() && text.starts_with(reference_prefix)
}

/// `scheme ":"` per RFC 3986; a single letter is a drive, not a scheme
fn uri_scheme(locator: &str) -> Option<&str> {
    let (scheme, _) = locator.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() || scheme.len() == 1 {
        return None;
    }
    chars
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        .then_some(scheme)
}

/// Content accompanying a load request
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadEncoding {
    /// Already-resolved binary content
    Binary(Bytes),
    /// Token to resolve through the host bridge
    Reference(String),
    /// Encoded text with the byte length the host reported for it
    Encoded { text: String, length: usize },
}

/// One invocation of the document-load entry point
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLoadRequest {
    pub source_locator: String,
    pub payload: PayloadEncoding,
}

impl DocumentLoadRequest {
    pub fn new(
        source_locator: impl Into<String>,
        payload: PayloadEncoding,
    ) -> Self {
        Self {
            source_locator: source_locator.into(),
            payload,
        }
    }

    /// Builds a request from the `(locator, payload, length)` triple the
    /// hosted SDK passes.
    ///
    /// Text starting with `reference_prefix` is a reference token. A missing
    /// payload falls back to the locator when the locator is itself a token.
    pub fn from_host(
        locator: &str,
        payload: HostValue,
        length: usize,
        reference_prefix: &str,
    ) -> Self {
        let payload = match payload {
            HostValue::Bytes(data) => PayloadEncoding::Binary(data),
            HostValue::Text(text) if is_reference(&text, reference_prefix) => PayloadEncoding::Reference(text),
            HostValue::Text(text) => PayloadEncoding::Encoded { text, length },
            _ => match LocatorKind::classify(locator, reference_prefix) {
                LocatorKind::Reference => PayloadEncoding::Reference(locator.to_string()),
                _ => PayloadEncoding::Binary(Bytes::new()),
            },
        };
        Self::new(locator, payload)
    }

    /// Whether the host reported no content at all
    pub fn is_empty(&self) -> bool {
        match &self.payload {
            PayloadEncoding::Binary(data) => data.is_empty(),
            PayloadEncoding::Reference(token) => token.is_empty(),
            PayloadEncoding::Encoded { text, length } => *length == 0 || text.is_empty(),
        }
    }

    pub fn locator_kind(
        &self,
        reference_prefix: &str,
    ) -> LocatorKind {
        LocatorKind::classify(&self.source_locator, reference_prefix)
    }
}
