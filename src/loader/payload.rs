use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;

use crate::DecodeError;
use crate::PayloadFormat;

/// Header fields are separated by `;`, which never appears in base64
const HEADER_SEPARATOR: char = ';';

/// Standard decode of a text payload the host reported as `length` bytes.
///
/// An optional `SIGNATURE;version;length;` header is skipped.
pub fn standard_decode(
    text: &str,
    length: usize,
) -> Result<Bytes, DecodeError> {
    let body = match text.rfind(HEADER_SEPARATOR) {
        Some(i) => &text[i + 1..],
        None => text,
    };

    let decoded = STANDARD.decode(body.trim())?;
    if decoded.len() != length {
        return Err(DecodeError::LengthMismatch {
            expected: length,
            actual: decoded.len(),
        });
    }
    Ok(Bytes::from(decoded))
}

/// Native when `leading` starts with `signature`
pub fn detect_format(
    leading: &[u8],
    signature: &str,
) -> PayloadFormat {
    if !signature.is_empty() && leading.starts_with(signature.as_bytes()) {
        PayloadFormat::Native
    } else {
        PayloadFormat::Import
    }
}
