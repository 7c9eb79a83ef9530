use bytes::Bytes;
#[cfg(test)]
use mockall::automock;

use crate::loader::standard_decode;
use crate::DecodeError;
use crate::Result;

/// Plugin advertised by the host environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    pub guid: String,
    pub name: String,
}

/// Native-side capability surface the document loader calls into
#[cfg_attr(test, automock)]
pub trait HostBridge: Send + Sync + 'static {
    /// Binary content previously buffered under a reference token
    fn resolve_reference(
        &self,
        token: &str,
    ) -> Option<Bytes>;

    /// Stable identifier of the local user for this session
    fn user_id(&self) -> String;

    /// Source path of the document being opened, used for its display title
    fn source_path(&self) -> Option<String>;

    /// Base URL forced by the host environment, if any
    fn base_url_override(&self) -> Option<String>;

    /// Standard content decode for text + length payloads
    fn decode_content(
        &self,
        text: &str,
        length: usize,
    ) -> std::result::Result<Bytes, DecodeError> {
        standard_decode(text, length)
    }

    fn plugins(&self) -> Result<Vec<PluginInfo>>;

    /// Language codes the local spell-checker supports
    fn spellcheck_languages(&self) -> Result<Vec<u32>>;
}
