use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Parameters of the document-load sequence
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoaderConfig {
    /// Delay before the display title is pushed to the editor, so its UI
    /// controllers finish initializing first
    #[serde(default = "default_title_update_delay")]
    pub title_update_delay_ms: u64,

    /// Delay before the plugin refresh runs. Spell-check languages are
    /// reported as soon as the document opens.
    #[serde(default = "default_post_open_hooks_delay")]
    pub post_open_hooks_delay_ms: u64,

    /// Leading bytes of a payload already in the editor's native format
    #[serde(default = "default_native_signature")]
    pub native_signature: String,

    /// Prefix of reference tokens naming content buffered by the host bridge
    #[serde(default = "default_reference_prefix")]
    pub reference_prefix: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            title_update_delay_ms: default_title_update_delay(),
            post_open_hooks_delay_ms: default_post_open_hooks_delay(),
            native_signature: default_native_signature(),
            reference_prefix: default_reference_prefix(),
        }
    }
}

impl LoaderConfig {
    pub fn title_update_delay(&self) -> Duration {
        Duration::from_millis(self.title_update_delay_ms)
    }

    pub fn post_open_hooks_delay(&self) -> Duration {
        Duration::from_millis(self.post_open_hooks_delay_ms)
    }

    pub(super) fn validate(&self) -> Result<()> {
        if self.native_signature.is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "native_signature cannot be empty".into(),
            )));
        }

        if self.reference_prefix.trim().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "reference_prefix cannot be empty".into(),
            )));
        }

        Ok(())
    }
}

fn default_title_update_delay() -> u64 {
    100
}
fn default_post_open_hooks_delay() -> u64 {
    50
}
fn default_native_signature() -> String {
    "XLSY".to_string()
}
fn default_reference_prefix() -> String {
    "binary_content://".to_string()
}
