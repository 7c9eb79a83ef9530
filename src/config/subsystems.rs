use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;
use crate::Subsystem;

/// Where each patched subsystem appears in the host's root namespace
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubsystemPaths {
    #[serde(default = "default_base_api")]
    pub base_api: String,

    #[serde(default = "default_fonts")]
    pub fonts: String,

    #[serde(default = "default_sdk")]
    pub sdk: String,

    /// Namespace whose presence, without `fast_path_extension_point`,
    /// identifies an SDK build that needs no patching
    #[serde(default = "default_fast_path_namespace")]
    pub fast_path_namespace: String,

    #[serde(default = "default_fast_path_extension_point")]
    pub fast_path_extension_point: String,
}

impl Default for SubsystemPaths {
    fn default() -> Self {
        Self {
            base_api: default_base_api(),
            fonts: default_fonts(),
            sdk: default_sdk(),
            fast_path_namespace: default_fast_path_namespace(),
            fast_path_extension_point: default_fast_path_extension_point(),
        }
    }
}

impl SubsystemPaths {
    pub fn path_for(
        &self,
        subsystem: Subsystem,
    ) -> &str {
        match subsystem {
            Subsystem::BaseApi => &self.base_api,
            Subsystem::Fonts => &self.fonts,
            Subsystem::Sdk => &self.sdk,
        }
    }

    pub(super) fn validate(&self) -> Result<()> {
        for subsystem in Subsystem::ALL {
            validate_dotted_path(subsystem.name(), self.path_for(subsystem))?;
        }

        if self.fast_path_namespace.trim().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "fast_path_namespace cannot be empty".into(),
            )));
        }

        if self.fast_path_extension_point.trim().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "fast_path_extension_point cannot be empty".into(),
            )));
        }

        Ok(())
    }
}

fn validate_dotted_path(
    name: &str,
    path: &str,
) -> Result<()> {
    if path.trim().is_empty() {
        return Err(Error::Config(ConfigError::Message(format!(
            "path for {name} cannot be empty"
        ))));
    }

    if path.split('.').any(|segment| segment.trim().is_empty()) {
        return Err(Error::Config(ConfigError::Message(format!(
            "path for {name} contains an empty segment: `{path}`"
        ))));
    }

    Ok(())
}

fn default_base_api() -> String {
    "AscCommon.baseEditorsApi".to_string()
}
fn default_fonts() -> String {
    "AscFonts.FontPickerByCharacter".to_string()
}
fn default_sdk() -> String {
    "Asc.spreadsheet_api".to_string()
}
fn default_fast_path_namespace() -> String {
    "AscCommon".to_string()
}
fn default_fast_path_extension_point() -> String {
    "baseEditorsApi".to_string()
}
