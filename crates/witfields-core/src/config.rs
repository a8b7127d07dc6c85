use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Location of the engine config relative to a project root.
pub const CONFIG_RELATIVE_PATH: &str = ".witfields/config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub names: NamesConfig,
    #[serde(default)]
    pub allowed_values: AllowedValuesConfig,
    #[serde(default)]
    pub copy: CopyConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamesConfig {
    /// Match field names exactly instead of ignoring case.
    #[serde(default)]
    pub case_sensitive: bool,
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedValuesConfig {
    #[serde(default = "default_true")]
    pub sort: bool,
}

impl Default for AllowedValuesConfig {
    fn default() -> Self {
        Self {
            sort: default_true(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyConfig {
    /// Reference names skipped by `copy_to` in addition to the built-in
    /// non-copyable fields.
    #[serde(default)]
    pub excluded_fields: Vec<String>,
}

impl CopyConfig {
    #[must_use]
    pub fn is_excluded(&self, reference_name: &str) -> bool {
        self.excluded_fields
            .iter()
            .any(|f| f.eq_ignore_ascii_case(reference_name))
    }
}

/// Loads `.witfields/config.toml` under `project_root`; a missing file
/// yields defaults.
pub fn load_project_config(project_root: &Path) -> Result<EngineConfig> {
    let path = project_root.join(CONFIG_RELATIVE_PATH);
    if !path.exists() {
        return Ok(EngineConfig::default());
    }
    load_config_file(&path)
}

/// Loads an explicit config file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<EngineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<EngineConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

const fn default_true() -> bool {
    true
}
