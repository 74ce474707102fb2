//! mesh-export.toml configuration and patch edit files

use anyhow::{Context, Result};
use mesh_codec::naming::BUILTIN_RULES;
use mesh_codec::{LiveMeshpoint, NamingRules};
use serde::Deserialize;
use std::path::Path;

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG: &str = "mesh-export.toml";

/// mesh-export.toml structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    #[serde(default)]
    pub producer: ProducerSection,
    #[serde(default)]
    pub materials: MaterialsSection,
    #[serde(default)]
    pub naming: NamingSection,
}

/// External format producer settings
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProducerSection {
    /// Executable name (looked up on PATH) or path
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Extra arguments appended after the standard ones
    #[serde(default)]
    pub args: Vec<String>,

    /// Extension of the file the producer writes
    #[serde(default = "default_output_extension")]
    pub output_extension: String,
}

impl Default for ProducerSection {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            args: Vec::new(),
            output_extension: default_output_extension(),
        }
    }
}

fn default_executable() -> String {
    "meshbuilder".to_string()
}

fn default_output_extension() -> String {
    mesh_codec::MESH_EXTENSION.to_string()
}

/// Material table handling
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaterialsSection {
    /// Sort the material table and drop slots no primitive uses.
    /// Default: true
    #[serde(default = "default_true")]
    pub sort: bool,

    /// Write `<name>.mesh_material` descriptors after export.
    /// Default: true
    #[serde(default = "default_true")]
    pub write_descriptors: bool,
}

impl Default for MaterialsSection {
    fn default() -> Self {
        Self {
            sort: true,
            write_descriptors: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Meshpoint naming grammar
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamingSection {
    /// Keep the builtin categories in front of any custom rules.
    /// Default: true
    #[serde(default = "default_true")]
    pub include_builtin: bool,

    #[serde(default)]
    pub rules: Vec<NamingRuleEntry>,
}

impl Default for NamingSection {
    fn default() -> Self {
        Self {
            include_builtin: true,
            rules: Vec::new(),
        }
    }
}

/// A custom naming category
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamingRuleEntry {
    pub category: String,
    /// Regex body; anchoring and the `-N` suffix are added automatically
    pub pattern: String,
}

impl ExportConfig {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load `path` if given, otherwise `mesh-export.toml` when present,
    /// otherwise defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Compile the configured naming table
    pub fn naming_rules(&self) -> Result<NamingRules> {
        if self.naming.include_builtin && self.naming.rules.is_empty() {
            return Ok(NamingRules::builtin().clone());
        }

        let builtin = BUILTIN_RULES
            .iter()
            .filter(|_| self.naming.include_builtin)
            .map(|(category, body)| (category.to_string(), body.to_string()));
        let custom = self
            .naming
            .rules
            .iter()
            .map(|r| (r.category.clone(), r.pattern.clone()));

        NamingRules::from_pairs(builtin.chain(custom)).context("Invalid naming rule in config")
    }
}

/// Explicit edits for `mesh-export patch --edits`
///
/// ```toml
/// materials = ["hull", "engine_glow"]
///
/// [[meshpoints]]
/// name = "ability.0"
///
/// [[meshpoints]]
/// name = "camera_rig"
/// excluded = true
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditFile {
    #[serde(default)]
    pub meshpoints: Vec<MeshpointEdit>,
    /// Rename the material table in place (same length as the original)
    pub materials: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshpointEdit {
    pub name: String,
    #[serde(default)]
    pub excluded: bool,
}

impl EditFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read edits: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse edits: {}", path.display()))
    }

    /// Live meshpoint list, or `None` when the file lists no meshpoints
    pub fn live_meshpoints(&self) -> Option<Vec<LiveMeshpoint>> {
        if self.meshpoints.is_empty() {
            return None;
        }
        Some(
            self.meshpoints
                .iter()
                .map(|e| LiveMeshpoint {
                    name: e.name.clone(),
                    excluded: e.excluded,
                })
                .collect(),
        )
    }
}
