//! `kconf.toml` manifest parsing and project configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kconf_resolve::Overrides;
use serde::{Deserialize, Serialize};

/// The top-level manifest structure for a kconf project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KconfManifest {
    /// Project metadata (required).
    pub project: ProjectConfig,
    /// Where the option schema lives.
    #[serde(default)]
    pub schema: Option<SchemaConfig>,
    /// Named override sets, resolved by `kconf variants` or selected with
    /// `--variant`.
    #[serde(default)]
    pub variants: BTreeMap<String, VariantConfig>,
}

/// Project metadata section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name (required).
    pub name: String,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Schema section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Schema file, relative to the manifest directory.
    pub path: String,
}

/// One named variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantConfig {
    /// Override files applied first, in order, relative to the manifest
    /// directory.
    #[serde(default)]
    pub files: Vec<String>,
    /// Inline overrides, applied after the files.
    #[serde(default)]
    pub overrides: Overrides,
}

impl KconfManifest {
    /// Search upward from `start_dir` for a `kconf.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join("kconf.toml");
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: KconfManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing kconf.toml")
    }

    /// The schema file, resolved against the manifest directory.
    pub fn schema_path(&self, project_dir: &Path) -> Option<PathBuf> {
        self.schema.as_ref().map(|s| project_dir.join(&s.path))
    }

    pub fn variant(&self, name: &str) -> Option<&VariantConfig> {
        self.variants.get(name)
    }
}
