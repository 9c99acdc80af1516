//! CLI command implementations.

pub mod check;
pub mod explain;
pub mod resolve;
pub mod variants;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use kconf_resolve::{Diagnostic, Overrides};
use kconf_schema::OptionGraph;

use crate::manifest::KconfManifest;

/// Where the overrides for one resolution come from. Later sources win:
/// the manifest variant, then `--overrides` files, then `--set`.
#[derive(Debug, Default)]
pub struct OverrideSources<'a> {
    pub variant: Option<&'a str>,
    pub files: &'a [PathBuf],
    pub assignments: &'a [String],
}

/// Output format for commands that print results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl Format {
    pub fn parse(format: Option<&str>) -> Result<Self> {
        match format {
            None | Some("text") => Ok(Format::Text),
            Some("json") => Ok(Format::Json),
            Some(other) => bail!("unknown format '{other}' (expected text or json)"),
        }
    }
}

/// Load the schema named on the command line, falling back to the
/// manifest's `[schema] path`.
pub fn load_schema(
    project_dir: &Path,
    manifest: Option<&KconfManifest>,
    schema: Option<&Path>,
) -> Result<OptionGraph> {
    let path = match schema {
        Some(path) => path.to_path_buf(),
        None => match manifest.and_then(|m| m.schema_path(project_dir)) {
            Some(path) => path,
            None => bail!("no schema given: pass --schema or set [schema] path in kconf.toml"),
        },
    };
    let graph = kconf_schema::load::load_file(&path)
        .with_context(|| format!("loading schema {}", path.display()))?;
    tracing::debug!(path = %path.display(), options = graph.len(), "schema loaded");
    Ok(graph)
}

/// Read a TOML or JSON override file.
pub fn load_overrides_file(path: &Path) -> Result<Overrides> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let overrides = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?,
        Some("toml") => {
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?
        }
        _ => bail!(
            "unsupported override file {} (expected .toml or .json)",
            path.display()
        ),
    };
    Ok(overrides)
}

/// Overrides of one manifest variant: its files in order, then its inline
/// table.
pub fn variant_overrides(
    project_dir: &Path,
    manifest: &KconfManifest,
    name: &str,
) -> Result<Overrides> {
    let Some(variant) = manifest.variant(name) else {
        bail!("variant '{name}' is not defined in kconf.toml");
    };
    let mut overrides = Overrides::new();
    for file in &variant.files {
        overrides.merge(&load_overrides_file(&project_dir.join(file))?);
    }
    overrides.merge(&variant.overrides);
    Ok(overrides)
}

/// Layer every override source into one set.
pub fn collect_overrides(
    project_dir: &Path,
    manifest: Option<&KconfManifest>,
    sources: &OverrideSources<'_>,
) -> Result<Overrides> {
    let mut overrides = Overrides::new();
    if let Some(name) = sources.variant {
        let Some(manifest) = manifest else {
            bail!("--variant needs a kconf.toml");
        };
        overrides.merge(&variant_overrides(project_dir, manifest, name)?);
    }
    for file in sources.files {
        overrides.merge(&load_overrides_file(file)?);
    }
    for assignment in sources.assignments {
        let Some((name, value)) = Overrides::parse_assignment(assignment) else {
            bail!("invalid --set '{assignment}' (expected NAME=VALUE)");
        };
        overrides.set(name, value);
    }
    Ok(overrides)
}

/// Print diagnostics to stderr, keeping stdout for results.
pub fn report_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{diagnostic}");
    }
}
