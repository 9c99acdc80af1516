//! `kconf explain`: show why an option holds its value.

use std::path::Path;

use anyhow::{bail, Context, Result};

use super::{collect_overrides, load_schema, OverrideSources};
use crate::manifest::KconfManifest;

pub fn run(
    project_dir: &Path,
    manifest: Option<&KconfManifest>,
    schema: Option<&Path>,
    sources: &OverrideSources<'_>,
    name: &str,
) -> Result<()> {
    let text = explain(project_dir, manifest, schema, sources, name)?;
    print!("{text}");
    Ok(())
}

/// The rendered explanation of `name`.
pub fn explain(
    project_dir: &Path,
    manifest: Option<&KconfManifest>,
    schema: Option<&Path>,
    sources: &OverrideSources<'_>,
    name: &str,
) -> Result<String> {
    let graph = load_schema(project_dir, manifest, schema)?;
    let overrides = collect_overrides(project_dir, manifest, sources)?;
    let resolution = kconf_resolve::resolve(&graph, &overrides).context("resolution failed")?;
    match kconf_resolve::explain(&graph, &resolution.snapshot, name) {
        Some(explanation) => Ok(explanation.to_string()),
        None => bail!("option '{name}' is not declared in the schema"),
    }
}
