//! `kconf resolve`: resolve a schema and print the snapshot.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context, Result};
use kconf_resolve::Resolution;

use super::{collect_overrides, load_schema, report_diagnostics, Format, OverrideSources};
use crate::manifest::KconfManifest;

/// Resolve the schema under the collected overrides and print it.
pub fn run(
    project_dir: &Path,
    manifest: Option<&KconfManifest>,
    schema: Option<&Path>,
    sources: &OverrideSources<'_>,
    format: Format,
    strict: bool,
) -> Result<()> {
    let resolution = resolve(project_dir, manifest, schema, sources)?;

    print!("{}", render(&resolution, format)?);
    if format == Format::Text {
        report_diagnostics(&resolution.diagnostics);
    }

    if strict && resolution.has_warnings() {
        bail!(
            "{} diagnostic(s) reported with --strict",
            resolution.diagnostics.len()
        );
    }
    Ok(())
}

/// Load, collect and resolve, without printing.
pub fn resolve(
    project_dir: &Path,
    manifest: Option<&KconfManifest>,
    schema: Option<&Path>,
    sources: &OverrideSources<'_>,
) -> Result<Resolution> {
    let graph = load_schema(project_dir, manifest, schema)?;
    let overrides = collect_overrides(project_dir, manifest, sources)?;
    kconf_resolve::resolve(&graph, &overrides).context("resolution failed")
}

/// `NAME=value` lines plus a fingerprint comment, or a JSON document with
/// `snapshot`, `diagnostics` and `fingerprint`.
pub fn render(resolution: &Resolution, format: Format) -> Result<String> {
    match format {
        Format::Text => {
            let mut out = String::new();
            for entry in resolution.snapshot.iter() {
                writeln!(out, "{}={}", entry.name, entry.render())?;
            }
            writeln!(out, "# fingerprint: {}", resolution.snapshot.fingerprint())?;
            Ok(out)
        }
        Format::Json => {
            let json = serde_json::json!({
                "snapshot": resolution.snapshot,
                "diagnostics": resolution.diagnostics,
                "fingerprint": resolution.snapshot.fingerprint(),
            });
            Ok(serde_json::to_string_pretty(&json)? + "\n")
        }
    }
}
