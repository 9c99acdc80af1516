//! `kconf variants`: resolve every variant defined in `kconf.toml`.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Result};
use kconf_resolve::{resolve_variants, VariantResult};

use super::{load_schema, variant_overrides, Format};
use crate::manifest::KconfManifest;

pub fn run(
    project_dir: &Path,
    manifest: &KconfManifest,
    schema: Option<&Path>,
    format: Format,
) -> Result<()> {
    let results = resolve_all(project_dir, manifest, schema)?;
    print!("{}", render(&results, format)?);

    let failed = results.iter().filter(|r| r.outcome.is_err()).count();
    if failed > 0 {
        bail!("{failed} of {} variant(s) failed to resolve", results.len());
    }
    Ok(())
}

/// Resolve every manifest variant against one shared graph.
pub fn resolve_all(
    project_dir: &Path,
    manifest: &KconfManifest,
    schema: Option<&Path>,
) -> Result<Vec<VariantResult>> {
    if manifest.variants.is_empty() {
        bail!("kconf.toml defines no [variants]");
    }
    let graph = load_schema(project_dir, Some(manifest), schema)?;
    let variants = manifest
        .variants
        .keys()
        .map(|name| Ok((name.clone(), variant_overrides(project_dir, manifest, name)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(resolve_variants(&graph, &variants))
}

/// One line per variant, or a JSON object keyed by variant name.
pub fn render(results: &[VariantResult], format: Format) -> Result<String> {
    match format {
        Format::Text => {
            let mut out = String::new();
            for result in results {
                match &result.outcome {
                    Ok(resolution) => writeln!(
                        out,
                        "{}: ok {} ({} diagnostic(s))",
                        result.name,
                        resolution.snapshot.fingerprint(),
                        resolution.diagnostics.len()
                    )?,
                    Err(err) => writeln!(out, "{}: failed: {err}", result.name)?,
                }
            }
            Ok(out)
        }
        Format::Json => {
            let mut map = serde_json::Map::new();
            for result in results {
                let value = match &result.outcome {
                    Ok(resolution) => serde_json::json!({
                        "snapshot": resolution.snapshot,
                        "diagnostics": resolution.diagnostics,
                        "fingerprint": resolution.snapshot.fingerprint(),
                    }),
                    Err(err) => serde_json::json!({ "error": err.to_diagnostic() }),
                };
                map.insert(result.name.clone(), value);
            }
            Ok(serde_json::to_string_pretty(&map)? + "\n")
        }
    }
}
