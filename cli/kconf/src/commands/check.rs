//! `kconf check`: validate the schema and resolve it with no overrides.

use std::path::Path;

use anyhow::{bail, Result};
use kconf_resolve::{resolve, Overrides};

use super::{load_schema, report_diagnostics};
use crate::manifest::KconfManifest;

pub fn run(project_dir: &Path, manifest: Option<&KconfManifest>, schema: Option<&Path>) -> Result<()> {
    let graph = load_schema(project_dir, manifest, schema)?;
    println!(
        "schema ok: {} options, {} choice groups",
        graph.len(),
        graph.group_count()
    );

    match resolve(&graph, &Overrides::new()) {
        Ok(resolution) => {
            report_diagnostics(&resolution.diagnostics);
            println!(
                "default resolution: {} passes, {} diagnostic(s)",
                resolution.passes,
                resolution.diagnostics.len()
            );
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", err.to_diagnostic());
            bail!("default resolution failed");
        }
    }
}
