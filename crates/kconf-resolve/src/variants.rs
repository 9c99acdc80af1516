//! Resolving several override sets against one shared graph.

use std::thread;

use kconf_schema::OptionGraph;
use tracing::debug;

use crate::error::Result;
use crate::overrides::Overrides;
use crate::resolve::{resolve, Resolution};

/// Outcome of one named variant.
#[derive(Debug, Clone)]
pub struct VariantResult {
    pub name: String,
    pub outcome: Result<Resolution>,
}

/// Resolve each `(name, overrides)` pair on its own scoped thread. The
/// graph is only read, so every run borrows it. Results come back in input
/// order.
pub fn resolve_variants(graph: &OptionGraph, variants: &[(String, Overrides)]) -> Vec<VariantResult> {
    debug!(count = variants.len(), "resolving variants");
    thread::scope(|scope| {
        let handles: Vec<_> = variants
            .iter()
            .map(|(name, overrides)| {
                let handle = scope.spawn(move || resolve(graph, overrides));
                (name, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(name, handle)| {
                let outcome = match handle.join() {
                    Ok(outcome) => outcome,
                    Err(panic) => std::panic::resume_unwind(panic),
                };
                VariantResult {
                    name: name.clone(),
                    outcome,
                }
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use kconf_schema::{Expr, OptionGraphBuilder};

    #[test]
    fn variants_resolve_independently_in_order() {
        let mut b = OptionGraphBuilder::new();
        b.bool("NET").default(Expr::y());
        b.tristate("E1000").depends(Expr::sym("NET")).default(Expr::m());
        let graph = b.build().unwrap();

        let variants = vec![
            ("default".to_string(), Overrides::new()),
            ("no-net".to_string(), Overrides::new().with("NET", "n")),
            ("builtin".to_string(), Overrides::new().with("E1000", "y")),
        ];
        let results = resolve_variants(&graph, &variants);

        let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["default", "no-net", "builtin"]);
        let e1000: Vec<_> = results
            .iter()
            .map(|r| r.outcome.as_ref().unwrap().snapshot.render("E1000").unwrap())
            .collect();
        assert_eq!(e1000, vec!["m", "n", "y"]);
    }

    #[test]
    fn fatal_errors_are_reported_per_variant() {
        let mut b = OptionGraphBuilder::new();
        b.bool("C").default_if(Expr::y(), Expr::sym("D"));
        b.bool("D").default_if(Expr::y(), Expr::sym("C"));
        let cyclic = b.build().unwrap();

        let variants = [("a".to_string(), Overrides::new()), ("b".to_string(), Overrides::new())];
        let results = resolve_variants(&cyclic, &variants);
        assert_eq!(results.len(), 2);
        assert!(results
            .iter()
            .all(|r| matches!(r.outcome, Err(ResolveError::CyclicDependency { .. }))));
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let graph = OptionGraphBuilder::new().build().unwrap();
        assert!(resolve_variants(&graph, &[]).is_empty());
    }
}
