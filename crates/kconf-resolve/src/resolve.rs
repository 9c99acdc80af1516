//! Resolution entry point: overrides in, snapshot and diagnostics out.

use kconf_schema::{OptionGraph, Tristate, Value};
use serde::Serialize;
use tracing::{debug, warn};

use crate::choice;
use crate::cycle::cyclic_options;
use crate::defaults::ceiling;
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticLog};
use crate::env::Environment;
use crate::error::{ResolveError, Result};
use crate::overrides::{Overrides, Requests};
use crate::propagate::Propagator;
use crate::snapshot::Snapshot;

/// Successful outcome of one resolution run.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub snapshot: Snapshot,
    pub diagnostics: Vec<Diagnostic>,
    /// Propagation passes spent across all enforcement rounds.
    #[serde(skip)]
    pub passes: usize,
}

impl Resolution {
    pub fn has_warnings(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Resolve `graph` under `overrides`.
///
/// Fails only on a dependency cycle or on a reachable mandatory choice
/// group with no available member; every other problem is reported as a
/// diagnostic next to a best-effort snapshot.
pub fn resolve(graph: &OptionGraph, overrides: &Overrides) -> Result<Resolution> {
    resolve_inner(graph, overrides).inspect_err(|err| warn!(%err, "resolution failed"))
}

fn resolve_inner(graph: &OptionGraph, overrides: &Overrides) -> Result<Resolution> {
    let mut log = DiagnosticLog::new();
    let requests = Requests::parse(graph, overrides, &mut log);

    let cyclic = cyclic_options(graph);
    if !cyclic.is_empty() {
        return Err(ResolveError::CyclicDependency {
            options: cyclic
                .into_iter()
                .map(|id| graph.option(id).name.clone())
                .collect(),
        });
    }

    let mut env = Environment::new(graph);
    let mut propagator = Propagator::new(graph, &requests);
    let mut passes = propagator.run(&mut env, &mut log)?;
    // Every round fixes at least one group for good, so this is generous.
    passes += settle_choices(
        &mut env,
        &mut propagator,
        &requests,
        &mut log,
        graph.group_count() + 1,
    )?;

    report_overrides(&env, &requests, &mut log);
    debug!(passes, options = graph.len(), "resolution settled");

    Ok(Resolution {
        snapshot: Snapshot::freeze(&env),
        diagnostics: log.finish(),
        passes,
    })
}

/// Repair inconsistent choice groups and re-propagate, at most
/// `max_rounds` times. Returns the propagation passes spent. A group that
/// is still inconsistent once the rounds run out never settles and is
/// reported as a cycle among its members.
fn settle_choices<'g>(
    env: &mut Environment<'g>,
    propagator: &mut Propagator<'g, '_>,
    requests: &Requests,
    log: &mut DiagnosticLog,
    max_rounds: usize,
) -> Result<usize> {
    let graph = env.graph();
    let mut passes = 0;
    let mut round = 0;
    loop {
        let pins = choice::enforce(env, requests, log)?;
        if pins.is_empty() {
            return Ok(passes);
        }
        if round == max_rounds {
            let members = pins
                .iter()
                .map(|(id, _)| graph.option(*id).name.clone())
                .collect();
            return Err(ResolveError::CyclicDependency { options: members });
        }
        round += 1;
        debug!(round, pins = pins.len(), "re-settling after choice repair");
        for (id, value) in pins {
            propagator.pin(id, value);
        }
        passes += propagator.run(env, log)?;
    }
}

/// Compare the settled values with what the user asked for.
fn report_overrides(env: &Environment<'_>, requests: &Requests, log: &mut DiagnosticLog) {
    let graph = env.graph();

    for (id, requested) in requests.honored(graph) {
        let actual = env.get(id);
        if *actual == requested {
            continue;
        }
        let option = graph.option(id);
        let limit = ceiling(id, env, log);
        let reason = match (&requested, graph.group_of(id)) {
            (Value::Tristate(t), _) if limit < *t => {
                format!("limited by dependency '{}' (= {limit})", option.depends)
            }
            (Value::Tristate(t), Some(gid)) if actual.as_tristate() > *t => {
                format!("forced by the tie-break in choice group '{}'", graph.group(gid).id)
            }
            (Value::Tristate(_), Some(gid)) => {
                format!("lost the selection in choice group '{}'", graph.group(gid).id)
            }
            _ if limit == Tristate::No => {
                format!("disabled by dependency '{}'", option.depends)
            }
            _ => match &option.range {
                Some(range) => format!("clamped to range {}..{}", range.min, range.max),
                None => "adjusted to the option's type".to_string(),
            },
        };
        log.push(Diagnostic::warning(
            DiagnosticKind::OverrideDowngraded,
            vec![option.name.clone()],
            format!(
                "'{}' requested {requested} but resolved to {actual}: {reason}",
                option.name
            ),
        ));
    }

    for (id, requested) in requests.ignored() {
        let actual = env.get(*id);
        if actual == requested {
            continue;
        }
        let option = graph.option(*id);
        log.push(Diagnostic::warning(
            DiagnosticKind::IgnoredOverride,
            vec![option.name.clone()],
            format!(
                "'{}' has no prompt; requested {requested} ignored, computed {actual}",
                option.name
            ),
        ));
    }
}
