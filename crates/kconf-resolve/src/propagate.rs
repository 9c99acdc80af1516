//! Fixed-point constraint propagation.
//!
//! Each pass recomputes every option from the environment left by the
//! previous pass and commits the results together, so the outcome does not
//! depend on the order options are visited in. Values only move through a
//! finite lattice, which is why `|options| + 1` passes bound a terminating
//! run.

use std::collections::BTreeMap;

use kconf_schema::{OptionGraph, OptionId, Value};
use tracing::{debug, trace};

use crate::defaults::{apply_ceiling, ceiling, preferred_member, resolve_default, GroupPreference};
use crate::diagnostics::DiagnosticLog;
use crate::env::Environment;
use crate::error::{ResolveError, Result};
use crate::overrides::Requests;

/// Drives an environment to its fixed point under a set of requests.
///
/// Pins force a candidate for an option regardless of overrides or
/// defaults; the choice enforcer uses them to repair groups. Pinned values
/// still sit under their option's ceiling.
#[derive(Debug)]
pub(crate) struct Propagator<'g, 'r> {
    graph: &'g OptionGraph,
    requests: &'r Requests,
    pins: BTreeMap<OptionId, Value>,
}

impl<'g, 'r> Propagator<'g, 'r> {
    pub(crate) fn new(graph: &'g OptionGraph, requests: &'r Requests) -> Self {
        Self {
            graph,
            requests,
            pins: BTreeMap::new(),
        }
    }

    pub(crate) fn pin(&mut self, id: OptionId, value: Value) {
        self.pins.insert(id, value);
    }

    pub(crate) fn max_passes(&self) -> usize {
        self.graph.len() + 1
    }

    /// Run passes until nothing changes. Returns the number of passes,
    /// including the final quiet one.
    pub(crate) fn run(&self, env: &mut Environment<'g>, log: &mut DiagnosticLog) -> Result<usize> {
        let mut changed = Vec::new();
        for pass in 1..=self.max_passes() {
            let next = self.pass(env, log);
            changed = env.commit(next);
            debug!(pass, changed = changed.len(), "propagation pass");
            if changed.is_empty() {
                return Ok(pass);
            }
            for &id in &changed {
                trace!(option = %self.graph.option(id).name, value = %env.get(id), "updated");
            }
        }

        Err(ResolveError::CyclicDependency {
            options: changed
                .into_iter()
                .map(|id| self.graph.option(id).name.clone())
                .collect(),
        })
    }

    /// One pass: every option's next value, read from `env` only.
    fn pass(&self, env: &Environment<'g>, log: &mut DiagnosticLog) -> Vec<Value> {
        let preferences: Vec<GroupPreference> = self
            .graph
            .groups()
            .map(|(gid, _)| preferred_member(gid, env, self.requests, log))
            .collect();

        self.graph
            .options()
            .map(|(id, option)| {
                let limit = ceiling(id, env, log);
                let candidate = match self.pins.get(&id) {
                    Some(pinned) => pinned.clone(),
                    None => resolve_default(id, env, self.requests, &preferences, log),
                };
                apply_ceiling(option, candidate, limit)
            })
            .collect()
    }
}
