//! Choice group enforcement.
//!
//! Runs after propagation has settled. A consistent group has exactly one
//! member at `y` (mandatory) or at most one (optional). Anything else is
//! repaired by tie-break and reported; the repair comes back as pins for
//! the propagator so dependents of the members can settle again.

use kconf_schema::{OptionId, Tristate, Value};
use tracing::debug;

use crate::defaults::{preferred_member, GroupPreference};
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticLog};
use crate::env::Environment;
use crate::error::{ResolveError, Result};
use crate::overrides::Requests;

/// Check every group in `env` and return the pins needed to make the
/// inconsistent ones exclusive. An empty result means every group holds.
///
/// Groups whose dependency is not `y` are skipped; their members already
/// sit at or below their ceiling. A reachable mandatory group with no
/// available member cannot be repaired and fails the run.
pub(crate) fn enforce(
    env: &Environment<'_>,
    requests: &Requests,
    log: &mut DiagnosticLog,
) -> Result<Vec<(OptionId, Value)>> {
    let graph = env.graph();
    let mut pins = Vec::new();

    for (gid, group) in graph.groups() {
        let GroupPreference {
            reachable,
            available,
            ..
        } = preferred_member(gid, env, requests, log);
        if !reachable {
            continue;
        }
        let members = graph.members(gid);
        let name = |id: OptionId| graph.option(id).name.clone();

        if group.is_mandatory() && available.is_empty() {
            return Err(ResolveError::ChoiceConflict {
                group: group.id.clone(),
                members: members.iter().map(|&m| name(m)).collect(),
            });
        }

        let selected: Vec<OptionId> = members
            .iter()
            .copied()
            .filter(|&m| env.get(m).as_tristate() == Tristate::Yes)
            .collect();
        let consistent = if group.is_mandatory() {
            selected.len() == 1
        } else {
            selected.len() <= 1
        };
        if consistent {
            continue;
        }

        // Declaration order decides, whatever the user picked.
        let Some(winner) = available.first().copied() else {
            continue;
        };
        let message = if selected.is_empty() {
            format!(
                "choice group '{}' had no member selected; selecting '{}'",
                group.id,
                name(winner)
            )
        } else {
            format!(
                "choice group '{}' had {} members selected ({}); selecting '{}'",
                group.id,
                selected.len(),
                selected.iter().map(|&m| name(m)).collect::<Vec<_>>().join(", "),
                name(winner)
            )
        };
        debug!(group = %group.id, winner = %name(winner), "repairing choice group");

        let mut involved = vec![group.id.clone()];
        involved.extend(members.iter().map(|&m| name(m)));
        log.push(Diagnostic::warning(DiagnosticKind::ChoiceConflict, involved, message));

        pins.extend(
            members
                .iter()
                .map(|&m| (m, Value::Tristate(Tristate::from_bool(m == winner)))),
        );
    }

    Ok(pins)
}
