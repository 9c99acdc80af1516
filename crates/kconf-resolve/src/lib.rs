//! Fixed-point resolution engine for tristate feature configuration.
//!
//! Given a validated [`OptionGraph`](kconf_schema::OptionGraph) and a partial
//! set of user [`Overrides`], [`resolve`] computes one consistent value for
//! every option and freezes it into a [`Snapshot`].
//!
//! # Pipeline
//!
//! - **Evaluator** ([`eval`]): tristate logic over the working environment.
//! - **Default resolution** (`defaults`): overrides, ordered default rules
//!   and choice group preferences.
//! - **Propagation** (`propagate`): whole-graph passes committed at pass
//!   end until nothing changes, bounded by `|options| + 1` passes.
//! - **Choice enforcement** (`choice`): exclusivity repair by tie-break,
//!   followed by re-propagation.
//! - **Snapshot** ([`snapshot`]): the immutable result.
//!
//! Structural cycles are detected up front ([`cycle`]) and abort the run,
//! as does a reachable mandatory choice group with no available member.
//! Everything else is reported as a [`Diagnostic`] next to a best-effort
//! snapshot.

mod choice;
pub mod cycle;
mod defaults;
pub mod diagnostics;
pub mod env;
pub mod error;
pub mod eval;
pub mod explain;
pub mod overrides;
mod propagate;
pub mod resolve;
pub mod snapshot;
pub mod variants;

pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use env::Environment;
pub use error::{ResolveError, Result};
pub use eval::{evaluate, Evaluation};
pub use explain::{explain, Explanation};
pub use overrides::{OverrideValue, Overrides};
pub use resolve::{resolve, Resolution};
pub use snapshot::{Snapshot, SnapshotEntry};
pub use variants::{resolve_variants, VariantResult};
