//! Diagnostics accumulated during a resolution run.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARN"),
        }
    }
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// An expression read a symbol that is not declared; it read as `n`.
    UnresolvedReference,
    /// A user-requested value was capped by a dependency ceiling or range,
    /// or lost a choice-group conflict.
    OverrideDowngraded,
    /// A choice group had to be repaired by tie-break.
    ChoiceConflict,
    /// Dependencies or defaults form a cycle.
    CyclicDependency,
    /// A value could not be read as the option's type.
    InvalidValue,
    /// An override names an option the schema does not declare.
    UnknownSymbol,
    /// An override targets an option without a prompt.
    IgnoredOverride,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::UnresolvedReference => "unresolved-reference",
            DiagnosticKind::OverrideDowngraded => "override-downgraded",
            DiagnosticKind::ChoiceConflict => "choice-conflict",
            DiagnosticKind::CyclicDependency => "cyclic-dependency",
            DiagnosticKind::InvalidValue => "invalid-value",
            DiagnosticKind::UnknownSymbol => "unknown-symbol",
            DiagnosticKind::IgnoredOverride => "ignored-override",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic: kind, the options involved and a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub options: Vec<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, options: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            options,
            message: message.into(),
        }
    }

    pub fn error(kind: DiagnosticKind, options: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            options,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.kind, self.message)
    }
}

/// Collects diagnostics in emission order, dropping exact repeats.
///
/// Fixed-point passes evaluate the same expressions many times; the log
/// keeps each distinct diagnostic once. Unresolved references are grouped
/// per missing symbol and reported together by [`DiagnosticLog::finish`].
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: Vec<Diagnostic>,
    seen: HashSet<Diagnostic>,
    unresolved: BTreeMap<String, Vec<String>>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if self.seen.insert(diagnostic.clone()) {
            self.entries.push(diagnostic);
        }
    }

    /// Record that `referenced_by` read the undeclared `symbols`.
    pub fn note_unresolved(&mut self, referenced_by: &str, symbols: &[String]) {
        for symbol in symbols {
            let users = self.unresolved.entry(symbol.clone()).or_default();
            if !users.iter().any(|u| u == referenced_by) {
                users.push(referenced_by.to_string());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len() + self.unresolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Produce the ordered diagnostics list: unresolved references first
    /// (sorted by symbol), then everything else in emission order.
    pub fn finish(self) -> Vec<Diagnostic> {
        let mut out: Vec<Diagnostic> = self
            .unresolved
            .into_iter()
            .map(|(symbol, users)| {
                let message = format!(
                    "undeclared symbol '{symbol}' read as n (referenced by {})",
                    users.join(", ")
                );
                let mut options = vec![symbol];
                options.extend(users);
                Diagnostic::warning(DiagnosticKind::UnresolvedReference, options, message)
            })
            .collect();
        out.extend(self.entries);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_dropped() {
        let mut log = DiagnosticLog::new();
        let d = Diagnostic::warning(DiagnosticKind::InvalidValue, vec!["A".into()], "bad");
        log.push(d.clone());
        log.push(d);
        log.push(Diagnostic::warning(
            DiagnosticKind::InvalidValue,
            vec!["B".into()],
            "bad",
        ));
        assert_eq!(log.finish().len(), 2);
    }

    #[test]
    fn unresolved_grouped_per_symbol() {
        let mut log = DiagnosticLog::new();
        log.note_unresolved("A", &["GHOST".into()]);
        log.note_unresolved("B", &["GHOST".into()]);
        log.note_unresolved("A", &["GHOST".into()]);
        log.push(Diagnostic::warning(
            DiagnosticKind::UnknownSymbol,
            vec!["Z".into()],
            "unknown",
        ));

        let out = log.finish();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].kind, DiagnosticKind::UnresolvedReference);
        assert_eq!(out[0].options, vec!["GHOST", "A", "B"]);
        assert_eq!(out[1].kind, DiagnosticKind::UnknownSymbol);
    }

    #[test]
    fn display_format() {
        let d = Diagnostic::error(DiagnosticKind::CyclicDependency, vec![], "cycle: C, D");
        assert_eq!(d.to_string(), "ERROR [cyclic-dependency] cycle: C, D");
    }
}
