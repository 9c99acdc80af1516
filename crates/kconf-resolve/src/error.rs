//! Fatal resolution errors.

use crate::diagnostics::{Diagnostic, DiagnosticKind};

/// Errors that abort a resolution run. No snapshot is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The listed options never settle: their dependencies or defaults
    /// refer back to themselves.
    #[error("cyclic dependency among: {}", options.join(", "))]
    CyclicDependency { options: Vec<String> },

    /// A reachable mandatory choice group has no member whose dependencies
    /// are satisfied.
    #[error("choice group '{group}' is reachable but none of its members ({}) is available", members.join(", "))]
    ChoiceConflict { group: String, members: Vec<String> },
}

impl ResolveError {
    /// The error as an error-severity diagnostic, for uniform reporting.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::CyclicDependency { options } => Diagnostic::error(
                DiagnosticKind::CyclicDependency,
                options.clone(),
                self.to_string(),
            ),
            ResolveError::ChoiceConflict { group, members } => {
                let mut options = vec![group.clone()];
                options.extend(members.iter().cloned());
                Diagnostic::error(DiagnosticKind::ChoiceConflict, options, self.to_string())
            }
        }
    }
}

/// Result type alias for resolution.
pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;

    #[test]
    fn error_display() {
        let err = ResolveError::CyclicDependency {
            options: vec!["C".into(), "D".into()],
        };
        assert_eq!(err.to_string(), "cyclic dependency among: C, D");
    }

    #[test]
    fn converts_to_error_diagnostic() {
        let err = ResolveError::ChoiceConflict {
            group: "cpu".into(),
            members: vec!["X".into(), "Y".into()],
        };
        let d = err.to_diagnostic();
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.kind, DiagnosticKind::ChoiceConflict);
        assert_eq!(d.options, vec!["cpu", "X", "Y"]);
    }
}
