//! Schema error types.

use std::path::PathBuf;

/// Errors raised while building, validating or loading an option graph.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("duplicate option: {0}")]
    DuplicateOption(String),

    #[error("duplicate choice group: {0}")]
    DuplicateGroup(String),

    #[error("option '{option}' names unknown choice group '{group}'")]
    UnknownGroup { option: String, group: String },

    #[error("choice group '{group}' lists unknown option '{member}'")]
    UnknownMember { group: String, member: String },

    #[error("option '{option}' is listed in choice group '{group}' but does not declare it")]
    MembershipMismatch { option: String, group: String },

    #[error("option '{option}' is listed in more than one choice group ('{first}', '{second}')")]
    MemberInMultipleGroups {
        option: String,
        first: String,
        second: String,
    },

    #[error("choice member '{option}' has type {ty}, expected bool or tristate")]
    InvalidMemberType { option: String, ty: String },

    #[error("choice group '{0}' has no members")]
    EmptyGroup(String),

    #[error("default of choice group '{group}' names '{member}', which is not a member")]
    DefaultNotMember { group: String, member: String },

    #[error("option '{option}' has range {min}..={max}, which is empty")]
    InvalidRange { option: String, min: i64, max: i64 },

    #[error("option '{option}' has a range but type {ty}")]
    RangeOnNonNumeric { option: String, ty: String },

    #[error("cannot read '{text}' as {expected}")]
    InvalidLiteral { text: String, expected: String },

    #[error("unsupported schema format for {}: expected .toml or .json", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SchemaError::UnknownGroup {
            option: "A".into(),
            group: "cpu".into(),
        };
        assert!(err.to_string().contains("unknown choice group 'cpu'"));
    }

    #[test]
    fn io_error_names_path() {
        let err = SchemaError::Io {
            path: PathBuf::from("/nope/schema.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/nope/schema.toml"));
    }
}
