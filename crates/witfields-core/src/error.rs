use std::fmt;

/// Machine-readable error codes for callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    MetadataLoadFailed,
    FieldNotFound,
    DuplicateField,
    InvalidFieldName,
    InvalidValueType,
    ProjectNotFound,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::MetadataLoadFailed => "E1002",
            Self::FieldNotFound => "E2001",
            Self::DuplicateField => "E2002",
            Self::InvalidFieldName => "E2003",
            Self::InvalidValueType => "E2004",
            Self::ProjectNotFound => "E2005",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::MetadataLoadFailed => "Metadata snapshot could not be loaded",
            Self::FieldNotFound => "Field not found",
            Self::DuplicateField => "Field already exists",
            Self::InvalidFieldName => "Invalid field name",
            Self::InvalidValueType => "Value has the wrong type for the field",
            Self::ProjectNotFound => "Project not found",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .witfields/config.toml and retry."),
            Self::MetadataLoadFailed => {
                Some("Check that the snapshot is valid JSON with fields, nodes and rules.")
            }
            Self::FieldNotFound => Some("Use `witf fields` to list the known fields."),
            Self::DuplicateField => None,
            Self::InvalidFieldName => Some(
                "Reference names contain a '.' (System.State); display names do not (State).",
            ),
            Self::InvalidValueType => None,
            Self::ProjectNotFound => Some("Use the id of a project node from the hierarchy."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Structural misuse of the field API.
///
/// Data-validity problems (bad conversions, unresolvable paths) never show up
/// here; they are recorded as a [`crate::field::FieldStatus`] on the field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("field [{key}] does not exist in this collection (size={size})")]
    UnknownField { key: String, size: usize },

    #[error("field [{key}] is not a known field definition")]
    UnknownDefinition { key: String },

    #[error("attempting to add field [{id}] but it already exists")]
    DuplicateField { id: i32 },

    #[error("reference name [{0}] must contain a '.' separator")]
    InvalidReferenceName(String),

    #[error("display name [{0}] must be non-empty and must not contain a '.'")]
    InvalidDisplayName(String),

    #[error("the input value is of type [{actual}], which is invalid for field [{id}] (type [{expected}])")]
    InvalidValueType {
        id: i32,
        actual: &'static str,
        expected: &'static str,
    },

    #[error("node [{0}] is not a project in the hierarchy")]
    UnknownProject(i32),

    #[error("metadata error: {0}")]
    Metadata(String),
}

impl FieldError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownField { .. } | Self::UnknownDefinition { .. } => ErrorCode::FieldNotFound,
            Self::DuplicateField { .. } => ErrorCode::DuplicateField,
            Self::InvalidReferenceName(_) | Self::InvalidDisplayName(_) => {
                ErrorCode::InvalidFieldName
            }
            Self::InvalidValueType { .. } => ErrorCode::InvalidValueType,
            Self::UnknownProject(_) => ErrorCode::ProjectNotFound,
            Self::Metadata(_) => ErrorCode::MetadataLoadFailed,
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}
