//! Error kinds raised at the editing boundary.
//!
//! None of these propagate past the boundary where they occur: the panel logs
//! them and carries on. They are still returned so callers can observe what
//! happened to an edit.

use std::fmt;

/// Input rejected by a field-level check before any mutation happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Type of validation failure
    pub kind: ValidationErrorKind,
    /// Field (or selection channel) the input was aimed at
    pub field: &'static str,
    /// Human-readable detail
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(kind: ValidationErrorKind, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.kind, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Types of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Room number contains something other than digits and `/`
    DisallowedCharacters,
    /// Color is not a `#rrggbb` value
    InvalidColor,
    /// Toggle input is not a recognizable true/false value
    NotABoolean,
    /// The edit targets a selection that does not resolve to a feature
    NoMatchingSelection,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DisallowedCharacters => write!(f, "Disallowed Characters"),
            Self::InvalidColor => write!(f, "Invalid Color"),
            Self::NotABoolean => write!(f, "Not A Boolean"),
            Self::NoMatchingSelection => write!(f, "No Matching Selection"),
        }
    }
}

/// Malformed geometry text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based line of the failure (0 when unknown)
    pub line: usize,
    /// 1-based column of the failure (0 when unknown)
    pub column: usize,
    /// Parser message
    pub message: String,
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid JSON for geometry at line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// Remote operation the persistence collaborator was asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceOperation {
    /// Column update
    Update,
    /// Record delete
    Delete,
}

impl fmt::Display for PersistenceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// A remote update or delete that the record store reported as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceError {
    /// Remote table name
    pub table: String,
    /// Record identifier
    pub id: String,
    /// Operation that failed
    pub operation: PersistenceOperation,
    /// Store-provided message
    pub message: String,
}

impl PersistenceError {
    /// Creates a new persistence error.
    pub fn new(
        table: impl Into<String>,
        id: impl Into<String>,
        operation: PersistenceOperation,
        message: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            id: id.into(),
            operation,
            message: message.into(),
        }
    }
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error during {} of {}/{}: {}",
            self.operation, self.table, self.id, self.message
        )
    }
}

impl std::error::Error for PersistenceError {}

/// Outcome of an edit that was not applied.
///
/// Persistence failures never show up here: they happen after the local edit
/// and are only visible in the worker's history and the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// Input rejected at the field boundary
    Validation(ValidationError),
    /// Geometry text did not parse
    Parse(ParseError),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Parse(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for EditError {}

impl From<ValidationError> for EditError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<ParseError> for EditError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}
