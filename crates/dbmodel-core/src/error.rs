//! Semantic validation errors.

use crate::span::Span;
use thiserror::Error;

/// Result alias for model construction.
pub type Result<T> = std::result::Result<T, SemanticError>;

/// A semantic validation failure, attributed to the token of the offending
/// entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SemanticError {
    /// The error message.
    pub message: String,
    /// Source span of the entity that caused the error.
    pub span: Span,
    /// Error kind for programmatic handling.
    pub kind: SemanticErrorKind,
}

/// Kinds of semantic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticErrorKind {
    /// Two schemas share a name or alias.
    DuplicateSchemaName,
    /// Two tables in one schema share a name.
    DuplicateTableName,
    /// Two enums in one schema share a name.
    DuplicateEnumName,
    /// Two tags in one schema share a name.
    DuplicateTagName,
    /// Two table groups in one schema share a name.
    DuplicateTableGroupName,
    /// Two refs in one schema connect the same pair of endpoints.
    DuplicateRef,
    /// A table lookup named a schema that was never created.
    SchemaNotFound,
    /// Two fields in one table share a name.
    DuplicateFieldName,
    /// Two values in one enum share a name.
    DuplicateEnumValue,
    /// A ref endpoint or table group member names an unknown table.
    TableNotFound,
    /// A ref endpoint names an unknown field.
    FieldNotFound,
    /// A ref does not have two distinct, compatible endpoints.
    InvalidEndpoints,
    /// A table is listed by more than one table group.
    TableAlreadyGrouped,
    /// An identifier counter ran past `u32::MAX`.
    IdSpaceExhausted,
}

impl SemanticError {
    /// Create a new semantic error.
    pub fn new(message: impl Into<String>, span: Span, kind: SemanticErrorKind) -> Self {
        Self {
            message: message.into(),
            span,
            kind,
        }
    }

    /// Re-attribute the error to another token.
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Create a duplicate schema error.
    pub fn duplicate_schema(name: &str, span: Span) -> Self {
        Self::new(
            format!("schema \"{}\" already exists", name),
            span,
            SemanticErrorKind::DuplicateSchemaName,
        )
    }

    /// Create a schema not found error.
    pub fn schema_not_found(name: &str, span: Span) -> Self {
        Self::new(
            format!("schema \"{}\" does not exist", name),
            span,
            SemanticErrorKind::SchemaNotFound,
        )
    }

    /// Create a table not found error.
    pub fn table_not_found(qualified: &str, span: Span) -> Self {
        Self::new(
            format!("table {} does not exist", qualified),
            span,
            SemanticErrorKind::TableNotFound,
        )
    }

    /// Create a field not found error.
    pub fn field_not_found(table: &str, field: &str, span: Span) -> Self {
        Self::new(
            format!("field \"{}\" does not exist in table {}", field, table),
            span,
            SemanticErrorKind::FieldNotFound,
        )
    }

    /// Create an invalid endpoints error.
    pub fn invalid_endpoints(message: impl Into<String>, span: Span) -> Self {
        Self::new(message, span, SemanticErrorKind::InvalidEndpoints)
    }

    /// Create an identifier exhaustion error.
    pub fn id_space_exhausted(kind: &str, base: u32) -> Self {
        Self::new(
            format!("{} identifiers exhausted (base {})", kind, base),
            Span::default(),
            SemanticErrorKind::IdSpaceExhausted,
        )
    }

    /// Whether this error reports a duplicate definition.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self.kind,
            SemanticErrorKind::DuplicateSchemaName
                | SemanticErrorKind::DuplicateTableName
                | SemanticErrorKind::DuplicateEnumName
                | SemanticErrorKind::DuplicateTagName
                | SemanticErrorKind::DuplicateTableGroupName
                | SemanticErrorKind::DuplicateRef
                | SemanticErrorKind::DuplicateFieldName
                | SemanticErrorKind::DuplicateEnumValue
        )
    }

    /// Format the error with source context.
    pub fn format_with_source(&self, source: &str) -> String {
        format!(
            "error[{:?}]: {}\n{}",
            self.kind,
            self.message,
            self.span.snippet(source)
        )
    }
}

/// A combined error type for the JSON entry points.
#[derive(Debug, Error)]
pub enum Error {
    /// The raw bundle could not be decoded.
    #[error("invalid raw bundle: {0}")]
    Decode(#[from] serde_json::Error),
    /// The decoded bundle failed semantic validation.
    #[error("semantic error: {0}")]
    Semantic(#[from] SemanticError),
}

impl Error {
    /// Format the error with source context.
    ///
    /// Decode errors refer to the JSON bundle, not to the DSL source, and
    /// are rendered without a snippet.
    pub fn format_with_source(&self, source: &str) -> String {
        match self {
            Error::Decode(e) => format!("error: {}\n", e),
            Error::Semantic(e) => e.format_with_source(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting() {
        let source = "Table users {\n  id int\n}\nTable users {\n  id int\n}";
        let err = SemanticError::new(
            "table \"users\" already exists",
            Span::new(25, 36),
            SemanticErrorKind::DuplicateTableName,
        );

        let formatted = err.format_with_source(source);
        assert!(formatted.contains("error[DuplicateTableName]"));
        assert!(formatted.contains("line 4:1"));
        assert!(formatted.contains("^~~~~"));
    }

    #[test]
    fn test_reattribute() {
        let err = SemanticError::schema_not_found("crm", Span::default()).at(Span::new(3, 6));
        assert_eq!(err.span, Span::new(3, 6));
        assert_eq!(err.kind, SemanticErrorKind::SchemaNotFound);
        assert_eq!(err.to_string(), "schema \"crm\" does not exist");
        assert!(!err.is_duplicate());
    }
}
