//! Lowering errors.
//!
//! Any construct without a defined lowering aborts the whole compilation
//! unit. Recognised-but-unsupported constructs are not errors; they lower
//! to nothing or to a placeholder.

use crate::oracle::Position;

pub type Result<T> = std::result::Result<T, LowerError>;

#[derive(Debug, thiserror::Error)]
pub enum LowerError {
    #[error("{position}: {kind}")]
    At {
        position: Position,
        kind: ErrorKind,
    },

    #[error("{0}")]
    Bare(ErrorKind),
}

impl LowerError {
    pub fn new(position: Option<Position>, kind: ErrorKind) -> Self {
        match position {
            Some(position) => LowerError::At { position, kind },
            None => LowerError::Bare(kind),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        match self {
            LowerError::At { kind, .. } | LowerError::Bare(kind) => kind,
        }
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            LowerError::At { position, .. } => Some(position),
            LowerError::Bare(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    #[error("unknown Stmt: {0}")]
    UnknownStmt(&'static str),

    #[error("unknown Expr: {0}")]
    UnknownExpr(&'static str),

    #[error("unknown Decl")]
    UnknownDecl,

    #[error("unknown Spec: {0}")]
    UnknownSpec(&'static str),

    #[error("unknown TypeSpec: {0}")]
    UnknownTypeSpec(String),

    #[error("unknown field type: {0}")]
    UnknownFieldType(&'static str),

    #[error("multiple receivers")]
    MultipleReceivers,

    #[error("key == nil and value != nil in range for")]
    RangeValueWithoutKey,

    #[error("unresolved identifier {0}")]
    Unresolved(String),

    #[error("no type information for {0}")]
    MissingType(&'static str),

    #[error("unknown zero value for {0}")]
    NoZeroValue(String),

    #[error("defer of non-call expression: {0}")]
    DeferNonCall(&'static str),

    #[error("unknown statement type in type switch assign: {0}")]
    TypeSwitchGuard(&'static str),

    #[error("compound assignment needs exactly one operand on each side, got {lhs} and {rhs}")]
    CompoundArity { lhs: usize, rhs: usize },

    #[error("unsupported type in type switch case: {0}")]
    TypeCase(String),

    #[error("unsupported {0}")]
    Unsupported(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_with_position() {
        let err = LowerError::new(
            Some(Position {
                file: "main.go".into(),
                line: 4,
                column: 2,
            }),
            ErrorKind::MultipleReceivers,
        );
        assert_eq!(err.to_string(), "main.go:4:2: multiple receivers");
        assert_eq!(err.kind(), &ErrorKind::MultipleReceivers);
    }

    #[test]
    fn test_error_without_position() {
        let err = LowerError::new(None, ErrorKind::UnknownStmt("BadStmt"));
        assert_eq!(err.to_string(), "unknown Stmt: BadStmt");
        assert!(err.position().is_none());
    }
}
