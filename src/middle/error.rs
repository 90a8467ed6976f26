use core::fmt::Display;

use super::ty::Type;

/// The first semantic problem found while analyzing a program. Analysis stops
/// at this error, there is no recovery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SemanticError {
    #[error("Identifier {0} already declared")]
    DuplicateDeclaration(String),
    #[error("Identifier {0} not declared")]
    UndeclaredIdentifier(String),
    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatch),
    #[error("Cannot assign to constant {0}")]
    ConstAssignment(String),
    #[error("{parameters} parameter(s) required but {arguments} argument(s) passed")]
    ArityMismatch { parameters: usize, arguments: usize },
    #[error(transparent)]
    IllegalControlFlow(#[from] IllegalControlFlow),
    #[error("Call of non-order")]
    NotCallable,
}

/// Types are stored in their rendered form so the error stays `Send`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeMismatch {
    #[error("Expected a {expected} but got a {actual}")]
    Expected { expected: String, actual: String },
    #[error("Cannot assign a {source_type} to a {target_type}")]
    NotAssignable {
        source_type: String,
        target_type: String,
    },
    #[error("Operands do not have the same type")]
    OperandsDiffer,
    #[error("Not all elements have the same type")]
    ElementsDiffer,
    #[error("Not all keys have the same type")]
    KeysDiffer,
    #[error("Not all values have the same type")]
    ValuesDiffer,
    #[error("Type void can only be returned")]
    VoidValue,
}

impl TypeMismatch {
    pub fn expected(expected: impl Display, actual: &Type) -> Self {
        Self::Expected {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn not_assignable(source: &Type, target: &Type) -> Self {
        Self::NotAssignable {
            source_type: source.to_string(),
            target_type: target.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IllegalControlFlow {
    #[error("'{0}' can only appear in a loop")]
    OutsideLoop(&'static str),
    #[error("Execute can only appear in an order")]
    ReturnOutsideFunction,
    #[error("Cannot execute a value here")]
    ValueInVoidFunction,
    #[error("Something should be executed here")]
    MissingReturnValue,
}
