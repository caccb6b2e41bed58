//! Backend errors.
//!
//! Every variant signals that an earlier compiler stage handed the backend
//! a tree it cannot trust. None of them are user diagnostics: the first
//! error aborts lowering of the whole compilation unit.

use sprig_ir::TypeId;
use thiserror::Error;

/// Internal error raised while lowering an expression.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// A kind that only exists in statement-reduced trees.
    #[error("`{kind}` expression reached the C++ backend; it only exists in reduced trees")]
    ReducedExpr { kind: &'static str },

    /// An expression typed with an id the unit's type pool never issued.
    #[error("expression typed with unknown type id {id:?}")]
    UnknownType { id: TypeId },

    #[error("bad assignment target: `{kind}` expression")]
    BadAssignTarget { kind: &'static str },

    #[error("compound {side}-hand side in multi-assignment")]
    CompoundMultiAssign { side: &'static str },

    #[error("unsupported operand type `{ty}` for `{op}`")]
    UnsupportedOperands { op: &'static str, ty: &'static str },

    #[error("bad type in arithmetic coercion: `{ty}`")]
    BadCoercion { ty: &'static str },

    #[error("no storage registered for global `{name}`")]
    UnknownGlobal { name: String },

    #[error("field access on non-record type `{ty}`")]
    NotARecord { ty: &'static str },

    #[error("record has no field with index {field}")]
    NoSuchField { field: usize },

    #[error("enum constant of non-enum type `{ty}`")]
    NotAnEnum { ty: &'static str },

    #[error("enum has no value {value}")]
    NoSuchEnumValue { value: i64 },

    #[error("call through non-function type `{ty}`")]
    NotCallable { ty: &'static str },

    #[error("cannot index a value of type `{ty}`")]
    BadIndex { ty: &'static str },
}

/// Result of emitting one C++ snippet.
pub type EmitResult = Result<String, CodegenError>;
