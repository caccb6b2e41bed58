//! Inputs of the Sprig C++ backend.
//!
//! The front end hands the backend a fully type-checked, optimized tree for
//! each expression, together with the types it refers to. This crate
//! defines those shapes:
//!
//! - [`TypePool`] / [`TypeId`] / [`TypeData`]: shared types, including
//!   the redefinition bookkeeping of records and enums.
//! - [`Expr`] / [`ExprKind`]: the owned expression tree.
//! - [`Ident`]: local and global identifiers.
//! - [`canonicalize`]: script name to C++ identifier mangling.
//!
//! Nothing here depends on the C++ backend; `sprig_cpp` consumes these
//! types read-only.

mod canon;
mod expr;
mod ident;
mod pool;
mod type_id;
mod types;

pub use canon::canonicalize;
pub use expr::{
    Attr, AttrTag, BinaryOp, Expr, ExprKind, FieldInit, LambdaExpr, Literal, ReducedKind,
    ScheduleExpr, TableEntry, UnaryOp,
};
pub use ident::{Ident, Scope};
pub use pool::TypePool;
pub use type_id::TypeId;
pub use types::{
    Capture, EnumType, FieldDecl, FuncFlavor, FuncType, InternalType, Param, RecordType,
    TypeData,
};
