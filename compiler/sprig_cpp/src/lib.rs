//! Sprig C++ backend: expression lowering.
//!
//! Lowers one typed, optimized expression tree at a time into a C++
//! snippet for the statement compiler to splice into a function body.
//!
//! # Representations
//!
//! Each snippet is produced in the form its consumer asks for (see
//! [`Repr`]): an unboxed native scalar, a boxed `ValPtr`, or whichever is
//! cheaper. [`GenMode`] pairs that request with a flag saying whether the
//! expression is a whole statement, in which case assignments skip
//! producing a value.
//!
//! # Session state
//!
//! All per-unit state lives in a [`CodegenContext`]: the slot tables for
//! late-bound record fields and enum values, and the events, lambdas, types
//! and constants the declaration stage must emit. [`CodegenContext::finish`]
//! hands these over as [`UnitArtifacts`].
//!
//! # Errors
//!
//! Lowering fails only on trees a correct front end never produces; see
//! [`CodegenError`].

mod aggregate;
mod assign;
mod call;
mod coerce;
mod context;
mod error;
mod expr;
mod ops;
mod remap;
mod repr;
mod stack;

#[cfg(test)]
mod test_helpers;

pub use context::{
    CodegenConfig, CodegenContext, CompileEnv, ConstKind, DeclRequests, GlobalKind, PooledConst,
    UnitArtifacts,
};
pub use error::{CodegenError, EmitResult};
pub use expr::emit_expr;
pub use remap::{EnumSlot, FieldSlot, RemapTables};
pub use repr::{GenMode, Repr};
