//! Shared test utilities: a type pool / environment fixture and shorthand
//! tree builders. Only compiled in test builds.

use sprig_ir::{BinaryOp, Expr, ExprKind, Ident, Literal, TypePool, TypeId};

use crate::context::{CodegenContext, CompileEnv};
use crate::error::CodegenError;
use crate::expr::emit_expr;
use crate::repr::GenMode;

/// Owns the read-only inputs a [`CodegenContext`] borrows.
pub(crate) struct Fixture {
    pub pool: TypePool,
    pub env: CompileEnv,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Fixture {
            pool: TypePool::new(),
            env: CompileEnv::new(),
        }
    }

    pub(crate) fn ctx(&self) -> CodegenContext<'_> {
        CodegenContext::new(&self.pool, &self.env)
    }
}

/// Lower `e`, panicking on error.
pub(crate) fn lower(ctx: &mut CodegenContext<'_>, e: &Expr, mode: GenMode) -> String {
    emit_expr(ctx, e, mode).unwrap_or_else(|err| panic!("lowering failed: {err}"))
}

/// Lower `e`, expecting an error.
pub(crate) fn lower_err(ctx: &mut CodegenContext<'_>, e: &Expr, mode: GenMode) -> CodegenError {
    match emit_expr(ctx, e, mode) {
        Ok(code) => panic!("expected an error, got `{code}`"),
        Err(err) => err,
    }
}

pub(crate) fn local(name: &str, ty: TypeId) -> Expr {
    Expr::name(Ident::local(name, ty))
}

pub(crate) fn global(name: &str, ty: TypeId) -> Expr {
    Expr::name(Ident::global(name, ty))
}

pub(crate) fn int(i: i64) -> Expr {
    Expr::constant(Literal::Int(i), TypeId::INT)
}

pub(crate) fn count(c: u64) -> Expr {
    Expr::constant(Literal::Count(c), TypeId::COUNT)
}

pub(crate) fn string(s: &str) -> Expr {
    Expr::constant(Literal::String(s.to_owned()), TypeId::STRING)
}

pub(crate) fn bin(op: BinaryOp, lhs: Expr, rhs: Expr, ty: TypeId) -> Expr {
    Expr::binary(op, lhs, rhs, ty)
}

/// `Ref(e)`, as the front end wraps assignment targets.
pub(crate) fn lvalue(e: Expr) -> Expr {
    let ty = e.ty;
    Expr::new(ExprKind::Ref(Box::new(e)), ty)
}

pub(crate) fn field(record: Expr, field: usize, ty: TypeId) -> Expr {
    Expr::new(
        ExprKind::Field {
            record: Box::new(record),
            field,
        },
        ty,
    )
}

pub(crate) fn index(aggr: Expr, indices: Vec<Expr>, ty: TypeId) -> Expr {
    Expr::new(
        ExprKind::Index {
            aggr: Box::new(aggr),
            indices,
        },
        ty,
    )
}

pub(crate) fn call(func: Expr, args: Vec<Expr>, ty: TypeId) -> Expr {
    Expr::new(
        ExprKind::Call {
            func: Box::new(func),
            args,
        },
        ty,
    )
}

/// How many times `needle` occurs in `haystack`.
pub(crate) fn occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
