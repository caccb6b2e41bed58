//! Expression dispatch.
//!
//! [`emit_expr`] is the single entry point: it lowers one typed expression
//! node to a C++ snippet in the requested representation, recursing into
//! the family-specific modules for anything beyond names and constants.

use sprig_ir::{canonicalize, Expr, ExprKind, Ident, Literal, TypeId};

use crate::context::{CodegenContext, ConstKind};
use crate::error::{CodegenError, EmitResult};
use crate::repr::{GenMode, Repr};
use crate::stack::ensure_sufficient_stack;
use crate::{aggregate, assign, call, coerce, ops};

/// Lower `expr` to C++ in the form described by `mode`.
///
/// # Errors
///
/// Returns a [`CodegenError`] when the tree breaks an invariant the
/// front end is expected to enforce. The unit must then be abandoned.
pub fn emit_expr(ctx: &mut CodegenContext<'_>, expr: &Expr, mode: GenMode) -> EmitResult {
    ensure_sufficient_stack(|| emit_expr_inner(ctx, expr, mode))
}

fn emit_expr_inner(ctx: &mut CodegenContext<'_>, expr: &Expr, mode: GenMode) -> EmitResult {
    tracing::trace!(kind = expr.kind_name(), ?mode, "emit expr");
    if ctx.types.try_get(expr.ty).is_none() {
        return Err(CodegenError::UnknownType { id: expr.ty });
    }
    let repr = mode.repr;

    match &expr.kind {
        ExprKind::Name(id) => emit_name(ctx, id, repr),
        ExprKind::Const(lit) => emit_const(ctx, lit, expr.ty, repr),

        ExprKind::Clone(operand) => {
            let gen = emit_expr(ctx, operand, GenMode::BOXED)?;
            Ok(ctx.boxed_to_repr(format!("{gen}->Clone()"), expr.ty, repr))
        }

        ExprKind::Incr(operand) => assign::emit_incr_decr(ctx, expr, operand, true, mode),
        ExprKind::Decr(operand) => assign::emit_incr_decr(ctx, expr, operand, false, mode),

        ExprKind::Unary { op, operand } => ops::emit_unary(ctx, expr.ty, *op, operand, repr),
        ExprKind::Binary { op, lhs, rhs } if op.is_equality() => {
            ops::emit_eq(ctx, expr.ty, *op, lhs, rhs, repr)
        }
        ExprKind::Binary { op, lhs, rhs } => ops::emit_binary(ctx, expr.ty, *op, lhs, rhs, repr),

        ExprKind::Cond {
            cond,
            then_expr,
            else_expr,
        } => aggregate::emit_cond(ctx, cond, then_expr, else_expr, repr),
        ExprKind::Call { func, args } => call::emit_call(ctx, expr.ty, func, args, repr),
        ExprKind::List(elems) => emit_list(ctx, elems, repr, false),
        ExprKind::In { elem, container } => ops::emit_in(ctx, expr.ty, elem, container, repr),
        ExprKind::Field { record, field } => {
            aggregate::emit_field(ctx, expr.ty, record, *field, repr)
        }
        ExprKind::HasField { record, field } => {
            aggregate::emit_has_field(ctx, expr.ty, record, *field, repr)
        }
        ExprKind::Index { aggr, indices } => {
            aggregate::emit_index(ctx, expr.ty, aggr, indices, repr)
        }

        ExprKind::Assign { lhs, rhs } => assign::emit_assign_expr(ctx, lhs, rhs, mode),
        ExprKind::AddTo { lhs, rhs } => assign::emit_add_to(ctx, expr.ty, lhs, rhs, mode),
        ExprKind::RemoveFrom { lhs, rhs } => {
            assign::emit_remove_from(ctx, expr.ty, lhs, rhs, mode)
        }
        ExprKind::Ref(inner) => emit_expr(ctx, inner, mode),

        ExprKind::Size(operand) => ops::emit_size(ctx, expr.ty, operand, repr),
        ExprKind::Schedule(sched) => call::emit_schedule(ctx, sched),
        ExprKind::Lambda(lambda) => call::emit_lambda(ctx, expr.ty, lambda),

        ExprKind::Is { operand, test_ty } => coerce::emit_is(ctx, expr.ty, operand, *test_ty, repr),
        ExprKind::Cast(operand) => coerce::emit_cast(ctx, expr.ty, operand, repr),
        ExprKind::ArithCoerce(operand) => coerce::emit_arith_coerce(ctx, expr.ty, operand, mode),
        ExprKind::RecordCoerce { operand, map } => {
            coerce::emit_record_coerce(ctx, expr.ty, operand, map, mode)
        }
        ExprKind::TableCoerce(operand) => coerce::emit_table_coerce(ctx, expr.ty, operand, mode),
        ExprKind::VectorCoerce(operand) => {
            coerce::emit_vector_coerce(ctx, expr.ty, operand, mode)
        }

        ExprKind::RecordConstructor(inits) => {
            aggregate::emit_record_constructor(ctx, expr.ty, inits)
        }
        ExprKind::SetConstructor { elems, attrs } => {
            aggregate::emit_set_constructor(ctx, expr.ty, elems, attrs)
        }
        ExprKind::TableConstructor { entries, attrs } => {
            aggregate::emit_table_constructor(ctx, expr.ty, entries, attrs)
        }
        ExprKind::VectorConstructor(elems) => {
            aggregate::emit_vector_constructor(ctx, expr.ty, elems)
        }

        ExprKind::Reduced(kind) => Err(CodegenError::ReducedExpr { kind: kind.name() }),
    }
}

/// Comma-separated snippets for the elements of a list.
///
/// With `nested`, elements that are themselves lists (multi-part set or
/// table indices) are packed into a single index value.
pub(crate) fn emit_list(
    ctx: &mut CodegenContext<'_>,
    elems: &[Expr],
    repr: Repr,
    nested: bool,
) -> EmitResult {
    let mut parts = Vec::with_capacity(elems.len());
    for elem in elems {
        let gen = emit_expr(ctx, elem, GenMode::nested(repr))?;
        if nested && matches!(elem.kind, ExprKind::List(_)) {
            parts.push(format!("index_val__CPP({{{gen}}})"));
        } else {
            parts.push(gen);
        }
    }
    Ok(parts.join(", "))
}

fn emit_name(ctx: &mut CodegenContext<'_>, id: &Ident, repr: Repr) -> EmitResult {
    if !id.is_global() {
        return Ok(ctx.native_to_repr(canonicalize(&id.name), id.ty, repr));
    }

    let env = ctx.env;
    if let Some(storage) = env.global_storage(&id.name) {
        let gen = if id.is_type {
            format!("make_intrusive<TypeVal>({storage}->GetType(), true)")
        } else if env.is_global_var(&id.name) {
            format!("{storage}->GetVal()")
        } else {
            storage.to_owned()
        };
        return Ok(ctx.boxed_to_repr(gen, id.ty, repr));
    }

    match env.builtin_storage(&id.name) {
        Some(storage) => Ok(ctx.boxed_to_repr(storage.to_owned(), id.ty, repr)),
        None => Err(CodegenError::UnknownGlobal {
            name: id.name.clone(),
        }),
    }
}

fn emit_const(ctx: &mut CodegenContext<'_>, lit: &Literal, ty: TypeId, repr: Repr) -> EmitResult {
    let gen = match lit {
        Literal::Bool(b) => b.to_string(),
        Literal::Int(i) => fmt_int(*i),
        Literal::Count(c) | Literal::Port(c) => fmt_count(*c),
        Literal::Double(d) | Literal::Time(d) | Literal::Interval(d) => fmt_double(*d),
        Literal::Enum(v) => ctx.enum_constant(ty, *v)?,
        Literal::String(s) => return Ok(ctx.const_name(ConstKind::String, s)),
        Literal::Addr(s) => return Ok(ctx.const_name(ConstKind::Addr, s)),
        Literal::Subnet(s) => return Ok(ctx.const_name(ConstKind::Subnet, s)),
        Literal::Pattern(s) => return Ok(ctx.const_name(ConstKind::Pattern, s)),
    };

    Ok(ctx.native_to_repr(gen, ty, repr))
}

fn fmt_int(i: i64) -> String {
    // The literal 9223372036854775808 does not fit a signed 64-bit type.
    if i == i64::MIN {
        "INT64_MIN".to_owned()
    } else {
        i.to_string()
    }
}

fn fmt_count(c: u64) -> String {
    if i64::try_from(c).is_ok() {
        c.to_string()
    } else {
        format!("{c}ULL")
    }
}

fn fmt_double(d: f64) -> String {
    if d.is_nan() {
        "NAN".to_owned()
    } else if d.is_infinite() {
        if d.is_sign_positive() { "INFINITY" } else { "-INFINITY" }.to_owned()
    } else {
        // Debug keeps full precision and always includes a `.` or exponent.
        format!("{d:?}")
    }
}

#[cfg(test)]
mod tests;
