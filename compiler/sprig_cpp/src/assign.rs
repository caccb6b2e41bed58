//! Assignment and in-place mutation.
//!
//! Plain assignment dispatches on the shape of the target: a name, an
//! index, a field, or a list of names (destructuring).
//!
//! `+=`, `-=`, `++` and `--` only use C++'s in-place operators on local
//! variables with a native representation. Every other target (a global,
//! an index or field, a container) is rewritten to `x = x op y` and lowered
//! through the general assignment path. When the target is an index or
//! field whose parts are not plain names or constants, those parts are
//! first bound to temporaries so the generated code evaluates them once.

use sprig_ir::{
    canonicalize, BinaryOp, Expr, ExprKind, FuncType, Ident, InternalType, Literal, TypeData,
    TypeId,
};

use crate::context::CodegenContext;
use crate::error::{CodegenError, EmitResult};
use crate::expr::{emit_expr, emit_list};
use crate::ops::string_concat;
use crate::repr::{GenMode, Repr};

/// Value being stored.
enum Rhs<'e> {
    /// Lowered on demand, in the form the target needs.
    Expr { expr: &'e Expr, target: TypeId },
    /// Already lowered; identical in both forms.
    Code(String),
}

impl Rhs<'_> {
    /// Form for a target holding its native representation.
    fn native(&self, ctx: &mut CodegenContext<'_>) -> EmitResult {
        match self {
            Rhs::Expr { expr, target } => emit_for_slot(ctx, expr, *target),
            Rhs::Code(code) => Ok(code.clone()),
        }
    }

    /// Form for a target holding a `ValPtr`.
    fn boxed(&self, ctx: &mut CodegenContext<'_>) -> EmitResult {
        match self {
            Rhs::Expr { expr, .. } => emit_expr(ctx, expr, GenMode::BOXED),
            Rhs::Code(code) => Ok(code.clone()),
        }
    }
}

/// Lower `expr` for storage in a native slot of type `slot`, such as a
/// local variable or a parameter of a compiled function.
///
/// An `any` slot takes the boxed value; an `any` source is narrowed to the
/// slot's type.
pub(crate) fn emit_for_slot(ctx: &mut CodegenContext<'_>, expr: &Expr, slot: TypeId) -> EmitResult {
    let types = ctx.types;
    let slot_any = types.is_any(slot);
    let source_any = types.is_any(expr.ty);

    if slot_any && !source_any {
        return emit_expr(ctx, expr, GenMode::BOXED);
    }
    if source_any && !slot_any {
        let boxed = emit_expr(ctx, expr, GenMode::BOXED)?;
        return Ok(ctx.boxed_to_repr(boxed, slot, Repr::Native));
    }
    emit_expr(ctx, expr, GenMode::NATIVE)
}

/// `lhs = rhs`
pub(crate) fn emit_assign_expr(
    ctx: &mut CodegenContext<'_>,
    lhs: &Expr,
    rhs: &Expr,
    mode: GenMode,
) -> EmitResult {
    let target = lhs.strip_ref().ty;
    emit_assign(ctx, lhs, &Rhs::Expr { expr: rhs, target }, mode)
}

fn emit_assign(ctx: &mut CodegenContext<'_>, lhs: &Expr, rhs: &Rhs<'_>, mode: GenMode) -> EmitResult {
    let lhs = lhs.strip_ref();

    match &lhs.kind {
        ExprKind::Name(id) => emit_name_assign(ctx, id, rhs, mode),
        ExprKind::Index { aggr, indices } => {
            emit_index_assign(ctx, lhs.ty, aggr, indices, rhs, mode)
        }
        ExprKind::Field { record, field } => {
            emit_field_assign(ctx, lhs.ty, record, *field, rhs, mode)
        }
        ExprKind::List(targets) => emit_list_assign(ctx, targets, rhs),
        _ => Err(CodegenError::BadAssignTarget {
            kind: lhs.kind_name(),
        }),
    }
}

fn emit_name_assign(
    ctx: &mut CodegenContext<'_>,
    id: &Ident,
    rhs: &Rhs<'_>,
    mode: GenMode,
) -> EmitResult {
    if !id.is_global() {
        let name = canonicalize(&id.name);
        let value = rhs.native(ctx)?;
        if mode.top_level {
            return Ok(format!("{name} = {value}"));
        }
        return Ok(ctx.native_to_repr(format!("({name} = {value})"), id.ty, mode.repr));
    }

    let gn = ctx.global_storage(&id.name)?;
    let value = rhs.boxed(ctx)?;

    if ctx.types.as_func(id.ty).is_some_and(FuncType::is_event) {
        // Binding an event handler also links the global to its event slot.
        let gen = format!("set_event__CPP({gn}, {value}, {gn}_ev)");
        if mode.top_level {
            return Ok(gen);
        }
        return Ok(ctx.boxed_to_repr(gen, id.ty, mode.repr));
    }

    if mode.top_level {
        return Ok(format!("{gn}->SetVal({value})"));
    }

    let gen = format!("set_global__CPP({gn}, {value})");
    Ok(ctx.boxed_to_repr(gen, id.ty, mode.repr))
}

fn emit_index_assign(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    aggr: &Expr,
    indices: &[Expr],
    rhs: &Rhs<'_>,
    mode: GenMode,
) -> EmitResult {
    let aggr = emit_expr(ctx, aggr, GenMode::BOXED)?;
    let index = emit_list(ctx, indices, Repr::Boxed, false)?;
    let value = rhs.boxed(ctx)?;

    let gen = format!("assign_to_index__CPP({aggr}, index_val__CPP({{{index}}}), {value})");
    if mode.top_level {
        return Ok(gen);
    }
    Ok(ctx.boxed_to_repr(gen, ty, mode.repr))
}

fn emit_field_assign(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    record: &Expr,
    field: usize,
    rhs: &Rhs<'_>,
    mode: GenMode,
) -> EmitResult {
    let rec = emit_expr(ctx, record, GenMode::BOXED)?;
    let offset = ctx.field_offset(record.ty, field)?;
    let value = rhs.boxed(ctx)?;

    if mode.top_level {
        return Ok(format!("{rec}->Assign({offset}, {value})"));
    }

    let gen = format!("assign_field__CPP({rec}, {offset}, {value})");
    Ok(ctx.boxed_to_repr(gen, ty, mode.repr))
}

/// `[a, b] = l`: one assignment per name, each reading its slot of `l`.
fn emit_list_assign(ctx: &mut CodegenContext<'_>, targets: &[Expr], rhs: &Rhs<'_>) -> EmitResult {
    let source = match rhs {
        Rhs::Expr { expr, .. } if matches!(expr.strip_ref().kind, ExprKind::Name(_)) => *expr,
        _ => return Err(CodegenError::CompoundMultiAssign { side: "right" }),
    };

    let mut parts = Vec::with_capacity(targets.len());
    for (i, target) in targets.iter().enumerate() {
        let ExprKind::Name(id) = &target.strip_ref().kind else {
            return Err(CodegenError::CompoundMultiAssign { side: "left" });
        };

        let slot = emit_expr(ctx, source, GenMode::DONT_CARE)? + &format!("->AsListVal()->Idx({i})");

        if id.is_global() {
            let gn = ctx.global_storage(&id.name)?;
            parts.push(format!("{gn}->SetVal({slot})"));
        } else {
            let value = ctx.boxed_to_repr(slot, id.ty, Repr::Native);
            parts.push(format!("{} = {value}", canonicalize(&id.name)));
        }
    }

    Ok(format!("({})", parts.join(", ")))
}

/// `++x` / `--x`
pub(crate) fn emit_incr_decr(
    ctx: &mut CodegenContext<'_>,
    expr: &Expr,
    operand: &Expr,
    is_incr: bool,
    mode: GenMode,
) -> EmitResult {
    let target = operand.strip_ref();

    if let Some(name) = native_local(ctx, target) {
        let op = if is_incr { "++" } else { "--" };
        if mode.top_level {
            return Ok(format!("{op}{name}"));
        }
        return Ok(ctx.native_to_repr(format!("({op}{name})"), expr.ty, mode.repr));
    }

    let one = if ctx.types.internal_type(target.ty) == InternalType::Int {
        Expr::constant(Literal::Int(1), TypeId::INT)
    } else {
        Expr::constant(Literal::Count(1), TypeId::COUNT)
    };
    let op = if is_incr { BinaryOp::Add } else { BinaryOp::Sub };

    tracing::debug!(
        target = target.kind_name(),
        op = op.symbol(),
        "rewriting increment as assignment"
    );

    let (temps, lvalue) = hoist_lvalue(ctx, target)?;
    let assign = Expr::assign(lvalue.clone(), Expr::binary(op, lvalue.clone(), one, target.ty));
    let stmt = emit_expr(ctx, &assign, GenMode::top_level(Repr::DontCare))?;

    if mode.top_level {
        return Ok(with_temps(&temps, stmt, None));
    }

    let value = emit_expr(ctx, &lvalue, mode.as_nested())?;
    if temps.is_empty() {
        return Ok(format!("({stmt}, {value})"));
    }
    Ok(with_temps(&temps, stmt, Some(value)))
}

/// `lhs += rhs`
pub(crate) fn emit_add_to(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    lhs: &Expr,
    rhs: &Expr,
    mode: GenMode,
) -> EmitResult {
    let types = ctx.types;

    if types.is_vector(ty) {
        let vec = emit_expr(ctx, lhs, GenMode::BOXED)?;
        let elem = emit_expr(ctx, rhs, GenMode::BOXED)?;
        let gen = format!("vector_append__CPP({vec}, {elem})");
        return Ok(ctx.boxed_to_repr(gen, ty, mode.repr));
    }

    let target = lhs.strip_ref();

    if matches!(types.get(ty), TypeData::String) && is_local_name(target) {
        let concat = string_concat(ctx, target, rhs)?;
        return emit_assign(ctx, target, &Rhs::Code(concat), mode);
    }

    // `s += t` on sets is union.
    let op = if types.is_set(ty) {
        BinaryOp::BitOr
    } else {
        BinaryOp::Add
    };
    emit_compound(ctx, ty, target, op, rhs, mode)
}

/// `lhs -= rhs`
pub(crate) fn emit_remove_from(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    lhs: &Expr,
    rhs: &Expr,
    mode: GenMode,
) -> EmitResult {
    emit_compound(ctx, ty, lhs.strip_ref(), BinaryOp::Sub, rhs, mode)
}

/// `x op= y`: in place on a native local, otherwise `x = x op y`.
fn emit_compound(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    target: &Expr,
    op: BinaryOp,
    rhs: &Expr,
    mode: GenMode,
) -> EmitResult {
    if let Some(name) = native_local(ctx, target) {
        let value = emit_expr(ctx, rhs, GenMode::NATIVE)?;
        let gen = format!("{name} {}= {value}", op.symbol());
        if mode.top_level {
            return Ok(gen);
        }
        return Ok(ctx.native_to_repr(format!("({gen})"), ty, mode.repr));
    }

    tracing::debug!(
        target = target.kind_name(),
        op = op.symbol(),
        "rewriting compound assignment"
    );

    let (temps, lvalue) = hoist_lvalue(ctx, target)?;
    let new_value = Expr::binary(op, lvalue.clone(), rhs.clone(), target.ty);
    let assign = Expr::assign(lvalue.clone(), new_value);

    if temps.is_empty() {
        return emit_expr(ctx, &assign, mode);
    }

    let stmt = emit_expr(ctx, &assign, GenMode::top_level(Repr::DontCare))?;
    if mode.top_level {
        return Ok(with_temps(&temps, stmt, None));
    }
    let value = emit_expr(ctx, &lvalue, mode.as_nested())?;
    Ok(with_temps(&temps, stmt, Some(value)))
}

/// C++ name of `target` if it is a local with a native representation.
fn native_local(ctx: &CodegenContext<'_>, target: &Expr) -> Option<String> {
    match &target.kind {
        ExprKind::Name(id) if !id.is_global() && ctx.types.is_native(id.ty) => {
            Some(canonicalize(&id.name))
        }
        _ => None,
    }
}

fn is_local_name(target: &Expr) -> bool {
    matches!(&target.kind, ExprKind::Name(id) if !id.is_global())
}

/// A temporary: its C++ name and initializer.
type Temp = (String, String);

/// Bind the non-trivial parts of an index or field target to temporaries.
///
/// Returns the bindings and a copy of `target` that reads them instead, so
/// it can be both read and written without re-evaluating those parts.
fn hoist_lvalue(ctx: &mut CodegenContext<'_>, target: &Expr) -> Result<(Vec<Temp>, Expr), CodegenError> {
    let mut temps = Vec::new();

    let kind = match &target.kind {
        ExprKind::Field { record, field } => ExprKind::Field {
            record: Box::new(hoist(ctx, record, &mut temps)?),
            field: *field,
        },
        ExprKind::Index { aggr, indices } => {
            let aggr = hoist(ctx, aggr, &mut temps)?;
            let mut hoisted = Vec::with_capacity(indices.len());
            for index in indices {
                hoisted.push(hoist(ctx, index, &mut temps)?);
            }
            ExprKind::Index {
                aggr: Box::new(aggr),
                indices: hoisted,
            }
        }
        _ => return Ok((temps, target.clone())),
    };

    Ok((temps, Expr::new(kind, target.ty)))
}

fn hoist(ctx: &mut CodegenContext<'_>, part: &Expr, temps: &mut Vec<Temp>) -> Result<Expr, CodegenError> {
    if matches!(part.kind, ExprKind::Name(_) | ExprKind::Const(_)) {
        return Ok(part.clone());
    }

    let init = emit_expr(ctx, part, GenMode::NATIVE)?;
    let temp = ctx.fresh_temp();
    let cpp_name = canonicalize(&temp);
    tracing::debug!(temp = %cpp_name, part = part.kind_name(), "hoisted lvalue operand");

    temps.push((cpp_name, init));
    Ok(Expr::name(Ident::local(temp, part.ty)))
}

/// Wrap `stmt` in an immediately invoked lambda that first binds `temps`,
/// optionally yielding `value`.
fn with_temps(temps: &[Temp], stmt: String, value: Option<String>) -> String {
    if temps.is_empty() {
        return stmt;
    }

    let mut body = String::new();
    for (name, init) in temps {
        body.push_str(&format!("auto {name} = {init}; "));
    }
    body.push_str(&stmt);
    body.push(';');
    if let Some(value) = value {
        body.push_str(&format!(" return {value};"));
    }

    format!("[&]() {{ {body} }}()")
}
