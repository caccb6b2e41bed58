//! Aggregates: constructors, element access, and vectorized operators.

use sprig_ir::{Attr, BinaryOp, Expr, ExprKind, FieldInit, TableEntry, TypeData, TypeId, UnaryOp};

use crate::context::CodegenContext;
use crate::error::{CodegenError, EmitResult};
use crate::expr::{emit_expr, emit_list};
use crate::repr::{GenMode, Repr};

// Vectorized operators

/// Elementwise unary operator over a vector operand in native form.
pub(crate) fn emit_vector_unary(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    op: UnaryOp,
    operand: &str,
) -> String {
    let gen = format!("vec_op_{}__CPP({operand})", op.vec_name());
    coerce_vector_result(ctx, ty, gen)
}

/// Elementwise binary operator. `lhs_ty` selects the string-specialized
/// primitive for vectors of strings.
pub(crate) fn emit_vector_binary(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    op: BinaryOp,
    lhs_ty: TypeId,
    lhs: &str,
    rhs: &str,
) -> String {
    let types = ctx.types;
    let name = op.vec_name();

    if types.is_vector(lhs_ty) && types.yield_type(lhs_ty) == Some(TypeId::STRING) {
        return format!("str_vec_op_{name}__CPP({lhs}, {rhs})");
    }

    let gen = format!("vec_op_{name}__CPP({lhs}, {rhs})");
    coerce_vector_result(ctx, ty, gen)
}

/// The elementwise primitives yield arithmetic or string elements; any
/// other declared yield (e.g. bool for comparisons) is retagged.
fn coerce_vector_result(ctx: &mut CodegenContext<'_>, ty: TypeId, gen: String) -> String {
    let types = ctx.types;
    let keeps_repr = types
        .yield_type(ty)
        .is_some_and(|y| types.is_arithmetic(y) || matches!(types.get(y), TypeData::String));

    if keeps_repr {
        return gen;
    }

    let tn = ctx.type_name(ty);
    format!("vector_coerce_to__CPP({gen}, {tn})")
}

/// `c ? a : b`, elementwise when `c` is a vector.
pub(crate) fn emit_cond(
    ctx: &mut CodegenContext<'_>,
    cond: &Expr,
    then_expr: &Expr,
    else_expr: &Expr,
    repr: Repr,
) -> EmitResult {
    let g1 = emit_expr(ctx, cond, GenMode::NATIVE)?;
    let g2 = emit_expr(ctx, then_expr, GenMode::nested(repr))?;
    let g3 = emit_expr(ctx, else_expr, GenMode::nested(repr))?;

    if ctx.types.is_vector(cond.ty) {
        return Ok(format!("vector_select__CPP({g1}, {g2}, {g3})"));
    }

    Ok(format!("({g1}) ? ({g2}) : ({g3})"))
}

// Element access

/// `r$f`
pub(crate) fn emit_field(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    record: &Expr,
    field: usize,
    repr: Repr,
) -> EmitResult {
    let rec = emit_expr(ctx, record, GenMode::BOXED)?;
    let offset = ctx.field_offset(record.ty, field)?;
    let gen = format!("field_access__CPP({rec}, {offset})");
    Ok(ctx.boxed_to_repr(gen, ty, repr))
}

/// `r?$f`
pub(crate) fn emit_has_field(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    record: &Expr,
    field: usize,
    repr: Repr,
) -> EmitResult {
    let rec = emit_expr(ctx, record, GenMode::DONT_CARE)?;
    let offset = ctx.field_offset(record.ty, field)?;
    let gen = format!("({rec}->GetField({offset}) != nullptr)");
    Ok(ctx.native_to_repr(gen, ty, repr))
}

/// `aggr[i, ...]`
pub(crate) fn emit_index(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    aggr: &Expr,
    indices: &[Expr],
    repr: Repr,
) -> EmitResult {
    let types = ctx.types;

    let gen = match (types.get(aggr.ty), indices) {
        (TypeData::Table { .. }, _) => {
            let table = emit_expr(ctx, aggr, GenMode::NATIVE)?;
            let index = emit_list(ctx, indices, Repr::Boxed, false)?;
            format!("index_table__CPP({table}, {{{index}}})")
        }
        (TypeData::Vector(_), [first, last]) => {
            let vec = emit_expr(ctx, aggr, GenMode::BOXED)?;
            let first = emit_expr(ctx, first, GenMode::NATIVE)?;
            let last = emit_expr(ctx, last, GenMode::NATIVE)?;
            format!("index_slice({vec}.get(), {first}, {last})")
        }
        (TypeData::Vector(_), [index]) => {
            let vec = emit_expr(ctx, aggr, GenMode::NATIVE)?;
            let index = emit_expr(ctx, index, GenMode::NATIVE)?;
            format!("index_vec__CPP({vec}, {index})")
        }
        (TypeData::String, _) => {
            let s = emit_expr(ctx, aggr, GenMode::NATIVE)?;
            let index = emit_list(ctx, indices, Repr::Boxed, false)?;
            format!("index_string__CPP({s}, {{{index}}})")
        }
        (data, _) => {
            return Err(CodegenError::BadIndex {
                ty: data.kind_name(),
            })
        }
    };

    Ok(ctx.boxed_to_repr(gen, ty, repr))
}

// Constructors

/// `[$a = x, $b = y]`
pub(crate) fn emit_record_constructor(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    inits: &[FieldInit],
) -> EmitResult {
    let mut vals = Vec::with_capacity(inits.len());
    for init in inits {
        vals.push(emit_expr(ctx, &init.value, GenMode::BOXED)?);
    }

    let tn = ctx.type_name(ty);
    Ok(format!(
        "record_constructor__CPP({{{}}}, cast_intrusive<RecordType>({tn}))",
        vals.join(", ")
    ))
}

/// `set(a, b, ...)`
pub(crate) fn emit_set_constructor(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    elems: &[Expr],
    attrs: &[Attr],
) -> EmitResult {
    let elems = emit_list(ctx, elems, Repr::Boxed, true)?;
    let tn = ctx.type_name(ty);
    let (tags, vals) = emit_attrs(ctx, attrs)?;
    Ok(format!(
        "set_constructor__CPP({}, cast_intrusive<TableType>({tn}), {tags}, {vals})",
        braced(&elems)
    ))
}

/// `table([i] = v, ...)`
pub(crate) fn emit_table_constructor(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    entries: &[TableEntry],
    attrs: &[Attr],
) -> EmitResult {
    let mut indices = Vec::with_capacity(entries.len());
    let mut vals = Vec::with_capacity(entries.len());

    for entry in entries {
        let index = match &entry.index.kind {
            ExprKind::List(parts) => {
                let parts = emit_list(ctx, parts, Repr::Boxed, false)?;
                format!("index_val__CPP({{{parts}}})")
            }
            _ => emit_expr(ctx, &entry.index, GenMode::BOXED)?,
        };
        indices.push(index);
        vals.push(emit_expr(ctx, &entry.value, GenMode::BOXED)?);
    }

    let tn = ctx.type_name(ty);
    let (tags, attr_vals) = emit_attrs(ctx, attrs)?;
    Ok(format!(
        "table_constructor__CPP({{{}}}, {{{}}}, cast_intrusive<TableType>({tn}), {tags}, {attr_vals})",
        indices.join(", "),
        vals.join(", ")
    ))
}

/// `vector(a, b, ...)`
pub(crate) fn emit_vector_constructor(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    elems: &[Expr],
) -> EmitResult {
    let elems = emit_list(ctx, elems, Repr::Boxed, false)?;
    let tn = ctx.type_name(ty);
    Ok(format!(
        "vector_constructor__CPP({{{elems}}}, cast_intrusive<VectorType>({tn}))"
    ))
}

/// Attribute tags and their (boxed, possibly null) values as two parallel
/// initializer lists.
fn emit_attrs(ctx: &mut CodegenContext<'_>, attrs: &[Attr]) -> Result<(String, String), CodegenError> {
    let mut tags = Vec::with_capacity(attrs.len());
    let mut vals = Vec::with_capacity(attrs.len());

    for attr in attrs {
        tags.push(attr.tag.cpp_name().to_owned());
        vals.push(match &attr.value {
            Some(value) => emit_expr(ctx, value, GenMode::BOXED)?,
            None => "nullptr".to_owned(),
        });
    }

    Ok((braced(&tags.join(", ")), braced(&vals.join(", "))))
}

fn braced(items: &str) -> String {
    if items.is_empty() {
        "{}".to_owned()
    } else {
        format!("{{ {items} }}")
    }
}
