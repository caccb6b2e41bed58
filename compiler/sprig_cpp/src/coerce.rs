//! Coercions, casts, and type tests.
//!
//! Every coercion between structurally identical types is elided: the
//! operand is emitted in the requested form, byte for byte as if the
//! coercion node were absent.

use sprig_ir::{Expr, InternalType, TypeData, TypeId};

use crate::context::CodegenContext;
use crate::error::{CodegenError, EmitResult};
use crate::expr::emit_expr;
use crate::repr::{GenMode, Repr};

/// Numeric conversion between int, count and double (or vectors of them).
pub(crate) fn emit_arith_coerce(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    operand: &Expr,
    mode: GenMode,
) -> EmitResult {
    let types = ctx.types;
    if types.same_type(ty, operand.ty) {
        return emit_expr(ctx, operand, mode);
    }

    let (is_vec, target) = match types.get(ty) {
        TypeData::Vector(elem) => (true, *elem),
        _ => (false, ty),
    };

    let cast = match types.internal_type(target) {
        InternalType::Int => "bro_int_t",
        InternalType::Unsigned => "bro_uint_t",
        InternalType::Double => "double",
        _ => {
            return Err(CodegenError::BadCoercion {
                ty: types.get(target).kind_name(),
            })
        }
    };

    let gen = emit_expr(ctx, operand, GenMode::NATIVE)?;

    if is_vec {
        let tn = ctx.type_name(ty);
        return Ok(format!("vec_coerce_{cast}__CPP({gen}, {tn})"));
    }

    Ok(ctx.native_to_repr(format!("{cast}({gen})"), ty, mode.repr))
}

/// Rebuild a record under another record type.
///
/// `map` gives, for each destination field, the index of the source field
/// that feeds it (or -1 when the destination field is left unset).
pub(crate) fn emit_record_coerce(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    operand: &Expr,
    map: &[i32],
    mode: GenMode,
) -> EmitResult {
    if ctx.types.same_type(ty, operand.ty) {
        return emit_expr(ctx, operand, mode);
    }

    let gen = emit_expr(ctx, operand, GenMode::BOXED)?;
    let tn = ctx.type_name(ty);
    Ok(format!(
        "coerce_to_record(cast_intrusive<RecordType>({tn}), {gen}.get(), {})",
        int_vector(map)
    ))
}

pub(crate) fn emit_table_coerce(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    operand: &Expr,
    mode: GenMode,
) -> EmitResult {
    if ctx.types.same_type(ty, operand.ty) {
        return emit_expr(ctx, operand, mode);
    }

    let gen = emit_expr(ctx, operand, GenMode::BOXED)?;
    let tn = ctx.type_name(ty);
    Ok(format!("table_coerce__CPP({gen}, {tn})"))
}

pub(crate) fn emit_vector_coerce(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    operand: &Expr,
    mode: GenMode,
) -> EmitResult {
    if ctx.types.same_type(ty, operand.ty) {
        return emit_expr(ctx, operand, mode);
    }

    let gen = emit_expr(ctx, operand, GenMode::BOXED)?;
    let tn = ctx.type_name(ty);
    Ok(format!("vector_coerce__CPP({gen}, {tn})"))
}

/// `x as T`
pub(crate) fn emit_cast(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    operand: &Expr,
    repr: Repr,
) -> EmitResult {
    let gen = emit_expr(ctx, operand, GenMode::BOXED)?;
    let tn = ctx.type_name(ty);
    Ok(ctx.boxed_to_repr(format!("cast_value_to_type__CPP({gen}, {tn})"), ty, repr))
}

/// `x is T`
pub(crate) fn emit_is(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    operand: &Expr,
    test_ty: TypeId,
    repr: Repr,
) -> EmitResult {
    let gen = emit_expr(ctx, operand, GenMode::BOXED)?;
    let tn = ctx.type_name(test_ty);
    let gen = format!("can_cast_value_to_type({gen}.get(), {tn}.get())");
    Ok(ctx.native_to_repr(gen, ty, repr))
}

/// `{ 0, 2, -1 }`
fn int_vector(values: &[i32]) -> String {
    if values.is_empty() {
        return "{}".to_owned();
    }
    let items: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("{{ {} }}", items.join(", "))
}
