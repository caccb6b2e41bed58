//! Unary and binary operators, membership, and size-of.
//!
//! Scalar operators dispatch on the storage family of the left operand.
//! Numeric families map onto C++ operators, except division and modulo
//! which go through runtime helpers (`idiv__CPP`, `umod__CPP`, ...) that
//! trap on a zero divisor. The other families route through methods of
//! their boxed values.

use sprig_ir::{
    canonicalize, BinaryOp, Expr, ExprKind, InternalType, TypeData, TypeId, UnaryOp,
};

use crate::aggregate::{emit_vector_binary, emit_vector_unary};
use crate::context::CodegenContext;
use crate::error::{CodegenError, EmitResult};
use crate::expr::emit_expr;
use crate::repr::{GenMode, Repr};

pub(crate) fn emit_unary(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    op: UnaryOp,
    operand: &Expr,
    repr: Repr,
) -> EmitResult {
    let gen = emit_expr(ctx, operand, GenMode::NATIVE)?;

    if ctx.types.is_vector(ty) {
        return Ok(emit_vector_unary(ctx, ty, op, &gen));
    }

    Ok(ctx.native_to_repr(format!("{}({gen})", op.symbol()), ty, repr))
}

pub(crate) fn emit_binary(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    repr: Repr,
) -> EmitResult {
    let types = ctx.types;

    if types.is_vector(ty) {
        let g1 = emit_expr(ctx, lhs, GenMode::NATIVE)?;
        let g2 = emit_expr(ctx, rhs, GenMode::NATIVE)?;
        return Ok(emit_vector_binary(ctx, ty, op, lhs.ty, &g1, &g2));
    }

    if types.is_set(lhs.ty) {
        return emit_binary_set(ctx, ty, op, lhs, rhs, repr);
    }

    let flavor = match types.internal_type(lhs.ty) {
        InternalType::Int => "i",
        InternalType::Unsigned => "u",
        InternalType::Double => "f",
        InternalType::String => return emit_binary_string(ctx, ty, op, lhs, rhs, repr),
        InternalType::Addr => return emit_binary_addr(ctx, ty, op, lhs, rhs, repr),
        InternalType::Subnet => return emit_binary_subnet(ctx, ty, op, lhs, rhs, repr),
        InternalType::Void | InternalType::Other => {
            if matches!(types.get(lhs.ty), TypeData::Pattern) {
                return emit_binary_pattern(ctx, ty, op, lhs, rhs, repr);
            }
            return Err(unsupported(ctx, op, lhs.ty));
        }
    };

    let g1 = emit_expr(ctx, lhs, GenMode::NATIVE)?;
    let g2 = emit_expr(ctx, rhs, GenMode::NATIVE)?;

    let gen = match op {
        BinaryOp::Div => format!("{flavor}div__CPP({g1}, {g2})"),
        BinaryOp::Mod => format!("{flavor}mod__CPP({g1}, {g2})"),
        _ => format!("({g1}){}({g2})", op.symbol()),
    };

    Ok(ctx.native_to_repr(gen, ty, repr))
}

/// `==` / `!=`, with the families whose equality is not a plain compare
/// handled ahead of [`emit_binary`].
pub(crate) fn emit_eq(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    repr: Repr,
) -> EmitResult {
    let types = ctx.types;

    if types.is_vector(ty) {
        let g1 = emit_expr(ctx, lhs, GenMode::NATIVE)?;
        let g2 = emit_expr(ctx, rhs, GenMode::NATIVE)?;
        return Ok(emit_vector_binary(ctx, ty, op, lhs.ty, &g1, &g2));
    }

    let negated = if op == BinaryOp::Ne { "! " } else { "" };

    // The front end may leave a pattern on either side of a string compare.
    let (lhs, rhs) = match (types.get(lhs.ty), types.get(rhs.ty)) {
        (TypeData::String, TypeData::Pattern) => (rhs, lhs),
        _ => (lhs, rhs),
    };

    match types.get(lhs.ty) {
        TypeData::Pattern => {
            let pat = emit_expr(ctx, lhs, GenMode::DONT_CARE)?;
            let s = emit_expr(ctx, rhs, GenMode::DONT_CARE)?;
            let gen = format!("{negated}{pat}->MatchExactly({s}->AsString())");
            Ok(ctx.native_to_repr(gen, ty, repr))
        }
        TypeData::Func(_) => {
            let f1 = emit_expr(ctx, lhs, GenMode::DONT_CARE)?;
            let f2 = emit_expr(ctx, rhs, GenMode::DONT_CARE)?;
            let gen = format!("{negated}({f1}->AsFunc()=={f2}->AsFunc())");
            Ok(ctx.native_to_repr(gen, ty, repr))
        }
        _ => emit_binary(ctx, ty, op, lhs, rhs, repr),
    }
}

fn emit_binary_set(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    repr: Repr,
) -> EmitResult {
    // `a >= b` is `b <= a`, and likewise for `>`.
    let (op, lhs, rhs) = match op {
        BinaryOp::Ge => (BinaryOp::Le, rhs, lhs),
        BinaryOp::Gt => (BinaryOp::Lt, rhs, lhs),
        _ => (op, lhs, rhs),
    };

    let v1 = emit_expr(ctx, lhs, GenMode::DONT_CARE)? + "->AsTableVal()";
    let v2 = emit_expr(ctx, rhs, GenMode::DONT_CARE)? + "->AsTableVal()";

    let gen = match op {
        BinaryOp::BitAnd => format!("{v1}->Intersection(*{v2})"),
        BinaryOp::BitOr => format!("{v1}->Union({v2})"),
        BinaryOp::Sub => format!("{v1}->TakeOut({v2})"),
        BinaryOp::Eq => format!("{v1}->EqualTo(*{v2})"),
        BinaryOp::Ne => format!("! {v1}->EqualTo(*{v2})"),
        BinaryOp::Le => format!("{v1}->IsSubsetOf(*{v2})"),
        BinaryOp::Lt => {
            // Each operand appears twice; computed ones are bound first.
            let mut binds = Vec::new();
            let v1 = bind_once(ctx, lhs, v1, &mut binds);
            let v2 = bind_once(ctx, rhs, v2, &mut binds);
            let test = format!("({v1}->IsSubsetOf(*{v2}) && {v1}->Size() < {v2}->Size())");
            if binds.is_empty() {
                test
            } else {
                format!("[&]() {{ {} return {test}; }}()", binds.join(" "))
            }
        }
        _ => return Err(unsupported(ctx, op, lhs.ty)),
    };

    Ok(ctx.native_to_repr(gen, ty, repr))
}

/// Name `gen` with a temporary unless `operand` is a plain name or constant.
fn bind_once(
    ctx: &mut CodegenContext<'_>,
    operand: &Expr,
    gen: String,
    binds: &mut Vec<String>,
) -> String {
    if matches!(operand.kind, ExprKind::Name(_) | ExprKind::Const(_)) {
        return gen;
    }
    let temp = canonicalize(&ctx.fresh_temp());
    binds.push(format!("auto {temp} = {gen};"));
    temp
}

fn emit_binary_string(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    repr: Repr,
) -> EmitResult {
    let gen = match op {
        BinaryOp::Add => string_concat(ctx, lhs, rhs)?,
        BinaryOp::Lt
        | BinaryOp::Le
        | BinaryOp::Ge
        | BinaryOp::Gt
        | BinaryOp::Eq
        | BinaryOp::Ne => {
            let v1 = emit_expr(ctx, lhs, GenMode::DONT_CARE)? + "->AsString()";
            let v2 = emit_expr(ctx, rhs, GenMode::DONT_CARE)? + "->AsString()";
            format!("(Bstr_cmp({v1}, {v2}) {} 0)", op.symbol())
        }
        _ => return Err(unsupported(ctx, op, lhs.ty)),
    };

    Ok(ctx.native_to_repr(gen, ty, repr))
}

/// Concatenation of two string operands; also used by `+=`.
pub(crate) fn string_concat(ctx: &mut CodegenContext<'_>, lhs: &Expr, rhs: &Expr) -> EmitResult {
    let v1 = emit_expr(ctx, lhs, GenMode::DONT_CARE)? + "->AsString()";
    let v2 = emit_expr(ctx, rhs, GenMode::DONT_CARE)? + "->AsString()";
    Ok(format!("str_concat__CPP({v1}, {v2})"))
}

fn emit_binary_addr(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    repr: Repr,
) -> EmitResult {
    let v1 = emit_expr(ctx, lhs, GenMode::DONT_CARE)? + "->AsAddr()";

    // `a / n` masks an address down to a subnet of width `n`.
    if op == BinaryOp::Div {
        let width = emit_expr(ctx, rhs, GenMode::NATIVE)?;
        let gen = format!("addr_mask__CPP({v1}, {width})");
        return Ok(ctx.native_to_repr(gen, ty, repr));
    }

    let v2 = emit_expr(ctx, rhs, GenMode::DONT_CARE)? + "->AsAddr()";
    Ok(ctx.native_to_repr(format!("({v1}{}{v2})", op.symbol()), ty, repr))
}

fn emit_binary_subnet(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    repr: Repr,
) -> EmitResult {
    let v1 = emit_expr(ctx, lhs, GenMode::DONT_CARE)? + "->AsSubNet()";
    let v2 = emit_expr(ctx, rhs, GenMode::DONT_CARE)? + "->AsSubNet()";
    Ok(ctx.native_to_repr(format!("({v1}{}{v2})", op.symbol()), ty, repr))
}

fn emit_binary_pattern(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    repr: Repr,
) -> EmitResult {
    let matcher = match op {
        BinaryOp::BitAnd => "RE_Matcher_conjunction",
        BinaryOp::BitOr => "RE_Matcher_disjunction",
        _ => return Err(unsupported(ctx, op, lhs.ty)),
    };

    let v1 = emit_expr(ctx, lhs, GenMode::DONT_CARE)? + "->AsPattern()";
    let v2 = emit_expr(ctx, rhs, GenMode::DONT_CARE)? + "->AsPattern()";
    let gen = format!("make_intrusive<PatternVal>({matcher}({v1}, {v2}))");
    Ok(ctx.native_to_repr(gen, ty, repr))
}

/// `elem in container`.
pub(crate) fn emit_in(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    elem: &Expr,
    container: &Expr,
    repr: Repr,
) -> EmitResult {
    let types = ctx.types;

    let gen = match (types.get(elem.ty), types.get(container.ty)) {
        (TypeData::Pattern, _) => {
            let pat = emit_expr(ctx, elem, GenMode::DONT_CARE)?;
            let s = emit_expr(ctx, container, GenMode::DONT_CARE)?;
            format!("({pat})->MatchAnywhere({s}->AsString())")
        }
        (_, TypeData::String) => {
            let needle = emit_expr(ctx, elem, GenMode::DONT_CARE)?;
            let haystack = emit_expr(ctx, container, GenMode::DONT_CARE)?;
            format!("str_in__CPP({needle}->AsString(), {haystack}->AsString())")
        }
        (TypeData::Addr, TypeData::Subnet) => {
            let addr = emit_expr(ctx, elem, GenMode::BOXED)?;
            let net = emit_expr(ctx, container, GenMode::DONT_CARE)?;
            format!("({net})->Contains({addr}->Get())")
        }
        (_, TypeData::Vector(_)) => {
            let index = emit_expr(ctx, elem, GenMode::NATIVE)?;
            let vec = emit_expr(ctx, container, GenMode::DONT_CARE)?;
            format!("{vec}->Has({index})")
        }
        _ => {
            let index = emit_expr(ctx, elem, GenMode::BOXED)?;
            let aggr = emit_expr(ctx, container, GenMode::DONT_CARE)?;
            format!("({aggr}->Find(index_val__CPP({{{index}}})) ? true : false)")
        }
    };

    Ok(ctx.native_to_repr(gen, ty, repr))
}

/// `|x|`: absolute value for numbers, element count for containers.
pub(crate) fn emit_size(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    operand: &Expr,
    repr: Repr,
) -> EmitResult {
    let types = ctx.types;
    let gen = emit_expr(ctx, operand, GenMode::NATIVE)?;

    let gen = if matches!(types.get(operand.ty), TypeData::Bool) {
        format!("(({gen}) ? 1 : 0)")
    } else {
        match types.internal_type(operand.ty) {
            InternalType::Unsigned => gen,
            InternalType::Int => format!("iabs__CPP({gen})"),
            InternalType::Double => format!("fabs__CPP({gen})"),
            _ => return Ok(ctx.boxed_to_repr(format!("{gen}->SizeVal()"), ty, repr)),
        }
    };

    Ok(ctx.native_to_repr(gen, ty, repr))
}

fn unsupported(ctx: &CodegenContext<'_>, op: BinaryOp, ty: TypeId) -> CodegenError {
    CodegenError::UnsupportedOperands {
        op: op.symbol(),
        ty: ctx.types.get(ty).kind_name(),
    }
}
