//! Calls, lambdas, and event scheduling.
//!
//! A call to a function compiled to C++ (in this unit or an earlier one)
//! is a direct call with native arguments. Everything else goes through
//! `invoke__CPP` with boxed arguments and resolves the callee at run time.

use sprig_ir::{canonicalize, Expr, ExprKind, LambdaExpr, Param, ScheduleExpr, TypeData, TypeId};

use crate::assign::emit_for_slot;
use crate::context::CodegenContext;
use crate::error::{CodegenError, EmitResult};
use crate::expr::{emit_expr, emit_list};
use crate::repr::{val_class, GenMode, Repr};

/// `f(args)`
pub(crate) fn emit_call(
    ctx: &mut CodegenContext<'_>,
    ty: TypeId,
    func: &Expr,
    args: &[Expr],
    repr: Repr,
) -> EmitResult {
    let types = ctx.types;
    let env = ctx.env;
    let callee = func.strip_ref();

    let ft = types
        .as_func(callee.ty)
        .ok_or_else(|| CodegenError::NotCallable {
            ty: types.get(callee.ty).kind_name(),
        })?;

    let callee_gen = match &callee.kind {
        ExprKind::Name(id) if id.is_global() => {
            if let Some(fname) = env.compiled_name(&id.name) {
                let frame = ctx.config.frame_var.clone();
                let gen = if args.is_empty() {
                    format!("{fname}({frame})")
                } else {
                    let args = emit_args(ctx, &ft.params, args)?;
                    format!("{fname}({args}, {frame})")
                };
                return Ok(ctx.native_to_repr(gen, ty, repr));
            }

            // Builtins are held as `Func*` under their own registry entry,
            // even when a script global shares the name.
            match env.builtin_storage(&id.name) {
                Some(storage) => storage.to_owned(),
                None => emit_expr(ctx, callee, GenMode::DONT_CARE)? + "->AsFunc()",
            }
        }
        ExprKind::Name(_) => emit_expr(ctx, callee, GenMode::DONT_CARE)? + "->AsFunc()",
        _ => format!("({})->AsFunc()", emit_expr(ctx, callee, GenMode::DONT_CARE)?),
    };

    let args = emit_list(ctx, args, Repr::Boxed, false)?;
    let invoker = format!(
        "invoke__CPP({callee_gen}, {{{args}}}, {})",
        ctx.config.frame_var
    );

    Ok(ctx.boxed_to_repr(invoker, ty, repr))
}

/// Positional arguments of a direct call, each in the form its parameter
/// is declared with.
fn emit_args(ctx: &mut CodegenContext<'_>, params: &[Param], args: &[Expr]) -> EmitResult {
    let mut parts = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
        let slot = params.get(i).map_or(arg.ty, |p| p.ty);
        parts.push(emit_for_slot(ctx, arg, slot)?);
    }
    Ok(parts.join(", "))
}

/// `schedule when { handler(args) }`
pub(crate) fn emit_schedule(ctx: &mut CodegenContext<'_>, sched: &ScheduleExpr) -> EmitResult {
    ctx.register_event(&sched.handler);

    let mut when = emit_expr(ctx, &sched.when, GenMode::NATIVE)?;
    if matches!(ctx.types.get(sched.when.ty), TypeData::Interval) {
        when = format!("{when} + {}", ctx.config.network_time);
    }

    let gn = ctx.global_storage(&sched.handler)?;
    let args = emit_list(ctx, &sched.args, Repr::Boxed, false)?;
    let args = if args.is_empty() {
        "{}".to_owned()
    } else {
        format!("{{ {args} }}")
    };

    Ok(format!("schedule__CPP({when}, {gn}_ev, {args})"))
}

/// A lambda literal: its closure state wrapped in a callable value.
///
/// Captured identifiers are passed by reference, except non-native values
/// captured with `copy`, which are cloned.
pub(crate) fn emit_lambda(ctx: &mut CodegenContext<'_>, ty: TypeId, lambda: &LambdaExpr) -> EmitResult {
    let types = ctx.types;
    ctx.register_lambda(&lambda.name);

    let class = format!("{}_lb_cl", canonicalize(&lambda.name));
    let captures = types.as_func(ty).and_then(|ft| ft.captures.as_deref());

    let mut cl_args = string_literal(&class);
    for id in &lambda.outer_ids {
        let mut arg = canonicalize(&id.name);

        let deep_copy = captures
            .is_some_and(|caps| caps.iter().any(|c| c.name == id.name && c.deep_copy));
        if deep_copy && !types.is_native(id.ty) {
            arg = format!("cast_intrusive<{}>({arg}->Clone())", val_class(types.get(id.ty)));
        }

        cl_args.push_str(", ");
        cl_args.push_str(&arg);
    }

    let tn = ctx.type_name(ty);
    let body = format!("make_intrusive<{class}>({cl_args})");
    let func = format!(
        "make_intrusive<CPPLambdaFunc>({}, cast_intrusive<FuncType>({tn}), {body})",
        string_literal(&lambda.name)
    );
    Ok(format!("make_intrusive<FuncVal>({func})"))
}

/// Quote `s` as a C++ string literal.
fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
