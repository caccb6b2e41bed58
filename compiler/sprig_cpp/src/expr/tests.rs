#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use sprig_ir::{
    BinaryOp, Expr, ExprKind, FieldDecl, FuncFlavor, FuncType, Ident, Literal, ReducedKind,
    TypeId,
};

use crate::context::{ConstKind, PooledConst};
use crate::error::CodegenError;
use crate::repr::GenMode;
use crate::test_helpers::{bin, count, global, int, local, lower, lower_err, string, Fixture};

fn lit(lit: Literal, ty: TypeId) -> Expr {
    Expr::constant(lit, ty)
}

// Names

#[test]
fn locals_are_canonicalized() {
    let fx = Fixture::new();
    let mut ctx = fx.ctx();

    assert_eq!(lower(&mut ctx, &local("x", TypeId::INT), GenMode::NATIVE), "x_");
    assert_eq!(
        lower(&mut ctx, &local("n_conns", TypeId::COUNT), GenMode::BOXED),
        "val_mgr->Count(n__conns_)"
    );
    assert_eq!(
        lower(&mut ctx, &local("s", TypeId::STRING), GenMode::NATIVE),
        "s_"
    );
}

#[test]
fn global_variables_read_through_their_storage() {
    let mut fx = Fixture::new();
    fx.env.add_global_var("g", "g_gl");
    let mut ctx = fx.ctx();
    let g = global("g", TypeId::INT);

    assert_eq!(lower(&mut ctx, &g, GenMode::NATIVE), "g_gl->GetVal()->AsInt()");
    assert_eq!(lower(&mut ctx, &g, GenMode::DONT_CARE), "g_gl->GetVal()->AsInt()");
    assert_eq!(lower(&mut ctx, &g, GenMode::BOXED), "g_gl->GetVal()");
}

#[test]
fn global_type_names_wrap_the_type() {
    let mut fx = Fixture::new();
    let rec = fx.pool.record(Some("Info"), vec![FieldDecl::new("a", TypeId::INT)]);
    let tt = fx.pool.type_of(rec);
    fx.env.add_global_var("Info", "Info_gl");
    let mut ctx = fx.ctx();

    let e = Expr::name(Ident::global_type("Info", tt));
    assert_eq!(
        lower(&mut ctx, &e, GenMode::BOXED),
        "make_intrusive<TypeVal>(Info_gl->GetType(), true)"
    );
}

#[test]
fn global_functions_are_their_storage() {
    let mut fx = Fixture::new();
    let ft = fx
        .pool
        .func(FuncType::new(vec![], TypeId::VOID, FuncFlavor::Function));
    fx.env.add_global_func("done", "done_gl");
    let mut ctx = fx.ctx();

    for mode in [GenMode::NATIVE, GenMode::BOXED] {
        assert_eq!(lower(&mut ctx, &global("done", ft), mode), "done_gl");
    }
}

#[test]
fn builtins_resolve_when_no_global_matches() {
    let mut fx = Fixture::new();
    let ft = fx
        .pool
        .func(FuncType::new(vec![], TypeId::STRING, FuncFlavor::Function));
    fx.env.add_builtin("fmt", "fmt_bif");
    let mut ctx = fx.ctx();

    assert_eq!(lower(&mut ctx, &global("fmt", ft), GenMode::BOXED), "fmt_bif");
}

#[test]
fn unregistered_globals_are_errors() {
    let fx = Fixture::new();
    let mut ctx = fx.ctx();

    assert_eq!(
        lower_err(&mut ctx, &global("ghost", TypeId::INT), GenMode::NATIVE),
        CodegenError::UnknownGlobal {
            name: "ghost".to_owned(),
        }
    );
}

// Constants

#[test]
fn integer_constants() {
    let fx = Fixture::new();
    let mut ctx = fx.ctx();

    assert_eq!(lower(&mut ctx, &int(-5), GenMode::NATIVE), "-5");
    assert_eq!(lower(&mut ctx, &int(i64::MIN), GenMode::NATIVE), "INT64_MIN");
    assert_eq!(lower(&mut ctx, &int(7), GenMode::BOXED), "val_mgr->Int(7)");
    assert_eq!(
        lower(&mut ctx, &count(u64::MAX), GenMode::NATIVE),
        "18446744073709551615ULL"
    );
    assert_eq!(
        lower(&mut ctx, &count(9_223_372_036_854_775_807), GenMode::NATIVE),
        "9223372036854775807"
    );
    assert_eq!(
        lower(&mut ctx, &lit(Literal::Port(80), TypeId::PORT), GenMode::BOXED),
        "val_mgr->Port(80)"
    );
    assert_eq!(
        lower(&mut ctx, &lit(Literal::Bool(true), TypeId::BOOL), GenMode::BOXED),
        "val_mgr->Bool(true)"
    );
}

#[test]
fn floating_constants() {
    let fx = Fixture::new();
    let mut ctx = fx.ctx();
    let double = |d| lit(Literal::Double(d), TypeId::DOUBLE);

    assert_eq!(lower(&mut ctx, &double(1.5), GenMode::NATIVE), "1.5");
    assert_eq!(lower(&mut ctx, &double(2.0), GenMode::NATIVE), "2.0");
    assert_eq!(lower(&mut ctx, &double(f64::NAN), GenMode::NATIVE), "NAN");
    assert_eq!(lower(&mut ctx, &double(f64::INFINITY), GenMode::NATIVE), "INFINITY");
    assert_eq!(
        lower(&mut ctx, &double(f64::NEG_INFINITY), GenMode::NATIVE),
        "-INFINITY"
    );
    assert_eq!(
        lower(
            &mut ctx,
            &lit(Literal::Interval(60.0), TypeId::INTERVAL),
            GenMode::BOXED
        ),
        "make_intrusive<IntervalVal>(60.0)"
    );
}

#[test]
fn non_native_constants_are_pooled() {
    let fx = Fixture::new();
    let mut ctx = fx.ctx();

    assert_eq!(lower(&mut ctx, &string("a"), GenMode::NATIVE), "const_vals__CPP[0]");
    assert_eq!(
        lower(&mut ctx, &lit(Literal::Addr("::1".to_owned()), TypeId::ADDR), GenMode::BOXED),
        "const_vals__CPP[1]"
    );
    assert_eq!(lower(&mut ctx, &string("a"), GenMode::BOXED), "const_vals__CPP[0]");
    assert_eq!(
        lower(
            &mut ctx,
            &lit(Literal::Pattern("/x+/".to_owned()), TypeId::PATTERN),
            GenMode::DONT_CARE
        ),
        "const_vals__CPP[2]"
    );

    assert_eq!(
        ctx.decls().constants[2],
        PooledConst {
            kind: ConstKind::Pattern,
            text: "/x+/".to_owned(),
        }
    );
}

#[test]
fn enum_constants_follow_redefinition() {
    let mut fx = Fixture::new();
    let fixed = fx.pool.enumeration("Proto", &[(1, "TCP"), (2, "UDP")]);
    let open = fx.pool.enumeration("Level", &[(0, "LOW")]);
    fx.pool.redef_enum(open, &[(5, "HIGH")]);
    let mut ctx = fx.ctx();

    let udp = lit(Literal::Enum(2), fixed);
    let high = lit(Literal::Enum(5), open);

    assert_eq!(lower(&mut ctx, &udp, GenMode::NATIVE), "2");
    assert_eq!(
        lower(&mut ctx, &udp, GenMode::BOXED),
        "make_enum__CPP(types__CPP[0], 2)"
    );
    assert_eq!(lower(&mut ctx, &high, GenMode::NATIVE), "enum_mapping[0]");
    assert_eq!(
        lower(&mut ctx, &high, GenMode::BOXED),
        "make_enum__CPP(types__CPP[1], enum_mapping[0])"
    );
}

// Other kinds

#[test]
fn clone_boxes_then_unboxes() {
    let mut fx = Fixture::new();
    let rec = fx.pool.record(None, vec![FieldDecl::new("a", TypeId::INT)]);
    let mut ctx = fx.ctx();

    let e = Expr::new(ExprKind::Clone(Box::new(local("r", rec))), rec);
    assert_eq!(lower(&mut ctx, &e, GenMode::NATIVE), "r_->Clone()");

    let e = Expr::new(ExprKind::Clone(Box::new(local("n", TypeId::INT))), TypeId::INT);
    assert_eq!(
        lower(&mut ctx, &e, GenMode::NATIVE),
        "val_mgr->Int(n_)->Clone()->AsInt()"
    );
}

#[test]
fn lists_join_their_elements() {
    let mut fx = Fixture::new();
    let lt = fx.pool.list(vec![TypeId::INT, TypeId::STRING]);
    let mut ctx = fx.ctx();

    let e = Expr::list(vec![int(1), local("s", TypeId::STRING)], lt);
    assert_eq!(lower(&mut ctx, &e, GenMode::BOXED), "val_mgr->Int(1), s_");
    assert_eq!(lower(&mut ctx, &e, GenMode::NATIVE), "1, s_");
}

#[test]
fn reduced_kinds_are_rejected() {
    let fx = Fixture::new();
    let mut ctx = fx.ctx();

    for (kind, name) in [
        (ReducedKind::FieldAssign, "field-assign"),
        (ReducedKind::IndexSliceAssign, "index-slice-assign"),
        (ReducedKind::Inline, "inline"),
        (ReducedKind::Event, "event"),
    ] {
        let e = Expr::new(ExprKind::Reduced(kind), TypeId::VOID);
        assert_eq!(
            lower_err(&mut ctx, &e, GenMode::NATIVE),
            CodegenError::ReducedExpr { kind: name }
        );
    }
}

#[test]
fn types_from_another_pool_are_rejected() {
    let mut other = sprig_ir::TypePool::new();
    let foreign = other.vector(TypeId::STRING);
    let fx = Fixture::new();
    let mut ctx = fx.ctx();

    assert_eq!(
        lower_err(&mut ctx, &local("v", foreign), GenMode::BOXED),
        CodegenError::UnknownType { id: foreign }
    );

    let nested = bin(BinaryOp::Add, int(1), local("n", foreign), TypeId::INT);
    assert_eq!(
        lower_err(&mut ctx, &nested, GenMode::NATIVE),
        CodegenError::UnknownType { id: foreign }
    );
}

#[test]
fn errors_propagate_from_deep_operands() {
    let fx = Fixture::new();
    let mut ctx = fx.ctx();

    let e = bin(
        BinaryOp::Add,
        int(1),
        bin(BinaryOp::Mul, int(2), global("ghost", TypeId::INT), TypeId::INT),
        TypeId::INT,
    );
    assert_eq!(
        lower_err(&mut ctx, &e, GenMode::NATIVE),
        CodegenError::UnknownGlobal {
            name: "ghost".to_owned(),
        }
    );
}

#[test]
fn deeply_nested_trees_do_not_overflow() {
    let fx = Fixture::new();
    let mut ctx = fx.ctx();

    let mut e = local("x", TypeId::INT);
    for _ in 0..3_000 {
        e = bin(BinaryOp::Add, e, int(1), TypeId::INT);
    }

    let code = lower(&mut ctx, &e, GenMode::NATIVE);
    assert!(code.starts_with("(((("));
    assert!(code.ends_with(")+(1)"));
}
