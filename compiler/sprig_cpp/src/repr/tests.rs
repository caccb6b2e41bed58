#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use sprig_ir::{TypeData, TypeId};

use super::{native_accessor, val_class, GenMode, Repr};
use crate::test_helpers::Fixture;

const NATIVE_TYPES: [TypeId; 7] = [
    TypeId::BOOL,
    TypeId::INT,
    TypeId::COUNT,
    TypeId::PORT,
    TypeId::DOUBLE,
    TypeId::TIME,
    TypeId::INTERVAL,
];

#[test]
fn boxing_uses_the_family_constructor() {
    let fx = Fixture::new();
    let mut ctx = fx.ctx();

    let boxed: Vec<String> = NATIVE_TYPES
        .iter()
        .map(|&ty| ctx.native_to_repr("x".to_owned(), ty, Repr::Boxed))
        .collect();

    assert_eq!(
        boxed,
        [
            "val_mgr->Bool(x)",
            "val_mgr->Int(x)",
            "val_mgr->Count(x)",
            "val_mgr->Port(x)",
            "make_intrusive<DoubleVal>(x)",
            "make_intrusive<TimeVal>(x)",
            "make_intrusive<IntervalVal>(x)",
        ]
    );
}

#[test]
fn boxing_an_enum_names_its_type() {
    let mut fx = Fixture::new();
    let color = fx.pool.enumeration("Color", &[(0, "RED")]);
    let mut ctx = fx.ctx();

    assert_eq!(
        ctx.native_to_repr("x".to_owned(), color, Repr::Boxed),
        "make_enum__CPP(types__CPP[0], x)"
    );
    assert_eq!(ctx.decls().types, [color]);
}

#[test]
fn unboxed_requests_leave_native_code_alone() {
    let fx = Fixture::new();
    let mut ctx = fx.ctx();

    for ty in NATIVE_TYPES {
        for repr in [Repr::Native, Repr::DontCare] {
            assert_eq!(ctx.native_to_repr("x".to_owned(), ty, repr), "x");
        }
    }
    assert!(ctx.decls().types.is_empty());
}

#[test]
fn non_native_types_are_never_converted() {
    let mut fx = Fixture::new();
    let vec = fx.pool.vector(TypeId::INT);
    let mut ctx = fx.ctx();

    for ty in [TypeId::STRING, TypeId::ADDR, TypeId::ANY, vec] {
        for repr in [Repr::Native, Repr::Boxed, Repr::DontCare] {
            assert_eq!(ctx.native_to_repr("v".to_owned(), ty, repr), "v");
            assert_eq!(ctx.boxed_to_repr("v".to_owned(), ty, repr), "v");
        }
    }
}

#[test]
fn unboxing_appends_the_accessor() {
    let fx = Fixture::new();
    let ctx = fx.ctx();

    assert_eq!(
        ctx.boxed_to_repr("v".to_owned(), TypeId::COUNT, Repr::Native),
        "v->AsCount()"
    );
    assert_eq!(
        ctx.boxed_to_repr("v".to_owned(), TypeId::TIME, Repr::DontCare),
        "v->AsDouble()"
    );
    assert_eq!(
        ctx.boxed_to_repr("v".to_owned(), TypeId::BOOL, Repr::Boxed),
        "v"
    );
}

#[test]
fn boxing_then_unboxing_pairs_constructor_with_accessor() {
    let mut fx = Fixture::new();
    let color = fx.pool.enumeration("Color", &[(0, "RED")]);
    let mut ctx = fx.ctx();

    let cases = [
        (TypeId::BOOL, "val_mgr->Bool(x)->AsBool()"),
        (TypeId::INT, "val_mgr->Int(x)->AsInt()"),
        (TypeId::COUNT, "val_mgr->Count(x)->AsCount()"),
        (TypeId::PORT, "val_mgr->Port(x)->AsCount()"),
        (TypeId::DOUBLE, "make_intrusive<DoubleVal>(x)->AsDouble()"),
        (TypeId::INTERVAL, "make_intrusive<IntervalVal>(x)->AsDouble()"),
        (color, "make_enum__CPP(types__CPP[0], x)->AsEnum()"),
    ];

    for (ty, expected) in cases {
        let boxed = ctx.native_to_repr("x".to_owned(), ty, Repr::Boxed);
        assert_eq!(ctx.boxed_to_repr(boxed, ty, Repr::Native), expected);
    }
}

#[test]
fn accessor_and_class_tables() {
    assert_eq!(native_accessor(&TypeData::Port), Some("->AsCount()"));
    assert_eq!(native_accessor(&TypeData::Interval), Some("->AsDouble()"));
    assert_eq!(native_accessor(&TypeData::String), None);

    assert_eq!(val_class(&TypeData::Subnet), "SubNetVal");
    assert_eq!(val_class(&TypeData::Vector(TypeId::INT)), "VectorVal");
    assert_eq!(val_class(&TypeData::Any), "Val");
}

#[test]
fn gen_mode_constructors() {
    assert_eq!(
        GenMode::top_level(Repr::Boxed),
        GenMode {
            repr: Repr::Boxed,
            top_level: true,
        }
    );
    assert_eq!(GenMode::top_level(Repr::Native).as_nested(), GenMode::NATIVE);
    assert!(!GenMode::DONT_CARE.top_level);
}
