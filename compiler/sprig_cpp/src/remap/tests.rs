#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sprig_ir::{FieldDecl, TypeId};

use super::{FieldSlot, RemapTables};
use crate::context::{CodegenConfig, CodegenContext};
use crate::error::CodegenError;
use crate::test_helpers::Fixture;

fn record_with_fields(fx: &mut Fixture, n: usize) -> TypeId {
    let fields = (0..n)
        .map(|i| FieldDecl::new(format!("f{i}"), TypeId::INT))
        .collect();
    fx.pool.record(Some("R"), fields)
}

// Slot allocation

#[test]
fn slots_are_dense_in_first_use_order() {
    let r1 = TypeId::from_raw(20);
    let r2 = TypeId::from_raw(21);
    let mut t = RemapTables::new();

    assert_eq!(t.field_slot(r1, 5, "a"), 0);
    assert_eq!(t.field_slot(r2, 5, "b"), 1);
    assert_eq!(t.field_slot(r1, 5, "a"), 0);
    assert_eq!(t.field_slot(r1, 6, "c"), 2);

    assert_eq!(t.field_slots().len(), 3);
    assert_eq!(
        t.field_slots()[1],
        FieldSlot {
            record: r2,
            field: 5,
            name: "b".to_owned(),
        }
    );
    assert_eq!(t.lookup_field(r1, 6), Some(2));
    assert_eq!(t.lookup_field(r2, 6), None);
}

#[test]
fn field_and_enum_counters_are_independent() {
    let rec = TypeId::from_raw(20);
    let en = TypeId::from_raw(21);
    let mut t = RemapTables::new();
    assert!(t.is_empty());

    assert_eq!(t.field_slot(rec, 3, "x"), 0);
    assert_eq!(t.enum_slot(en, 7, "RED"), 0);
    assert_eq!(t.enum_slot(en, 8, "BLUE"), 1);
    assert_eq!(t.field_slot(rec, 4, "y"), 1);

    assert_eq!(t.lookup_enum(en, 8), Some(1));
    assert_eq!(t.enum_slots()[0].name, "RED");
    assert!(!t.is_empty());
}

// Field offsets

#[test]
fn original_fields_are_literal_offsets() {
    let mut fx = Fixture::new();
    let rec = record_with_fields(&mut fx, 5);
    let mut ctx = fx.ctx();

    assert_eq!(ctx.field_offset(rec, 0).unwrap(), "0");
    assert_eq!(ctx.field_offset(rec, 2).unwrap(), "2");
    assert_eq!(ctx.field_offset(rec, 4).unwrap(), "4");
    assert!(ctx.remap().is_empty());
}

#[test]
fn appended_fields_go_through_the_mapping() {
    let mut fx = Fixture::new();
    let rec = record_with_fields(&mut fx, 5);
    assert!(fx.pool.extend_record(
        rec,
        vec![
            FieldDecl::new("late", TypeId::STRING),
            FieldDecl::new("later", TypeId::COUNT),
        ],
    ));
    let mut ctx = fx.ctx();

    assert_eq!(ctx.field_offset(rec, 6).unwrap(), "field_mapping[0]");
    assert_eq!(ctx.field_offset(rec, 5).unwrap(), "field_mapping[1]");
    assert_eq!(ctx.field_offset(rec, 6).unwrap(), "field_mapping[0]");

    let slots = ctx.remap().field_slots();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].name, "later");
    assert_eq!(slots[1].name, "late");
}

#[test]
fn mapping_array_name_is_configurable() {
    let mut fx = Fixture::new();
    let rec = record_with_fields(&mut fx, 1);
    fx.pool
        .extend_record(rec, vec![FieldDecl::new("extra", TypeId::INT)]);
    let config = CodegenConfig {
        field_mapping: "fm".to_owned(),
        ..CodegenConfig::default()
    };
    let mut ctx = CodegenContext::with_config(&fx.pool, &fx.env, config);

    assert_eq!(ctx.field_offset(rec, 1).unwrap(), "fm[0]");
}

#[test]
fn field_offset_errors() {
    let mut fx = Fixture::new();
    let rec = record_with_fields(&mut fx, 2);
    let mut ctx = fx.ctx();

    assert_eq!(
        ctx.field_offset(TypeId::INT, 0),
        Err(CodegenError::NotARecord { ty: "int" })
    );
    assert_eq!(
        ctx.field_offset(rec, 9),
        Err(CodegenError::NoSuchField { field: 9 })
    );
}

// Enum constants

#[test]
fn enum_values_are_literal_until_redefined() {
    let mut fx = Fixture::new();
    let color = fx.pool.enumeration("Color", &[(0, "RED"), (3, "GREEN")]);
    let mut ctx = fx.ctx();

    assert_eq!(ctx.enum_constant(color, 3).unwrap(), "3");
    assert!(ctx.remap().enum_slots().is_empty());
}

#[test]
fn redefined_enum_values_all_use_slots() {
    let mut fx = Fixture::new();
    let color = fx.pool.enumeration("Color", &[(0, "RED"), (3, "GREEN")]);
    assert!(fx.pool.redef_enum(color, &[(10, "BLUE")]));
    let mut ctx = fx.ctx();

    // Original values are remapped too: the redefinition may renumber them.
    assert_eq!(ctx.enum_constant(color, 3).unwrap(), "enum_mapping[0]");
    assert_eq!(ctx.enum_constant(color, 10).unwrap(), "enum_mapping[1]");
    assert_eq!(ctx.enum_constant(color, 3).unwrap(), "enum_mapping[0]");

    let names: Vec<_> = ctx
        .remap()
        .enum_slots()
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(names, ["GREEN", "BLUE"]);
}

#[test]
fn enum_constant_errors() {
    let mut fx = Fixture::new();
    let color = fx.pool.enumeration("Color", &[(0, "RED")]);
    fx.pool.redef_enum(color, &[(1, "BLUE")]);
    let mut ctx = fx.ctx();

    assert_eq!(
        ctx.enum_constant(TypeId::COUNT, 0),
        Err(CodegenError::NotAnEnum { ty: "count" })
    );
    assert_eq!(
        ctx.enum_constant(color, 42),
        Err(CodegenError::NoSuchEnumValue { value: 42 })
    );
}

proptest! {
    #[test]
    fn field_slots_stay_stable_and_dense(
        accesses in prop::collection::vec((0u32..4, 0usize..6), 0..64)
    ) {
        let mut t = RemapTables::new();
        let mut seen: Vec<(u32, usize)> = Vec::new();

        for (rec, field) in accesses {
            let slot = t.field_slot(TypeId::from_raw(100 + rec), field, "x");
            match seen.iter().position(|k| *k == (rec, field)) {
                Some(first) => prop_assert_eq!(slot, first),
                None => {
                    prop_assert_eq!(slot, seen.len());
                    seen.push((rec, field));
                }
            }
        }

        prop_assert_eq!(t.field_slots().len(), seen.len());
    }

    #[test]
    fn enum_slots_stay_stable_and_dense(
        values in prop::collection::vec(-3i64..5, 0..64)
    ) {
        let en = TypeId::from_raw(50);
        let mut t = RemapTables::new();
        let mut seen: Vec<i64> = Vec::new();

        for v in values {
            let slot = t.enum_slot(en, v, "V");
            match seen.iter().position(|k| *k == v) {
                Some(first) => prop_assert_eq!(slot, first),
                None => {
                    prop_assert_eq!(slot, seen.len());
                    seen.push(v);
                }
            }
        }

        prop_assert_eq!(t.enum_slots().len(), seen.len());
    }
}
