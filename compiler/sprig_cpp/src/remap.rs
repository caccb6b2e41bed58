//! Indirection slots for late-bound record fields and enum values.
//!
//! Generated code is compiled once, but the running system may load more
//! script source afterwards. A later `redef` can append fields to a record
//! or values to an enum, so numeric offsets baked into the output would go
//! stale. Fields appended after this unit's snapshot, and every value of a
//! redefined enum, are therefore read through per-unit arrays
//! (`field_mapping[slot]`, `enum_mapping[slot]`) that the declaration stage
//! fills in at load time by name.
//!
//! Slots are allocated densely from 0 in first-use order, one counter per
//! table, and never change once handed out.

use rustc_hash::FxHashMap;
use sprig_ir::TypeId;

use crate::context::CodegenContext;
use crate::error::{CodegenError, EmitResult};

/// A record field that must be resolved by name at load time.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldSlot {
    pub record: TypeId,
    pub field: usize,
    pub name: String,
}

/// An enum value that must be resolved by name at load time.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumSlot {
    pub enum_ty: TypeId,
    pub value: i64,
    pub name: String,
}

/// Append-only slot tables for one compilation unit.
///
/// The slot number of an entry is its position in [`field_slots`] or
/// [`enum_slots`].
///
/// [`field_slots`]: RemapTables::field_slots
/// [`enum_slots`]: RemapTables::enum_slots
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct RemapTables {
    fields: Vec<FieldSlot>,
    enums: Vec<EnumSlot>,
    field_index: FxHashMap<(TypeId, usize), usize>,
    enum_index: FxHashMap<(TypeId, i64), usize>,
}

impl RemapTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot for `field` of `record`, allocating one on first use.
    pub fn field_slot(&mut self, record: TypeId, field: usize, name: &str) -> usize {
        if let Some(&slot) = self.field_index.get(&(record, field)) {
            return slot;
        }

        let slot = self.fields.len();
        self.fields.push(FieldSlot {
            record,
            field,
            name: name.to_owned(),
        });
        self.field_index.insert((record, field), slot);
        tracing::debug!(?record, field, name, slot, "allocated field slot");
        slot
    }

    /// Slot for `value` of `enum_ty`, allocating one on first use.
    pub fn enum_slot(&mut self, enum_ty: TypeId, value: i64, name: &str) -> usize {
        if let Some(&slot) = self.enum_index.get(&(enum_ty, value)) {
            return slot;
        }

        let slot = self.enums.len();
        self.enums.push(EnumSlot {
            enum_ty,
            value,
            name: name.to_owned(),
        });
        self.enum_index.insert((enum_ty, value), slot);
        tracing::debug!(?enum_ty, value, name, slot, "allocated enum slot");
        slot
    }

    #[inline]
    pub fn lookup_field(&self, record: TypeId, field: usize) -> Option<usize> {
        self.field_index.get(&(record, field)).copied()
    }

    #[inline]
    pub fn lookup_enum(&self, enum_ty: TypeId, value: i64) -> Option<usize> {
        self.enum_index.get(&(enum_ty, value)).copied()
    }

    pub fn field_slots(&self) -> &[FieldSlot] {
        &self.fields
    }

    pub fn enum_slots(&self) -> &[EnumSlot] {
        &self.enums
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.enums.is_empty()
    }
}

impl CodegenContext<'_> {
    /// C++ expression for the runtime offset of `field` in `record_ty`.
    ///
    /// Fields present in the original definition are emitted as literals.
    pub(crate) fn field_offset(&mut self, record_ty: TypeId, field: usize) -> EmitResult {
        let types = self.types;
        let rt = types
            .as_record(record_ty)
            .ok_or_else(|| CodegenError::NotARecord {
                ty: types.get(record_ty).kind_name(),
            })?;
        let decl = rt.field(field).ok_or(CodegenError::NoSuchField { field })?;

        if field < rt.num_orig_fields {
            return Ok(field.to_string());
        }

        let slot = self.remap.field_slot(record_ty, field, &decl.name);
        Ok(format!("{}[{slot}]", self.config.field_mapping))
    }

    /// C++ expression for enum value `value` of `enum_ty`.
    pub(crate) fn enum_constant(&mut self, enum_ty: TypeId, value: i64) -> EmitResult {
        let types = self.types;
        let et = types.as_enum(enum_ty).ok_or_else(|| CodegenError::NotAnEnum {
            ty: types.get(enum_ty).kind_name(),
        })?;

        if !et.redefined {
            return Ok(value.to_string());
        }

        let name = et
            .lookup(value)
            .ok_or(CodegenError::NoSuchEnumValue { value })?;
        let slot = self.remap.enum_slot(enum_ty, value, name);
        Ok(format!("{}[{slot}]", self.config.enum_mapping))
    }
}

#[cfg(test)]
mod tests;
