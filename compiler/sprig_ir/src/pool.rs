//! Type pool.
//!
//! Owns every [`TypeData`] of a compilation unit. Expressions refer to
//! types by [`TypeId`]; the pool is created and populated upstream and is
//! read-only while the C++ backend lowers expressions.

use rustc_hash::FxHashSet;

use crate::types::{EnumType, FieldDecl, FuncType, InternalType, RecordType, TypeData};
use crate::TypeId;

static VOID: TypeData = TypeData::Void;

/// Arena of types addressed by [`TypeId`].
#[derive(Clone, Debug)]
pub struct TypePool {
    types: Vec<TypeData>,
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

impl TypePool {
    /// Create a pool with the primitive types pre-interned.
    pub fn new() -> Self {
        let mut types = Vec::with_capacity(64);
        // Order must match the `TypeId` constants.
        types.extend([
            TypeData::Bool,
            TypeData::Int,
            TypeData::Count,
            TypeData::Double,
            TypeData::Time,
            TypeData::Interval,
            TypeData::Port,
            TypeData::String,
            TypeData::Addr,
            TypeData::Subnet,
            TypeData::Pattern,
            TypeData::Any,
            TypeData::Void,
        ]);
        debug_assert_eq!(types.len(), TypeId::FIRST_COMPOUND as usize);
        TypePool { types }
    }

    /// Look up a type.
    ///
    /// An id from another pool resolves to `void`. Lowering checks every
    /// expression type with [`try_get`](Self::try_get) first, so this only
    /// matters for ids nested inside a type.
    #[inline]
    pub fn get(&self, id: TypeId) -> &TypeData {
        self.try_get(id).unwrap_or(&VOID)
    }

    /// Look up a type, or `None` if `id` was not produced by this pool.
    #[inline]
    pub fn try_get(&self, id: TypeId) -> Option<&TypeData> {
        self.types.get(id.index())
    }

    /// Add a new type. Every call yields a distinct id.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "type counts never exceed u32"
    )]
    pub fn add(&mut self, data: TypeData) -> TypeId {
        let id = TypeId::from_raw(self.types.len() as u32);
        self.types.push(data);
        id
    }

    // Construction helpers

    /// A record type. Every field given here counts as original.
    pub fn record(&mut self, name: Option<&str>, fields: Vec<FieldDecl>) -> TypeId {
        self.add(TypeData::Record(RecordType::new(
            name.map(str::to_owned),
            fields,
        )))
    }

    /// A type list, as used for table indices.
    pub fn list(&mut self, types: Vec<TypeId>) -> TypeId {
        self.add(TypeData::List(types))
    }

    /// `table[index] of yield_ty`
    pub fn table(&mut self, index: Vec<TypeId>, yield_ty: TypeId) -> TypeId {
        let indices = self.list(index);
        self.add(TypeData::Table {
            indices,
            yield_ty: Some(yield_ty),
        })
    }

    /// `set[index]`: a table without a yield type.
    pub fn set(&mut self, index: Vec<TypeId>) -> TypeId {
        let indices = self.list(index);
        self.add(TypeData::Table {
            indices,
            yield_ty: None,
        })
    }

    /// `vector of elem`
    pub fn vector(&mut self, elem: TypeId) -> TypeId {
        self.add(TypeData::Vector(elem))
    }

    /// A function, event or hook signature.
    pub fn func(&mut self, func: FuncType) -> TypeId {
        self.add(TypeData::Func(func))
    }

    /// An enum with its initial `(value, name)` pairs. Not marked redefined.
    pub fn enumeration(&mut self, name: &str, values: &[(i64, &str)]) -> TypeId {
        let mut et = EnumType::new(name);
        for &(v, n) in values {
            et.values.insert(v, n.to_owned());
        }
        self.add(TypeData::Enum(et))
    }

    /// The type of a type name used as a value (`type T`).
    pub fn type_of(&mut self, ty: TypeId) -> TypeId {
        self.add(TypeData::Type(ty))
    }

    // Redefinition (applied upstream, before lowering)

    /// Append fields to a record, as a later `redef` would.
    ///
    /// The original field count is left unchanged. Returns `false` if `id`
    /// is not a record.
    pub fn extend_record(&mut self, id: TypeId, fields: Vec<FieldDecl>) -> bool {
        match self.types.get_mut(id.index()) {
            Some(TypeData::Record(rt)) => {
                rt.fields.extend(fields);
                true
            }
            _ => false,
        }
    }

    /// Add values to an enum and mark it redefined.
    ///
    /// Returns `false` if `id` is not an enum.
    pub fn redef_enum(&mut self, id: TypeId, values: &[(i64, &str)]) -> bool {
        match self.types.get_mut(id.index()) {
            Some(TypeData::Enum(et)) => {
                for &(v, n) in values {
                    et.values.insert(v, n.to_owned());
                }
                et.redefined = true;
                true
            }
            _ => false,
        }
    }

    // Queries

    /// Storage family the operator dispatch keys on.
    pub fn internal_type(&self, id: TypeId) -> InternalType {
        self.get(id).internal_type()
    }

    /// Whether values of `id` have an unboxed C++ form.
    pub fn is_native(&self, id: TypeId) -> bool {
        self.get(id).is_native()
    }

    /// `int`, `count` or `double`.
    pub fn is_arithmetic(&self, id: TypeId) -> bool {
        self.get(id).is_arithmetic()
    }

    pub fn is_vector(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeData::Vector(_))
    }

    /// A table without a yield type.
    pub fn is_set(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeData::Table { yield_ty: None, .. })
    }

    pub fn is_any(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeData::Any)
    }

    /// Element type of a vector, or yield type of a table.
    pub fn yield_type(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            TypeData::Vector(elem) => Some(*elem),
            TypeData::Table { yield_ty, .. } => *yield_ty,
            TypeData::Func(ft) => Some(ft.yield_ty),
            _ => None,
        }
    }

    /// The record behind `id`, if it is one.
    pub fn as_record(&self, id: TypeId) -> Option<&RecordType> {
        match self.get(id) {
            TypeData::Record(rt) => Some(rt),
            _ => None,
        }
    }

    pub fn as_enum(&self, id: TypeId) -> Option<&EnumType> {
        match self.get(id) {
            TypeData::Enum(et) => Some(et),
            _ => None,
        }
    }

    pub fn as_func(&self, id: TypeId) -> Option<&FuncType> {
        match self.get(id) {
            TypeData::Func(ft) => Some(ft),
            _ => None,
        }
    }

    /// Structural type equality.
    ///
    /// Records may refer to themselves through their fields, so a pair of
    /// types already under comparison is taken as equal.
    pub fn same_type(&self, a: TypeId, b: TypeId) -> bool {
        self.same_type_in(a, b, &mut FxHashSet::default())
    }

    fn same_type_in(
        &self,
        a: TypeId,
        b: TypeId,
        seen: &mut FxHashSet<(TypeId, TypeId)>,
    ) -> bool {
        if a == b || !seen.insert((a, b)) {
            return true;
        }

        match (self.get(a), self.get(b)) {
            (TypeData::Record(ra), TypeData::Record(rb)) => {
                ra.fields.len() == rb.fields.len()
                    && ra
                        .fields
                        .iter()
                        .zip(&rb.fields)
                        .all(|(fa, fb)| {
                            fa.name == fb.name && self.same_type_in(fa.ty, fb.ty, seen)
                        })
            }
            (
                TypeData::Table {
                    indices: ia,
                    yield_ty: ya,
                },
                TypeData::Table {
                    indices: ib,
                    yield_ty: yb,
                },
            ) => {
                self.same_type_in(*ia, *ib, seen)
                    && match (ya, yb) {
                        (None, None) => true,
                        (Some(ya), Some(yb)) => self.same_type_in(*ya, *yb, seen),
                        _ => false,
                    }
            }
            (TypeData::Vector(ea), TypeData::Vector(eb))
            | (TypeData::Type(ea), TypeData::Type(eb)) => self.same_type_in(*ea, *eb, seen),
            (TypeData::List(la), TypeData::List(lb)) => {
                la.len() == lb.len()
                    && la
                        .iter()
                        .zip(lb)
                        .all(|(x, y)| self.same_type_in(*x, *y, seen))
            }
            (TypeData::Func(fa), TypeData::Func(fb)) => {
                fa.flavor == fb.flavor
                    && self.same_type_in(fa.yield_ty, fb.yield_ty, seen)
                    && fa.params.len() == fb.params.len()
                    && fa
                        .params
                        .iter()
                        .zip(&fb.params)
                        .all(|(pa, pb)| self.same_type_in(pa.ty, pb.ty, seen))
            }
            (TypeData::Enum(ea), TypeData::Enum(eb)) => ea.name == eb.name && ea.values == eb.values,
            (da, db) => da == db && !matches!(da, TypeData::Record(_) | TypeData::Enum(_)),
        }
    }
}
