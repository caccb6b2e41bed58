//! Type handle.
//!
//! Types are shared across the whole compilation unit: expressions hold a
//! `TypeId` and look the type up in the [`TypePool`](crate::TypePool).
//! Identity of a `TypeId` is what the remapping tables key on, so two
//! structurally equal record types are still tracked separately.

use std::fmt;

/// Handle to a type stored in a [`TypePool`](crate::TypePool).
///
/// Primitive types are pre-interned at fixed indices so the lowering stage
/// can synthesize nodes (e.g. the `1` in an increment rewrite) without
/// touching the pool.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    // Pre-interned primitive types
    pub const BOOL: TypeId = TypeId(0);
    pub const INT: TypeId = TypeId(1);
    pub const COUNT: TypeId = TypeId(2);
    pub const DOUBLE: TypeId = TypeId(3);
    pub const TIME: TypeId = TypeId(4);
    pub const INTERVAL: TypeId = TypeId(5);
    pub const PORT: TypeId = TypeId(6);
    pub const STRING: TypeId = TypeId(7);
    pub const ADDR: TypeId = TypeId(8);
    pub const SUBNET: TypeId = TypeId(9);
    pub const PATTERN: TypeId = TypeId(10);
    pub const ANY: TypeId = TypeId(11);
    pub const VOID: TypeId = TypeId(12);

    /// First ID for dynamically allocated compound types.
    pub const FIRST_COMPOUND: u32 = 13;

    /// Create from a raw index.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        TypeId(raw)
    }

    /// Index into the pool's storage.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            TypeId::BOOL => "bool",
            TypeId::INT => "int",
            TypeId::COUNT => "count",
            TypeId::DOUBLE => "double",
            TypeId::TIME => "time",
            TypeId::INTERVAL => "interval",
            TypeId::PORT => "port",
            TypeId::STRING => "string",
            TypeId::ADDR => "addr",
            TypeId::SUBNET => "subnet",
            TypeId::PATTERN => "pattern",
            TypeId::ANY => "any",
            TypeId::VOID => "void",
            _ => return write!(f, "TypeId({})", self.0),
        };
        write!(f, "TypeId::{name}")
    }
}
