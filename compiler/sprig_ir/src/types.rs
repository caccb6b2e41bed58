//! Type data stored in the [`TypePool`](crate::TypePool).
//!
//! Records and enums carry the schema bookkeeping the C++ backend needs to
//! survive later redefinition: a record remembers how many of its fields
//! existed when the unit began lowering, and an enum remembers whether it
//! has been extended since.

use rustc_hash::FxHashMap;

use crate::TypeId;

/// Structural description of a type.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeData {
    Bool,
    Int,
    Count,
    Double,
    Time,
    Interval,
    Port,
    String,
    Addr,
    Subnet,
    Pattern,
    Any,
    Void,
    Record(RecordType),
    /// A table, or a set when `yield_ty` is `None`.
    ///
    /// `indices` always refers to a [`TypeData::List`].
    Table {
        indices: TypeId,
        yield_ty: Option<TypeId>,
    },
    Vector(TypeId),
    Func(FuncType),
    Enum(EnumType),
    List(Vec<TypeId>),
    /// The type of an expression naming a type (e.g. a global `type` id).
    Type(TypeId),
}

impl TypeData {
    /// Short name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeData::Bool => "bool",
            TypeData::Int => "int",
            TypeData::Count => "count",
            TypeData::Double => "double",
            TypeData::Time => "time",
            TypeData::Interval => "interval",
            TypeData::Port => "port",
            TypeData::String => "string",
            TypeData::Addr => "addr",
            TypeData::Subnet => "subnet",
            TypeData::Pattern => "pattern",
            TypeData::Any => "any",
            TypeData::Void => "void",
            TypeData::Record(_) => "record",
            TypeData::Table { yield_ty: None, .. } => "set",
            TypeData::Table { .. } => "table",
            TypeData::Vector(_) => "vector",
            TypeData::Func(_) => "func",
            TypeData::Enum(_) => "enum",
            TypeData::List(_) => "list",
            TypeData::Type(_) => "type",
        }
    }

    /// Storage family of a value of this type.
    pub fn internal_type(&self) -> InternalType {
        match self {
            TypeData::Bool | TypeData::Int | TypeData::Enum(_) => InternalType::Int,
            TypeData::Count | TypeData::Port => InternalType::Unsigned,
            TypeData::Double | TypeData::Time | TypeData::Interval => InternalType::Double,
            TypeData::String => InternalType::String,
            TypeData::Addr => InternalType::Addr,
            TypeData::Subnet => InternalType::Subnet,
            TypeData::Void => InternalType::Void,
            _ => InternalType::Other,
        }
    }

    /// Whether values of this type have an unboxed scalar form.
    pub fn is_native(&self) -> bool {
        matches!(
            self,
            TypeData::Bool
                | TypeData::Int
                | TypeData::Count
                | TypeData::Double
                | TypeData::Time
                | TypeData::Interval
                | TypeData::Port
                | TypeData::Enum(_)
                | TypeData::Void
        )
    }

    /// Whether this is one of the arithmetic families (int, count, double).
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, TypeData::Int | TypeData::Count | TypeData::Double)
    }
}

/// Underlying storage family, used to pick operator emission rules.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InternalType {
    Int,
    Unsigned,
    Double,
    String,
    Addr,
    Subnet,
    Void,
    Other,
}

/// A single record field declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeId,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        FieldDecl {
            name: name.into(),
            ty,
        }
    }
}

/// Record type with redefinition tracking.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordType {
    pub name: Option<String>,
    pub fields: Vec<FieldDecl>,
    /// Fields known when the compilation unit began lowering.
    ///
    /// Fields at or past this index were appended by a later `redef`.
    pub num_orig_fields: usize,
}

impl RecordType {
    pub fn new(name: Option<String>, fields: Vec<FieldDecl>) -> Self {
        let num_orig_fields = fields.len();
        RecordType {
            name,
            fields,
            num_orig_fields,
        }
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, index: usize) -> Option<&FieldDecl> {
        self.fields.get(index)
    }
}

/// Enum type: integer values with their names.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumType {
    pub name: String,
    pub values: FxHashMap<i64, String>,
    /// Set once the enum has been extended after its original definition.
    pub redefined: bool,
}

impl EnumType {
    pub fn new(name: impl Into<String>) -> Self {
        EnumType {
            name: name.into(),
            values: FxHashMap::default(),
            redefined: false,
        }
    }

    /// Look up the name of an enum value.
    pub fn lookup(&self, value: i64) -> Option<&str> {
        self.values.get(&value).map(String::as_str)
    }
}

/// What kind of body a function type describes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FuncFlavor {
    Function,
    Event,
    Hook,
}

/// A declared function parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeId,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Param {
            name: name.into(),
            ty,
        }
    }
}

/// An explicit lambda capture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capture {
    pub name: String,
    /// Capture by value (`copy`) rather than by shared reference.
    pub deep_copy: bool,
}

/// Function, event, or hook signature.
#[derive(Clone, Debug, PartialEq)]
pub struct FuncType {
    pub params: Vec<Param>,
    pub yield_ty: TypeId,
    pub flavor: FuncFlavor,
    /// Capture list of a lambda; `None` for ordinary functions.
    pub captures: Option<Vec<Capture>>,
}

impl FuncType {
    pub fn new(params: Vec<Param>, yield_ty: TypeId, flavor: FuncFlavor) -> Self {
        FuncType {
            params,
            yield_ty,
            flavor,
            captures: None,
        }
    }

    #[must_use]
    pub fn with_captures(mut self, captures: Vec<Capture>) -> Self {
        self.captures = Some(captures);
        self
    }

    pub fn is_event(&self) -> bool {
        self.flavor == FuncFlavor::Event
    }
}
