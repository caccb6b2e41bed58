//! Value representations and the conversions between them.
//!
//! Types with an unboxed scalar form (bool, the numeric families, port,
//! enum) can appear in generated code either as a plain C++ scalar or as a
//! reference-counted `ValPtr`. Every other type only exists boxed, so a
//! native request for it degenerates to the boxed form.

use sprig_ir::{TypeData, TypeId};

use crate::context::CodegenContext;

/// Representation requested by the consumer of a snippet.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Repr {
    /// Unboxed scalar, usable with C++ operators.
    Native,
    /// `ValPtr` handle, usable polymorphically.
    Boxed,
    /// The consumer applies an accessor itself and takes either form.
    DontCare,
}

/// How a snippet will be used: its representation, and whether it is the
/// outermost expression of a statement (so its value is discarded).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GenMode {
    pub repr: Repr,
    pub top_level: bool,
}

impl GenMode {
    pub const NATIVE: GenMode = GenMode::nested(Repr::Native);
    pub const BOXED: GenMode = GenMode::nested(Repr::Boxed);
    pub const DONT_CARE: GenMode = GenMode::nested(Repr::DontCare);

    /// A sub-expression whose value is used.
    #[inline]
    pub const fn nested(repr: Repr) -> Self {
        GenMode {
            repr,
            top_level: false,
        }
    }

    /// A statement-level expression whose value is discarded.
    #[inline]
    pub const fn top_level(repr: Repr) -> Self {
        GenMode {
            repr,
            top_level: true,
        }
    }

    /// Same representation, used as a sub-expression.
    #[inline]
    #[must_use]
    pub const fn as_nested(self) -> Self {
        GenMode::nested(self.repr)
    }
}

/// Accessor that extracts the native form from a boxed value of `ty`.
pub(crate) fn native_accessor(ty: &TypeData) -> Option<&'static str> {
    match ty {
        TypeData::Bool => Some("->AsBool()"),
        TypeData::Int => Some("->AsInt()"),
        TypeData::Count | TypeData::Port => Some("->AsCount()"),
        TypeData::Enum(_) => Some("->AsEnum()"),
        TypeData::Double | TypeData::Time | TypeData::Interval => Some("->AsDouble()"),
        _ => None,
    }
}

/// `ValPtr` class name of a boxed non-native value of `ty`.
pub(crate) fn val_class(ty: &TypeData) -> &'static str {
    match ty {
        TypeData::String => "StringVal",
        TypeData::Addr => "AddrVal",
        TypeData::Subnet => "SubNetVal",
        TypeData::Pattern => "PatternVal",
        TypeData::Record(_) => "RecordVal",
        TypeData::Table { .. } => "TableVal",
        TypeData::Vector(_) => "VectorVal",
        TypeData::Func(_) => "FuncVal",
        TypeData::List(_) => "ListVal",
        TypeData::Type(_) => "TypeVal",
        _ => "Val",
    }
}

impl CodegenContext<'_> {
    /// Convert native-form `code` of type `ty` to the requested form.
    ///
    /// Only a boxed request of a native type changes anything.
    pub fn native_to_repr(&mut self, code: String, ty: TypeId, repr: Repr) -> String {
        if repr != Repr::Boxed {
            return code;
        }

        let types = self.types;
        match types.get(ty) {
            TypeData::Bool => format!("val_mgr->Bool({code})"),
            TypeData::Int => format!("val_mgr->Int({code})"),
            TypeData::Count => format!("val_mgr->Count({code})"),
            TypeData::Port => format!("val_mgr->Port({code})"),
            TypeData::Enum(_) => {
                let tn = self.type_name(ty);
                format!("make_enum__CPP({tn}, {code})")
            }
            TypeData::Double => format!("make_intrusive<DoubleVal>({code})"),
            TypeData::Time => format!("make_intrusive<TimeVal>({code})"),
            TypeData::Interval => format!("make_intrusive<IntervalVal>({code})"),
            _ => code,
        }
    }

    /// Convert boxed `code` of type `ty` to the requested form.
    ///
    /// Native and don't-care requests of a native type get its accessor.
    pub fn boxed_to_repr(&self, code: String, ty: TypeId, repr: Repr) -> String {
        if repr == Repr::Boxed {
            return code;
        }

        match native_accessor(self.types.get(ty)) {
            Some(accessor) => code + accessor,
            None => code,
        }
    }
}

#[cfg(test)]
mod tests;
