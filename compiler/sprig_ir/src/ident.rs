//! Identifiers referenced by name expressions.

use crate::TypeId;

/// Where an identifier's storage lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Scoped to the enclosing function; a plain C++ variable.
    Local,
    /// Process-wide persistent storage, possibly doubling as a builtin.
    Global,
}

/// A resolved identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct Ident {
    pub name: String,
    pub ty: TypeId,
    pub scope: Scope,
    /// The identifier names a type rather than a value.
    pub is_type: bool,
}

impl Ident {
    pub fn local(name: impl Into<String>, ty: TypeId) -> Self {
        Ident {
            name: name.into(),
            ty,
            scope: Scope::Local,
            is_type: false,
        }
    }

    pub fn global(name: impl Into<String>, ty: TypeId) -> Self {
        Ident {
            name: name.into(),
            ty,
            scope: Scope::Global,
            is_type: false,
        }
    }

    /// A global identifier bound to a type declaration.
    pub fn global_type(name: impl Into<String>, ty: TypeId) -> Self {
        Ident {
            is_type: true,
            ..Ident::global(name, ty)
        }
    }

    #[inline]
    pub fn is_global(&self) -> bool {
        self.scope == Scope::Global
    }
}
