//! Per-unit lowering session.
//!
//! [`CodegenContext`] is created once per compilation unit. It borrows the
//! read-only inputs (the type pool and the [`CompileEnv`] lookup tables) and
//! owns everything lowering appends to: the remapping tables, declaration
//! requests, and the temporary counter. Independent units, including tests,
//! each get their own context and never share mutable state.

use rustc_hash::FxHashMap;
use sprig_ir::{canonicalize, TypeId, TypePool};

use crate::error::CodegenError;
use crate::remap::RemapTables;

/// Whether a global holds a script variable or a function.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GlobalKind {
    /// Read with `->GetVal()`, written with `->SetVal()`.
    Variable,
    /// The storage variable is itself the function value.
    Function,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct GlobalInfo {
    storage: String,
    kind: GlobalKind,
}

/// Name tables provided by the surrounding compiler. Queried, never mutated,
/// while lowering.
#[derive(Clone, Debug, Default)]
pub struct CompileEnv {
    /// Script global name to its C++ storage.
    globals: FxHashMap<String, GlobalInfo>,
    /// Builtin functions, kept apart from same-named script globals.
    builtins: FxHashMap<String, String>,
    /// Functions compiled to native C++ in this or an earlier unit.
    compiled: FxHashMap<String, String>,
}

impl CompileEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the storage of a global variable.
    pub fn add_global_var(&mut self, name: impl Into<String>, storage: impl Into<String>) {
        self.add_global(name.into(), storage.into(), GlobalKind::Variable);
    }

    /// Register the storage of a global function, event, or hook.
    pub fn add_global_func(&mut self, name: impl Into<String>, storage: impl Into<String>) {
        self.add_global(name.into(), storage.into(), GlobalKind::Function);
    }

    fn add_global(&mut self, name: String, storage: String, kind: GlobalKind) {
        self.globals.insert(name, GlobalInfo { storage, kind });
    }

    /// Register the storage variable holding a builtin function.
    pub fn add_builtin(&mut self, name: impl Into<String>, storage: impl Into<String>) {
        self.builtins.insert(name.into(), storage.into());
    }

    /// Mark a script function as compiled in this unit, under its
    /// conventional generated name.
    pub fn add_compiled(&mut self, name: &str) {
        let generated = format!("{}_zf", canonicalize(name));
        self.compiled.insert(name.to_owned(), generated);
    }

    /// Record a function compiled by an earlier unit under `generated`.
    pub fn add_previously_compiled(
        &mut self,
        name: impl Into<String>,
        generated: impl Into<String>,
    ) {
        self.compiled.insert(name.into(), generated.into());
    }

    /// C++ storage variable of a script global.
    #[inline]
    pub fn global_storage(&self, name: &str) -> Option<&str> {
        self.globals.get(name).map(|g| g.storage.as_str())
    }

    /// Whether `name` is a variable or a function global.
    #[inline]
    pub fn global_kind(&self, name: &str) -> Option<GlobalKind> {
        self.globals.get(name).map(|g| g.kind)
    }

    /// `true` only for globals registered with [`add_global_var`](Self::add_global_var).
    #[inline]
    pub fn is_global_var(&self, name: &str) -> bool {
        self.global_kind(name) == Some(GlobalKind::Variable)
    }

    /// Storage of the builtin `name`, ignoring script globals.
    #[inline]
    pub fn builtin_storage(&self, name: &str) -> Option<&str> {
        self.builtins.get(name).map(String::as_str)
    }

    /// Generated C++ name of a natively compiled function.
    #[inline]
    pub fn compiled_name(&self, name: &str) -> Option<&str> {
        self.compiled.get(name).map(String::as_str)
    }
}

/// Names of runtime entities referenced by generated code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodegenConfig {
    /// Execution-context handle appended to direct and generic calls.
    pub frame_var: String,
    /// Current simulated time, added to relative `schedule` delays.
    pub network_time: String,
    /// Indirection array for late record fields.
    pub field_mapping: String,
    /// Indirection array for values of redefined enums.
    pub enum_mapping: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        CodegenConfig {
            frame_var: "f__CPP".to_owned(),
            network_time: "run_state::network_time".to_owned(),
            field_mapping: "field_mapping".to_owned(),
            enum_mapping: "enum_mapping".to_owned(),
        }
    }
}

/// Family of a pooled, non-native constant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstKind {
    String,
    Addr,
    Subnet,
    Pattern,
}

/// A constant the declaration stage must materialize in `const_vals__CPP`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct PooledConst {
    pub kind: ConstKind,
    /// Source text of the literal (unquoted).
    pub text: String,
}

/// Top-level entities referenced by generated snippets.
///
/// Each list is in first-use order without duplicates; the position of an
/// entry in `types` / `constants` is its index in `types__CPP` /
/// `const_vals__CPP`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct DeclRequests {
    pub events: Vec<String>,
    pub lambdas: Vec<String>,
    pub types: Vec<TypeId>,
    pub constants: Vec<PooledConst>,
}

/// What a finished unit hands to the declaration stage.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitArtifacts {
    pub remap: RemapTables,
    pub decls: DeclRequests,
}

/// Lowering session for one compilation unit.
pub struct CodegenContext<'a> {
    /// Types of every expression in the unit.
    pub types: &'a TypePool,
    /// Global, builtin and compiled-function tables.
    pub env: &'a CompileEnv,
    pub config: CodegenConfig,
    pub(crate) remap: RemapTables,
    decls: DeclRequests,
    type_slots: FxHashMap<TypeId, usize>,
    const_slots: FxHashMap<PooledConst, usize>,
    temp_counter: u32,
}

impl<'a> CodegenContext<'a> {
    pub fn new(types: &'a TypePool, env: &'a CompileEnv) -> Self {
        Self::with_config(types, env, CodegenConfig::default())
    }

    pub fn with_config(types: &'a TypePool, env: &'a CompileEnv, config: CodegenConfig) -> Self {
        CodegenContext {
            types,
            env,
            config,
            remap: RemapTables::new(),
            decls: DeclRequests::default(),
            type_slots: FxHashMap::default(),
            const_slots: FxHashMap::default(),
            temp_counter: 0,
        }
    }

    /// Slot tables allocated so far.
    pub fn remap(&self) -> &RemapTables {
        &self.remap
    }

    /// Declaration requests collected so far.
    pub fn decls(&self) -> &DeclRequests {
        &self.decls
    }

    /// End the unit and hand over its artifacts.
    pub fn finish(self) -> UnitArtifacts {
        tracing::debug!(
            field_slots = self.remap.field_slots().len(),
            enum_slots = self.remap.enum_slots().len(),
            events = self.decls.events.len(),
            lambdas = self.decls.lambdas.len(),
            "finished lowering unit"
        );
        UnitArtifacts {
            remap: self.remap,
            decls: self.decls,
        }
    }

    /// Fresh script-level name for a hoisted temporary.
    ///
    /// The `#` cannot occur in script identifiers, so temporaries never
    /// shadow user variables.
    pub fn fresh_temp(&mut self) -> String {
        let n = self.temp_counter;
        self.temp_counter += 1;
        format!("#tmp{n}")
    }

    /// C++ expression naming the runtime type object for `ty`.
    pub fn type_name(&mut self, ty: TypeId) -> String {
        let next = self.type_slots.len();
        let slot = *self.type_slots.entry(ty).or_insert_with(|| {
            self.decls.types.push(ty);
            next
        });
        format!("types__CPP[{slot}]")
    }

    /// C++ expression naming the pooled constant for a literal.
    pub fn const_name(&mut self, kind: ConstKind, text: &str) -> String {
        let key = PooledConst {
            kind,
            text: text.to_owned(),
        };
        let slot = match self.const_slots.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.decls.constants.len();
                self.decls.constants.push(key.clone());
                self.const_slots.insert(key, slot);
                slot
            }
        };
        format!("const_vals__CPP[{slot}]")
    }

    /// Note that `name` must be declared as an event handler.
    pub fn register_event(&mut self, name: &str) {
        if !self.decls.events.iter().any(|e| e == name) {
            tracing::debug!(event = name, "registered event");
            self.decls.events.push(name.to_owned());
        }
    }

    /// Note that lambda `name` needs its closure class declared.
    pub fn register_lambda(&mut self, name: &str) {
        if !self.decls.lambdas.iter().any(|l| l == name) {
            tracing::debug!(lambda = name, "registered lambda");
            self.decls.lambdas.push(name.to_owned());
        }
    }

    /// Storage variable of a global, which must have been registered.
    pub fn global_storage(&self, name: &str) -> Result<&'a str, CodegenError> {
        self.env
            .global_storage(name)
            .ok_or_else(|| CodegenError::UnknownGlobal {
                name: name.to_owned(),
            })
    }
}
