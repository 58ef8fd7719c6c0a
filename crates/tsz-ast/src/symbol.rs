//! Symbol table ("spec.md" §3 Symbol, §4.2) and the temporary-symbol
//! allocator.
//!
//! Modeled on the teacher's `tsz-binder` split between a flat backing store
//! and a small copyable handle (there: `SymbolId`/`SymbolArena`). Here the
//! table is organized as scopes of symbols — `SymbolRef` is the `(outer,
//! inner)` pair `spec.md` describes, `outer` selecting the scope and `inner`
//! selecting the symbol within it.

use rustc_hash::FxHashMap;

/// An opaque, comparable handle into a [`SymbolTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SymbolRef {
    outer: u32,
    inner: u32,
}

impl SymbolRef {
    const INVALID: Self = Self { outer: u32::MAX, inner: u32::MAX };

    #[must_use]
    pub const fn new(outer: u32, inner: u32) -> Self {
        Self { outer, inner }
    }

    #[must_use]
    pub const fn invalid() -> Self {
        Self::INVALID
    }

    #[must_use]
    pub const fn is_invalid(self) -> bool {
        self.outer == u32::MAX && self.inner == u32::MAX
    }
}

impl Default for SymbolRef {
    fn default() -> Self {
        Self::invalid()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Hoisted,
    Other,
    Unbound,
    Import,
    PrivateField,
    PrivateMethod,
    PrivateStaticMethod,
    PrivateGet,
    PrivateStaticGet,
    PrivateSet,
    PrivateStaticSet,
    PrivateGetSetPair,
    PrivateStaticGetSetPair,
}

impl SymbolKind {
    #[must_use]
    pub const fn is_private(self) -> bool {
        !matches!(self, Self::Hoisted | Self::Other | Self::Unbound | Self::Import)
    }

    #[must_use]
    pub const fn is_static(self) -> bool {
        matches!(
            self,
            Self::PrivateStaticMethod
                | Self::PrivateStaticGet
                | Self::PrivateStaticSet
                | Self::PrivateStaticGetSetPair
        )
    }

    #[must_use]
    pub const fn has_getter(self) -> bool {
        matches!(self, Self::PrivateGet | Self::PrivateStaticGet | Self::PrivateGetSetPair | Self::PrivateStaticGetSetPair)
    }

    #[must_use]
    pub const fn has_setter(self) -> bool {
        matches!(self, Self::PrivateSet | Self::PrivateStaticSet | Self::PrivateGetSetPair | Self::PrivateStaticGetSetPair)
    }
}

/// Decl-mode hint for [`SymbolTable::generate_temp_ref`] (`spec.md` §4.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclMode {
    /// The caller's enclosing function/module scope must later emit a `var`
    /// declaration for this temporary.
    NeedsDeclare,
    /// The caller itself emits a binding for this temporary (e.g. a
    /// destructuring formal parameter name).
    NoDeclare,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub original_name: String,
    pub kind: SymbolKind,
    /// Either `SymbolRef::invalid()` or the symbol this one is aliased to
    /// for reference rewriting. Never chains more than one hop
    /// (`spec.md` §3 invariant).
    pub link: SymbolRef,
    pub estimated_use_count: u32,
    pub needs_declare: bool,
}

/// The symbol table for one file/module (`spec.md` §3 Lifecycles).
#[derive(Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<Vec<Symbol>>,
    next_temp_id: u32,
    /// Entries for every symbol of kind `Private{Static,}Get{SetPair,}`
    /// (`spec.md` §3 invariant on `getter_ref`).
    getter_ref: FxHashMap<SymbolRef, SymbolRef>,
    /// Entries for every symbol of kind `Private{Static,}Set{SetPair,}`.
    setter_ref: FxHashMap<SymbolRef, SymbolRef>,
    /// For a `PrivateMethod`/`PrivateStaticMethod` symbol (which otherwise
    /// doubles as its class's per-member `WeakSet` tag), the module-scope
    /// symbol holding the shared implementation function.
    fn_ref: FxHashMap<SymbolRef, SymbolRef>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        let mut table = Self::default();
        table.scopes.push(Vec::new());
        table
    }

    /// Allocate a new scope (e.g. for a function/module), returning its
    /// index for use as the `outer` half of future `SymbolRef`s.
    pub fn push_scope(&mut self) -> u32 {
        self.scopes.push(Vec::new());
        (self.scopes.len() - 1) as u32
    }

    /// Register a brand-new, non-temporary symbol in the given scope.
    pub fn new_symbol(&mut self, scope: u32, kind: SymbolKind, name: impl Into<String>) -> SymbolRef {
        let scope_vec = &mut self.scopes[scope as usize];
        let idx = scope_vec.len() as u32;
        scope_vec.push(Symbol {
            original_name: name.into(),
            kind,
            link: SymbolRef::invalid(),
            estimated_use_count: 0,
            needs_declare: false,
        });
        SymbolRef::new(scope, idx)
    }

    pub fn record_usage(&mut self, r: SymbolRef) {
        if let Some(sym) = self.get_mut(r) {
            sym.estimated_use_count += 1;
        }
    }

    #[must_use]
    pub fn get(&self, r: SymbolRef) -> Option<&Symbol> {
        self.scopes.get(r.outer as usize)?.get(r.inner as usize)
    }

    pub fn get_mut(&mut self, r: SymbolRef) -> Option<&mut Symbol> {
        self.scopes.get_mut(r.outer as usize)?.get_mut(r.inner as usize)
    }

    /// Resolve a symbol's link field. Follow-once: the result is never
    /// itself linked (`spec.md` §3 invariant, §9 Design Notes).
    #[must_use]
    pub fn resolve(&self, r: SymbolRef) -> SymbolRef {
        match self.get(r) {
            Some(sym) if !sym.link.is_invalid() => sym.link,
            _ => r,
        }
    }

    /// Alias `from` to `to` for name rewriting. Panics if `to` is itself
    /// linked — the invariant forbids multi-hop chains.
    pub fn set_link(&mut self, from: SymbolRef, to: SymbolRef) {
        debug_assert!(
            self.get(to).is_none_or(|s| s.link.is_invalid()),
            "symbol link chains must be at most one hop"
        );
        if let Some(sym) = self.get_mut(from) {
            sym.link = to;
        }
    }

    /// Allocate a uniquely-numbered synthetic temporary symbol
    /// (`spec.md` §4.2 `generateTempRef`).
    pub fn generate_temp_ref(&mut self, scope: u32, mode: DeclMode, name_hint: Option<&str>) -> SymbolRef {
        let id = self.next_temp_id;
        self.next_temp_id += 1;
        let name = match name_hint {
            Some(hint) => format!("_{hint}_{id}"),
            None => format!("_tmp{id}"),
        };
        let r = self.new_symbol(scope, SymbolKind::Other, name);
        if let Some(sym) = self.get_mut(r) {
            sym.needs_declare = mode == DeclMode::NeedsDeclare;
        }
        r
    }

    pub fn register_getter(&mut self, accessor: SymbolRef, tag: SymbolRef) {
        self.getter_ref.insert(accessor, tag);
    }

    pub fn register_setter(&mut self, accessor: SymbolRef, tag: SymbolRef) {
        self.setter_ref.insert(accessor, tag);
    }

    #[must_use]
    pub fn getter_tag(&self, accessor: SymbolRef) -> Option<SymbolRef> {
        self.getter_ref.get(&accessor).copied()
    }

    #[must_use]
    pub fn setter_tag(&self, accessor: SymbolRef) -> Option<SymbolRef> {
        self.setter_ref.get(&accessor).copied()
    }

    pub fn register_fn(&mut self, method: SymbolRef, implementation: SymbolRef) {
        self.fn_ref.insert(method, implementation);
    }

    #[must_use]
    pub fn fn_ref(&self, method: SymbolRef) -> Option<SymbolRef> {
        self.fn_ref.get(&method).copied()
    }

    #[must_use]
    pub fn name_of(&self, r: SymbolRef) -> &str {
        self.get(r).map_or("", |s| s.original_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_resolution_is_single_hop() {
        let mut table = SymbolTable::new();
        let a = table.new_symbol(0, SymbolKind::Other, "a");
        let b = table.new_symbol(0, SymbolKind::Other, "b");
        table.set_link(a, b);
        assert_eq!(table.resolve(a), b);
        assert_eq!(table.resolve(b), b, "unlinked symbol resolves to itself");
    }

    #[test]
    fn temp_refs_get_unique_numbered_names() {
        let mut table = SymbolTable::new();
        let t1 = table.generate_temp_ref(0, DeclMode::NeedsDeclare, None);
        let t2 = table.generate_temp_ref(0, DeclMode::NeedsDeclare, None);
        assert_ne!(table.name_of(t1), table.name_of(t2));
    }

    #[test]
    fn invalid_ref_is_distinguishable_from_any_real_ref() {
        let mut table = SymbolTable::new();
        let a = table.new_symbol(0, SymbolKind::Other, "a");
        assert!(SymbolRef::invalid().is_invalid());
        assert!(!a.is_invalid());
    }

    #[test]
    fn getter_setter_maps_round_trip() {
        let mut table = SymbolTable::new();
        let getter = table.new_symbol(0, SymbolKind::PrivateGetSetPair, "#x");
        let tag = table.new_symbol(0, SymbolKind::Other, "_x_tag");
        table.register_getter(getter, tag);
        table.register_setter(getter, tag);
        assert_eq!(table.getter_tag(getter), Some(tag));
        assert_eq!(table.setter_tag(getter), Some(tag));
    }
}
