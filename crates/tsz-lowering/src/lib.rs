//! The syntax-lowering engine (`spec.md` §4).
//!
//! Stateless between top-level statements except for the shared symbol
//! table, a counter for generated temporaries, and one-shot module-scope
//! slots for helper references (`spec.md` §2, §5). Grounded on the
//! teacher's ES5-lowering helpers (`tsz-emitter::emitter::es5_helpers*`,
//! `es5_bindings*`, `declarations_class_members`), generalized from
//! "print ES5 text directly" to "build and return a new AST node", matching
//! this spec's external interface (`spec.md` §6).

pub mod assignment_operator;
pub mod async_fn;
pub mod class_lowering;
pub mod logical_assign;
pub mod nullish;
pub mod object_rest;
pub mod object_spread;
pub mod optional_chain;
pub mod private_members;
pub mod runtime_calls;
pub mod temp;

use tsz_ast::{Feature, FeatureGate, SymbolKind, SymbolRef, SymbolTable};
use tsz_common::diagnostics::{codes, DiagnosticBag};
use tsz_common::span::Span;

pub use temp::Capture;

/// Which wrapping operation the caller's output is ultimately bound for.
/// Determines whether top-level `await` is transformable
/// (`spec.md` §4, §7: "top-level await in incompatible output modes").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Normal,
    Bundle,
    ConvertFormat,
}

/// Shared mutable state for one file/module's lowering pass
/// (`spec.md` §5 "Shared state, per instance").
pub struct LoweringContext {
    pub symbols: SymbolTable,
    pub gate: FeatureGate,
    pub diagnostics: DiagnosticBag,
    pub output_mode: OutputMode,
    /// Whether the surrounding output is strict-mode code. Optional-chain
    /// null checks compare against `null`/`void 0` with `===` in strict
    /// mode and `==` in loose mode (`spec.md` §4.3 step 7).
    pub strict_mode: bool,
    module_scope: u32,
    temp_scope_stack: Vec<u32>,
    helpers: rustc_hash::FxHashMap<&'static str, SymbolRef>,
    weak_map_ref: Option<SymbolRef>,
    weak_set_ref: Option<SymbolRef>,
    arguments_ref: Option<SymbolRef>,
}

impl LoweringContext {
    #[must_use]
    pub fn new(gate: FeatureGate) -> Self {
        let mut symbols = SymbolTable::new();
        let module_scope = 0; // SymbolTable::new() pre-allocates scope 0.
        let _ = &mut symbols;
        Self {
            symbols,
            gate,
            diagnostics: DiagnosticBag::new(),
            output_mode: OutputMode::Normal,
            strict_mode: false,
            module_scope,
            temp_scope_stack: vec![module_scope],
            helpers: rustc_hash::FxHashMap::default(),
            weak_map_ref: None,
            weak_set_ref: None,
            arguments_ref: None,
        }
    }

    #[must_use]
    pub fn module_scope(&self) -> u32 {
        self.module_scope
    }

    /// The scope new temporaries for the subtree currently being lowered
    /// should be allocated in (top of the scope stack).
    #[must_use]
    pub fn current_scope(&self) -> u32 {
        *self.temp_scope_stack.last().unwrap_or(&self.module_scope)
    }

    /// Enter a fresh function/arrow scope, returning its index.
    pub fn push_function_scope(&mut self) -> u32 {
        let scope = self.symbols.push_scope();
        self.temp_scope_stack.push(scope);
        scope
    }

    pub fn pop_function_scope(&mut self) {
        self.temp_scope_stack.pop();
    }

    /// Lazily materialize the module-scope `WeakMap` reference used by
    /// private-field lowering (`spec.md` §4.6, §5).
    pub fn weak_map_ref(&mut self) -> SymbolRef {
        if let Some(r) = self.weak_map_ref {
            return r;
        }
        let r = self.symbols.new_symbol(self.module_scope, SymbolKind::Hoisted, "WeakMap");
        self.weak_map_ref = Some(r);
        r
    }

    /// Lazily materialize the module-scope `WeakSet` reference used by
    /// private-method lowering (`spec.md` §4.6, §5).
    pub fn weak_set_ref(&mut self) -> SymbolRef {
        if let Some(r) = self.weak_set_ref {
            return r;
        }
        let r = self.symbols.new_symbol(self.module_scope, SymbolKind::Hoisted, "WeakSet");
        self.weak_set_ref = Some(r);
        r
    }

    /// Lazily materialize the `arguments` reference used when forwarding
    /// complex async-function parameters (`spec.md` §4.10, §5).
    pub fn arguments_ref(&mut self) -> SymbolRef {
        if let Some(r) = self.arguments_ref {
            return r;
        }
        let r = self.symbols.new_symbol(self.module_scope, SymbolKind::Unbound, "arguments");
        self.arguments_ref = Some(r);
        r
    }

    /// Record a reference to a runtime helper by name, creating its
    /// module-scope symbol the first time it is used
    /// (`spec.md` §6 "Runtime-helper ABI").
    pub fn helper_ref(&mut self, name: &'static str) -> SymbolRef {
        if let Some(r) = self.helpers.get(name) {
            return *r;
        }
        let r = self.symbols.new_symbol(self.module_scope, SymbolKind::Hoisted, name);
        self.helpers.insert(name, r);
        r
    }

    /// Record a diagnostic if `feature` cannot be transformed away, per
    /// `spec.md` §6 `markSyntaxFeature` / §7 "Untransformable feature".
    /// Returns `true` iff a diagnostic was actually pushed.
    pub fn mark_syntax_feature(&mut self, feature: Feature, span: Span) -> bool {
        let (code, message): (u32, &str) = match feature {
            Feature::BIG_INT => (codes::UNTRANSFORMABLE_FEATURE, "BigInt literals cannot be lowered"),
            Feature::IMPORT_META => (codes::UNTRANSFORMABLE_FEATURE, "import.meta cannot be lowered"),
            Feature::TOP_LEVEL_AWAIT if self.output_mode != OutputMode::Normal => {
                (codes::UNTRANSFORMABLE_FEATURE, "top-level await is not supported for this output mode")
            }
            _ => {
                tracing::trace!(?feature, "feature is lowerable, no diagnostic recorded");
                return false;
            }
        };
        tracing::warn!(code, ?span, message, "syntax feature cannot be transformed away");
        self.diagnostics.push_error(code, span, message);
        true
    }
}
