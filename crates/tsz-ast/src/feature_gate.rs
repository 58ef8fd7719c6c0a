//! Feature gate — the single oracle for "must lower X?" (`spec.md` §4.1).
//!
//! Modeled on the teacher's `FileFeatures(u8)` bitset
//! (`tsz-binder::state::FileFeatures`), widened to a `u64` backing store
//! because this enumeration has more than eight members.

use bitflags::bitflags;

bitflags! {
    /// Features the target environment *lacks*. A set bit means "this
    /// feature must be lowered"; an unset bit means the target supports it
    /// natively.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct Feature: u64 {
        const DEFAULT_ARGUMENT            = 1 << 0;
        const REST_ARGUMENT                = 1 << 1;
        const ARRAY_SPREAD                  = 1 << 2;
        const FOR_OF                        = 1 << 3;
        const OBJECT_ACCESSORS              = 1 << 4;
        const OBJECT_EXTENSIONS             = 1 << 5;
        const TEMPLATE_LITERAL              = 1 << 6;
        const DESTRUCTURING                 = 1 << 7;
        const NEW_TARGET                    = 1 << 8;
        const CONST                         = 1 << 9;
        const LET                           = 1 << 10;
        const ARROW                        = 1 << 11;
        const CLASS                        = 1 << 12;
        const GENERATOR                     = 1 << 13;
        const ASYNC_AWAIT                   = 1 << 14;
        const ASYNC_GENERATOR               = 1 << 15;
        const FOR_AWAIT                     = 1 << 16;
        const NESTED_REST_BINDING           = 1 << 17;
        const TOP_LEVEL_AWAIT               = 1 << 18;
        const BIG_INT                       = 1 << 19;
        const IMPORT_META                   = 1 << 20;
        const OPTIONAL_CHAIN                = 1 << 21;
        const NULLISH_COALESCING            = 1 << 22;
        const OBJECT_REST_SPREAD            = 1 << 23;
        const CLASS_FIELD                   = 1 << 24;
        const CLASS_STATIC_FIELD            = 1 << 25;
        const CLASS_PRIVATE_FIELD           = 1 << 26;
        const CLASS_PRIVATE_STATIC_FIELD    = 1 << 27;
        const CLASS_PRIVATE_METHOD          = 1 << 28;
        const CLASS_PRIVATE_STATIC_METHOD   = 1 << 29;
        const CLASS_PRIVATE_ACCESSOR        = 1 << 30;
        const CLASS_PRIVATE_STATIC_ACCESSOR = 1 << 31;
        const EXPONENT                      = 1 << 32;
    }
}

/// An immutable view of which features the target lacks.
///
/// Construction is the only way to populate a `FeatureGate`; there is no
/// mutation afterward (`spec.md` §4.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FeatureGate {
    unsupported: Feature,
}

impl FeatureGate {
    #[must_use]
    pub const fn new(unsupported: Feature) -> Self {
        Self { unsupported }
    }

    /// A gate where nothing needs lowering (every feature is supported).
    #[must_use]
    pub const fn all_supported() -> Self {
        Self { unsupported: Feature::empty() }
    }

    /// Does the target lack `feature` (so it must be lowered)?
    #[must_use]
    pub const fn has(self, feature: Feature) -> bool {
        self.unsupported.intersects(feature)
    }

    /// Does the target lack *any* feature in `mask`?
    #[must_use]
    pub const fn any(self, mask: Feature) -> bool {
        self.unsupported.intersects(mask)
    }

    /// Build a gate from a simple "is this an ES5-class target" switch,
    /// matching the teacher's `ScriptTarget::supports_es2015`-style helpers
    /// (`tsz_common`-adjacent convenience; additive, not a replacement for
    /// the bit-set constructor).
    #[must_use]
    pub const fn es5_target() -> Self {
        Self::new(Feature::all())
    }
}
