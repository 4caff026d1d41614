//! Registry of generic wrapper types around query results.
//!
//! Wrappers are containers that only change *how* a result is delivered
//! (asynchronously, optionally, reactively) and are peeled before the result
//! shape is classified. Adding a wrapper type only takes a registry entry.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::error::MalformedReason;
use crate::type_ref::TypeRef;

/// How a wrapper delivers its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapperKind {
    /// A value that may be absent.
    Optional,
    /// A value delivered later.
    Async,
    /// A reactive publisher of zero, one or many values.
    Reactive,
    /// A lazily materialized sequence of values.
    Sequence,
}

impl fmt::Display for WrapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WrapperKind::Optional => "optional",
            WrapperKind::Async => "async",
            WrapperKind::Reactive => "reactive",
            WrapperKind::Sequence => "sequence",
        };
        f.write_str(name)
    }
}

/// What the registry knows about one wrapper type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapperInfo {
    /// Delivery semantics.
    pub kind: WrapperKind,
    /// Whether the wrapper holds at most one value.
    pub single_valued: bool,
}

impl WrapperInfo {
    /// A wrapper holding at most one value.
    pub const fn single(kind: WrapperKind) -> Self {
        Self {
            kind,
            single_valued: true,
        }
    }

    /// A wrapper holding any number of values.
    pub const fn multi(kind: WrapperKind) -> Self {
        Self {
            kind,
            single_valued: false,
        }
    }
}

/// Known wrapper types, keyed by simple name.
#[derive(Debug, Clone, Default)]
pub struct WrapperRegistry {
    entries: HashMap<String, WrapperInfo>,
}

impl WrapperRegistry {
    /// A registry without any entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry with the built-in optional, async, reactive and sequence wrappers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for name in ["Option", "Optional"] {
            registry.register(name, WrapperInfo::single(WrapperKind::Optional));
        }
        for name in ["Future", "CompletableFuture", "ListenableFuture", "JoinHandle"] {
            registry.register(name, WrapperInfo::single(WrapperKind::Async));
        }
        for name in ["Mono", "Single", "Maybe"] {
            registry.register(name, WrapperInfo::single(WrapperKind::Reactive));
        }
        for name in ["Flux", "Flowable", "Observable", "Publisher"] {
            registry.register(name, WrapperInfo::multi(WrapperKind::Reactive));
        }
        registry.register("Streamable", WrapperInfo::multi(WrapperKind::Sequence));
        registry
    }

    /// Register or replace a wrapper type.
    pub fn register(&mut self, name: impl Into<String>, info: WrapperInfo) -> &mut Self {
        self.entries.insert(name.into(), info);
        self
    }

    /// Look up a wrapper by simple name.
    pub fn get(&self, name: &str) -> Option<WrapperInfo> {
        self.entries.get(name).copied()
    }

    /// Returns true if `ty` is a registered wrapper.
    pub fn is_wrapper(&self, ty: &TypeRef) -> bool {
        self.entries.contains_key(ty.simple_name())
    }

    /// Returns true if `ty` is a registered wrapper holding at most one value.
    ///
    /// Always false for types that are not wrappers.
    pub fn is_single_valued(&self, ty: &TypeRef) -> bool {
        self.get(ty.simple_name()).is_some_and(|w| w.single_valued)
    }

    /// Returns true if `ty` is a registered wrapper holding any number of values.
    pub fn is_multi_valued(&self, ty: &TypeRef) -> bool {
        self.get(ty.simple_name()).is_some_and(|w| !w.single_valued)
    }

    /// Returns true if `ty` is an optional wrapper.
    pub fn is_optional(&self, ty: &TypeRef) -> bool {
        self.get(ty.simple_name())
            .is_some_and(|w| w.kind == WrapperKind::Optional)
    }

    /// Peel exactly one wrapper layer.
    ///
    /// Non-wrapper types are returned unchanged. A wrapper without a type
    /// argument has no resolvable content and is rejected.
    pub fn unwrap<'a>(&self, ty: &'a TypeRef) -> Result<&'a TypeRef, MalformedReason> {
        if !self.is_wrapper(ty) {
            return Ok(ty);
        }
        ty.first_arg()
            .ok_or_else(|| MalformedReason::MissingTypeArgument {
                wrapper: ty.to_string(),
            })
    }

    /// Peel optional wrappers until a non-optional type is reached.
    ///
    /// A raw optional wrapper is returned as is.
    pub fn peel_optional<'a>(&self, mut ty: &'a TypeRef) -> &'a TypeRef {
        while self.is_optional(ty) {
            match ty.first_arg() {
                Some(inner) => ty = inner,
                None => break,
            }
        }
        ty
    }

    /// Iterate over all registered wrappers.
    pub fn iter(&self) -> impl Iterator<Item = (&str, WrapperInfo)> + '_ {
        self.entries.iter().map(|(name, info)| (name.as_str(), *info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> TypeRef {
        TypeRef::named("User")
    }

    #[test]
    fn test_default_entries() {
        let registry = WrapperRegistry::with_defaults();
        assert!(registry.is_single_valued(&TypeRef::generic("Future", [user()])));
        assert!(registry.is_multi_valued(&TypeRef::generic("Flux", [user()])));
        assert!(registry.is_optional(&TypeRef::generic("Option", [user()])));
        assert!(!registry.is_wrapper(&TypeRef::generic("Vec", [user()])));
        assert!(!registry.is_single_valued(&user()));
    }

    #[test]
    fn test_unwrap_peels_one_level() {
        let registry = WrapperRegistry::with_defaults();
        let inner = TypeRef::generic("Option", [user()]);
        let declared = TypeRef::generic("Future", [inner.clone()]);
        assert_eq!(registry.unwrap(&declared), Ok(&inner));
        assert_eq!(registry.unwrap(&user()), Ok(&user()));
    }

    #[test]
    fn test_unwrap_raw_wrapper_is_malformed() {
        let registry = WrapperRegistry::with_defaults();
        let raw = TypeRef::named("CompletableFuture");
        assert_eq!(
            registry.unwrap(&raw),
            Err(MalformedReason::MissingTypeArgument {
                wrapper: "CompletableFuture".to_string()
            })
        );
    }

    #[test]
    fn test_peel_optional() {
        let registry = WrapperRegistry::with_defaults();
        let nested = TypeRef::generic("Option", [TypeRef::generic("Optional", [user()])]);
        assert_eq!(registry.peel_optional(&nested), &user());
        let future = TypeRef::generic("Future", [user()]);
        assert_eq!(registry.peel_optional(&future), &future);
    }

    #[test]
    fn test_register_custom_wrapper() {
        let mut registry = WrapperRegistry::empty();
        registry.register("Uni", WrapperInfo::single(WrapperKind::Reactive));
        assert!(registry.is_wrapper(&TypeRef::generic("Uni", [user()])));
        assert_eq!(registry.iter().count(), 1);
    }
}
