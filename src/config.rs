//! Declarative analyzer configuration.
//!
//! ```toml
//! include_defaults = true
//!
//! [[wrappers]]
//! name = "Uni"
//! kind = "reactive"
//! single_valued = true
//!
//! [subtypes]
//! GeoPage = ["Page"]
//! UserPageRequest = ["Pageable"]
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::catalog::TypeCatalog;
use crate::error::ConfigError;
use crate::wrapper::{WrapperInfo, WrapperKind, WrapperRegistry};

/// One additional wrapper type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WrapperEntry {
    /// Simple name of the wrapper type.
    pub name: String,
    /// Delivery semantics.
    pub kind: WrapperKind,
    /// Whether the wrapper holds at most one value.
    pub single_valued: bool,
}

/// Extensions to the built-in wrapper registry and type catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Start from the built-in entries before applying this configuration.
    pub include_defaults: bool,
    /// Additional wrapper types.
    pub wrappers: Vec<WrapperEntry>,
    /// Additional subtype declarations: type name to its supertypes.
    pub subtypes: BTreeMap<String, Vec<String>>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            include_defaults: true,
            wrappers: Vec::new(),
            subtypes: BTreeMap::new(),
        }
    }
}

impl AnalyzerConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// The wrapper registry described by this configuration.
    pub fn wrapper_registry(&self) -> WrapperRegistry {
        let mut registry = if self.include_defaults {
            WrapperRegistry::with_defaults()
        } else {
            WrapperRegistry::empty()
        };
        for entry in &self.wrappers {
            registry.register(
                entry.name.clone(),
                WrapperInfo {
                    kind: entry.kind,
                    single_valued: entry.single_valued,
                },
            );
        }
        registry
    }

    /// The type catalog described by this configuration.
    pub fn type_catalog(&self) -> TypeCatalog {
        let mut catalog = if self.include_defaults {
            TypeCatalog::with_defaults()
        } else {
            TypeCatalog::empty()
        };
        for (subtype, supertypes) in &self.subtypes {
            catalog.register(subtype.clone(), supertypes.iter().cloned());
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeRef;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_document() {
        let config = AnalyzerConfig::from_toml_str(
            r#"
            [[wrappers]]
            name = "Uni"
            kind = "reactive"
            single_valued = true

            [subtypes]
            GeoPage = ["Page"]
            "#,
        )
        .unwrap();

        assert!(config.include_defaults);
        assert_eq!(
            config.wrappers,
            vec![WrapperEntry {
                name: "Uni".to_string(),
                kind: WrapperKind::Reactive,
                single_valued: true,
            }]
        );

        let registry = config.wrapper_registry();
        assert!(registry.is_single_valued(&TypeRef::generic("Uni", [TypeRef::named("User")])));
        assert!(registry.is_wrapper(&TypeRef::generic("Future", [TypeRef::named("User")])));

        let catalog = config.type_catalog();
        assert!(catalog.is_assignable("Slice", "GeoPage"));
    }

    #[test]
    fn test_without_defaults() {
        let config = AnalyzerConfig::from_toml_str("include_defaults = false").unwrap();
        assert_eq!(config.wrapper_registry().iter().count(), 0);
        assert!(!config.type_catalog().is_assignable("Slice", "Page"));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = AnalyzerConfig::from_toml_str("wrapper = []").unwrap_err();
        assert!(err.to_string().starts_with("invalid analyzer configuration"));
    }

    #[test]
    fn test_rejects_unknown_wrapper_kind() {
        let result = AnalyzerConfig::from_toml_str(
            r#"
            [[wrappers]]
            name = "Lazy"
            kind = "deferred"
            single_valued = true
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }
}
