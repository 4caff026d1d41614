//! Return shape classification.
//!
//! The resolver peels at most one wrapper layer from the declared return type
//! and classifies what is left, in fixed precedence:
//!
//! 1. `Page`, then `Slice` (a page is also a slice),
//! 2. `Window`,
//! 3. `Search` (search result container, or a collection of search hits),
//! 4. `Stream`,
//! 5. `Single` or `Collection`, depending on the effective domain type and
//!    the wrapper/collection nature of the declared and unwrapped types.
//!
//! Doubly wrapped return types (`Future<Option<Vec<User>>>`) are not unwrapped
//! beyond the first layer, so their element type is classified as written.

use std::fmt;
use std::sync::Arc;

use crate::catalog::{well_known, TypeCatalog};
use crate::error::MalformedReason;
use crate::type_ref::TypeRef;
use crate::wrapper::WrapperRegistry;

/// The variant of a [`ReturnShape`], without its element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// At most one result.
    Single,
    /// An eagerly materialized collection of results.
    Collection,
    /// A lazily evaluated sequence of results.
    Stream,
    /// A bounded chunk of results with total-count information.
    Page,
    /// A bounded chunk of results without total-count information.
    Slice,
    /// A scroll result carrying its continuation cursor.
    Window,
    /// Results with relevance metadata.
    Search,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::Single => "Single",
            ShapeKind::Collection => "Collection",
            ShapeKind::Stream => "Stream",
            ShapeKind::Page => "Page",
            ShapeKind::Slice => "Slice",
            ShapeKind::Window => "Window",
            ShapeKind::Search => "Search",
        };
        f.write_str(name)
    }
}

/// The canonical result shape of a query method, carrying its element type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnShape {
    /// At most one result.
    Single(TypeRef),
    /// An eagerly materialized collection of results.
    Collection(TypeRef),
    /// A lazily evaluated sequence of results.
    Stream(TypeRef),
    /// A page of results.
    Page(TypeRef),
    /// A slice of results.
    Slice(TypeRef),
    /// A scroll window of results.
    Window(TypeRef),
    /// Search results.
    Search(TypeRef),
}

impl ReturnShape {
    /// Build a shape of `kind` around `element`.
    pub fn new(kind: ShapeKind, element: TypeRef) -> Self {
        match kind {
            ShapeKind::Single => ReturnShape::Single(element),
            ShapeKind::Collection => ReturnShape::Collection(element),
            ShapeKind::Stream => ReturnShape::Stream(element),
            ShapeKind::Page => ReturnShape::Page(element),
            ShapeKind::Slice => ReturnShape::Slice(element),
            ShapeKind::Window => ReturnShape::Window(element),
            ShapeKind::Search => ReturnShape::Search(element),
        }
    }

    /// The variant tag.
    pub fn kind(&self) -> ShapeKind {
        match self {
            ReturnShape::Single(_) => ShapeKind::Single,
            ReturnShape::Collection(_) => ShapeKind::Collection,
            ReturnShape::Stream(_) => ShapeKind::Stream,
            ReturnShape::Page(_) => ShapeKind::Page,
            ReturnShape::Slice(_) => ShapeKind::Slice,
            ReturnShape::Window(_) => ShapeKind::Window,
            ReturnShape::Search(_) => ShapeKind::Search,
        }
    }

    /// The element (returned domain) type.
    pub fn element_type(&self) -> &TypeRef {
        match self {
            ReturnShape::Single(t)
            | ReturnShape::Collection(t)
            | ReturnShape::Stream(t)
            | ReturnShape::Page(t)
            | ReturnShape::Slice(t)
            | ReturnShape::Window(t)
            | ReturnShape::Search(t) => t,
        }
    }
}

impl fmt::Display for ReturnShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.kind(), self.element_type())
    }
}

/// Everything the resolver derives from a declared return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReturn {
    /// The declared return type, with generics resolved.
    pub declared: TypeRef,
    /// The declared type with at most one wrapper layer peeled.
    pub unwrapped: TypeRef,
    /// The element type the method returns.
    pub returned_domain_type: TypeRef,
    /// The entity type the method is considered to work on.
    pub domain_type: TypeRef,
    /// The classified shape.
    pub shape: ReturnShape,
}

/// Derives unwrapped return types and return shapes.
///
/// Cheap to clone; the registry and catalog are shared.
#[derive(Debug, Clone)]
pub struct ReturnShapeResolver {
    wrappers: Arc<WrapperRegistry>,
    catalog: Arc<TypeCatalog>,
}

impl Default for ReturnShapeResolver {
    fn default() -> Self {
        Self::new(
            Arc::new(WrapperRegistry::with_defaults()),
            Arc::new(TypeCatalog::with_defaults()),
        )
    }
}

impl ReturnShapeResolver {
    /// Create a resolver over the given registry and catalog.
    pub fn new(wrappers: Arc<WrapperRegistry>, catalog: Arc<TypeCatalog>) -> Self {
        Self { wrappers, catalog }
    }

    /// The wrapper registry.
    pub fn wrappers(&self) -> &WrapperRegistry {
        &self.wrappers
    }

    /// The type catalog.
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Resolve a declared return type.
    ///
    /// `repository_domain` is the repository's nominal entity type.
    /// `returned_domain` overrides the element type derivation when the
    /// metadata provider already knows it.
    pub fn resolve(
        &self,
        declared: &TypeRef,
        repository_domain: Option<&TypeRef>,
        returned_domain: Option<TypeRef>,
    ) -> Result<ResolvedReturn, MalformedReason> {
        let unwrapped = self.unwrap_return_type(declared)?;
        let returned_domain_type =
            returned_domain.unwrap_or_else(|| self.returned_domain_type(&unwrapped));
        let domain_type = self.effective_domain_type(repository_domain, &returned_domain_type);
        let kind = self.classify(declared, &unwrapped, &domain_type);
        Ok(ResolvedReturn {
            declared: declared.clone(),
            unwrapped,
            shape: ReturnShape::new(kind, returned_domain_type.clone()),
            returned_domain_type,
            domain_type,
        })
    }

    /// Peel one wrapper layer if `declared` is a registered wrapper.
    pub fn unwrap_return_type(&self, declared: &TypeRef) -> Result<TypeRef, MalformedReason> {
        self.wrappers.unwrap(declared).cloned()
    }

    /// The element type, found by peeling wrappers and containers until a
    /// plain type or a raw container is reached.
    pub fn returned_domain_type(&self, ty: &TypeRef) -> TypeRef {
        let mut current = ty;
        while self.wrappers.is_wrapper(current) || self.catalog.is_element_container(current) {
            match current.first_arg() {
                Some(inner) => current = inner,
                None => break,
            }
        }
        current.clone()
    }

    /// The method's entity type.
    ///
    /// The method's own element type wins when the repository declares no
    /// domain type or when the element type is assignable to it (a narrower
    /// entity); otherwise the repository's domain type is kept.
    pub fn effective_domain_type(
        &self,
        repository_domain: Option<&TypeRef>,
        returned_domain: &TypeRef,
    ) -> TypeRef {
        match repository_domain {
            Some(repository) if !self.catalog.is_type_assignable(repository, returned_domain) => {
                repository.clone()
            }
            _ => returned_domain.clone(),
        }
    }

    /// Classify an unwrapped return type.
    pub fn classify(
        &self,
        declared: &TypeRef,
        unwrapped: &TypeRef,
        domain: &TypeRef,
    ) -> ShapeKind {
        let name = unwrapped.simple_name();
        if self.catalog.is_assignable(well_known::PAGE, name) {
            ShapeKind::Page
        } else if self.catalog.is_assignable(well_known::SLICE, name) {
            ShapeKind::Slice
        } else if self.catalog.is_assignable(well_known::WINDOW, name) {
            ShapeKind::Window
        } else if self.is_search_result(declared, unwrapped) {
            ShapeKind::Search
        } else if self.catalog.is_assignable(well_known::STREAM, name) {
            ShapeKind::Stream
        } else if self.is_collection_result(declared, unwrapped, domain) {
            ShapeKind::Collection
        } else {
            ShapeKind::Single
        }
    }

    /// Returns true for search result containers and for collections, streams
    /// or multi-valued wrappers of search hits.
    pub fn is_search_result(&self, declared: &TypeRef, unwrapped: &TypeRef) -> bool {
        if self
            .catalog
            .is_assignable(well_known::SEARCH_RESULTS, unwrapped.simple_name())
        {
            return true;
        }
        let hit = if self.catalog.is_collection_like(unwrapped)
            || self.catalog.is_assignable(well_known::STREAM, unwrapped.simple_name())
        {
            unwrapped.first_arg()
        } else if self.wrappers.is_multi_valued(declared) {
            Some(unwrapped)
        } else {
            None
        };
        hit.is_some_and(|h| {
            self.catalog
                .is_assignable(well_known::SEARCH_RESULT, h.simple_name())
        })
    }

    /// Returns true if the result is a bulk collection rather than a single value.
    ///
    /// Multi-valued wrappers are collections even around a single entity type.
    /// Otherwise a result assignable to the domain type (after peeling
    /// optional wrappers) is a single value, and what remains depends on the
    /// unwrapped type being a multi-valued wrapper or collection-like.
    pub fn is_collection_result(
        &self,
        declared: &TypeRef,
        unwrapped: &TypeRef,
        domain: &TypeRef,
    ) -> bool {
        if self.wrappers.is_multi_valued(declared) {
            return true;
        }
        let peeled = self.wrappers.peel_optional(unwrapped);
        if self.catalog.is_type_assignable(domain, peeled) {
            return false;
        }
        if self.wrappers.is_wrapper(unwrapped) {
            return !self.wrappers.is_single_valued(unwrapped);
        }
        self.catalog.is_collection_like(unwrapped)
    }
}
