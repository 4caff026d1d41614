//! Nominal subtype hierarchy used for assignability checks.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::type_ref::{TypeRef, ARRAY_NAME};

/// Names of the marker types the classifier and validator rely on.
pub mod well_known {
    /// Root of all iterable containers.
    pub const ITERABLE: &str = "Iterable";
    /// Eagerly materialized collections.
    pub const COLLECTION: &str = "Collection";
    /// Iterable result containers with streaming helpers.
    pub const STREAMABLE: &str = "Streamable";
    /// Bounded result container with total-count information.
    pub const PAGE: &str = "Page";
    /// Bounded result container without total-count information.
    pub const SLICE: &str = "Slice";
    /// Scroll result carrying its own continuation cursor.
    pub const WINDOW: &str = "Window";
    /// Search result container with relevance metadata.
    pub const SEARCH_RESULTS: &str = "SearchResults";
    /// A single search hit.
    pub const SEARCH_RESULT: &str = "SearchResult";
    /// Lazily evaluated sequence.
    pub const STREAM: &str = "Stream";
    /// Pagination request parameter.
    pub const PAGEABLE: &str = "Pageable";
    /// Ordering parameter.
    pub const SORT: &str = "Sort";
    /// Result-count cap parameter.
    pub const LIMIT: &str = "Limit";
    /// Scroll cursor parameter.
    pub const SCROLL_POSITION: &str = "ScrollPosition";
}

use well_known::*;

/// The declared subtype relation between type names.
///
/// Assignability is reflexive and transitive: `Page` is assignable to
/// `Slice`, `Streamable` and `Iterable` with the default entries.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    supertypes: HashMap<String, Vec<String>>,
}

impl TypeCatalog {
    /// An empty catalog without any built-in entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A catalog pre-populated with the built-in container and parameter types.
    pub fn with_defaults() -> Self {
        let mut catalog = Self::empty();
        catalog.register(COLLECTION, [ITERABLE]);
        for collection in [
            "List",
            "Set",
            "Vec",
            "VecDeque",
            "LinkedList",
            "HashSet",
            "BTreeSet",
            "IndexSet",
            "SmallVec",
            "Deque",
            "Queue",
            "SortedSet",
        ] {
            catalog.register(collection, [COLLECTION]);
        }
        catalog.register(STREAMABLE, [ITERABLE]);
        catalog.register(SLICE, [STREAMABLE]);
        catalog.register(PAGE, [SLICE]);
        catalog.register(WINDOW, [STREAMABLE]);
        catalog.register(SEARCH_RESULTS, [STREAMABLE]);
        catalog.register("Iterator", [STREAM]);
        catalog.register("BoxStream", [STREAM]);
        catalog.register("PageRequest", [PAGEABLE]);
        catalog.register("KeysetScrollPosition", [SCROLL_POSITION]);
        catalog.register("OffsetScrollPosition", [SCROLL_POSITION]);
        catalog
    }

    /// Declare `subtype` as assignable to each of `supertypes`.
    ///
    /// Registering the same pair twice is a no-op.
    pub fn register<I, S>(&mut self, subtype: impl Into<String>, supertypes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.supertypes.entry(subtype.into()).or_default();
        for supertype in supertypes {
            let supertype = supertype.into();
            if !entry.contains(&supertype) {
                entry.push(supertype);
            }
        }
        self
    }

    /// Direct supertypes of `name`.
    pub fn supertypes_of(&self, name: &str) -> &[String] {
        self.supertypes.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if a value of type `source` can be used where `target` is expected.
    pub fn is_assignable(&self, target: &str, source: &str) -> bool {
        if target == source {
            return true;
        }
        let mut seen = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([source]);
        while let Some(current) = queue.pop_front() {
            for supertype in self.supertypes_of(current) {
                if supertype == target {
                    return true;
                }
                if seen.insert(supertype.as_str()) {
                    queue.push_back(supertype);
                }
            }
        }
        false
    }

    /// [`is_assignable`](Self::is_assignable) on the simple names of two types.
    pub fn is_type_assignable(&self, target: &TypeRef, source: &TypeRef) -> bool {
        self.is_assignable(target.simple_name(), source.simple_name())
    }

    /// Returns true for arrays, `Iterable` itself, and anything assignable to
    /// `Collection` or `Streamable`.
    pub fn is_collection_like(&self, ty: &TypeRef) -> bool {
        let name = ty.simple_name();
        name == ARRAY_NAME
            || name == ITERABLE
            || self.is_assignable(COLLECTION, name)
            || self.is_assignable(STREAMABLE, name)
    }

    /// Returns true if the element type of `ty` lives in its first type argument
    /// for non-wrapper reasons: collections, result containers, streams, and
    /// search hits.
    pub fn is_element_container(&self, ty: &TypeRef) -> bool {
        self.is_collection_like(ty)
            || self.is_assignable(STREAM, ty.simple_name())
            || self.is_assignable(SEARCH_RESULT, ty.simple_name())
    }
}
