//! The validated, immutable description of one query method.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::metadata::RepositoryMetadata;
use crate::parameter::ParameterList;
use crate::shape::{ResolvedReturn, ReturnShape, ReturnShapeResolver, ShapeKind};
use crate::signature::MethodSignature;
use crate::type_ref::TypeRef;

/// The entity a query method works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityInformation {
    domain_type: TypeRef,
}

impl EntityInformation {
    /// The entity type.
    pub fn domain_type(&self) -> &TypeRef {
        &self.domain_type
    }

    /// The entity's simple name.
    pub fn entity_name(&self) -> &str {
        self.domain_type.simple_name()
    }
}

/// A query method signature classified into its result shape and validated.
///
/// Built once per declared method by
/// [`QueryMethodAnalyzer::describe`](crate::QueryMethodAnalyzer::describe) and
/// never mutated afterwards. Derived values are computed on first access and
/// cached; concurrent first accesses compute the same value and only one is
/// kept.
pub struct QueryMethodDescriptor {
    signature: MethodSignature,
    metadata: Arc<dyn RepositoryMetadata>,
    parameters: ParameterList,
    resolved: ResolvedReturn,
    resolver: ReturnShapeResolver,
    collection_like: OnceCell<bool>,
    entity_result: OnceCell<bool>,
    query_identifier: OnceCell<String>,
}

impl QueryMethodDescriptor {
    pub(crate) fn new(
        signature: MethodSignature,
        metadata: Arc<dyn RepositoryMetadata>,
        parameters: ParameterList,
        resolved: ResolvedReturn,
        resolver: ReturnShapeResolver,
    ) -> Self {
        Self {
            signature,
            metadata,
            parameters,
            resolved,
            resolver,
            collection_like: OnceCell::new(),
            entity_result: OnceCell::new(),
            query_identifier: OnceCell::new(),
        }
    }

    /// The method name.
    pub fn name(&self) -> &str {
        self.signature.name()
    }

    /// The raw method signature.
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// The repository metadata this method was described against.
    pub fn metadata(&self) -> &Arc<dyn RepositoryMetadata> {
        &self.metadata
    }

    /// The classified parameters.
    pub fn parameters(&self) -> &ParameterList {
        &self.parameters
    }

    /// The resolved return shape.
    pub fn return_shape(&self) -> &ReturnShape {
        &self.resolved.shape
    }

    /// The variant of the return shape.
    pub fn shape_kind(&self) -> ShapeKind {
        self.resolved.shape.kind()
    }

    /// The declared return type, with repository generics resolved.
    pub fn declared_return_type(&self) -> &TypeRef {
        &self.resolved.declared
    }

    /// The return type with at most one wrapper layer peeled.
    pub fn unwrapped_return_type(&self) -> &TypeRef {
        &self.resolved.unwrapped
    }

    /// The effective entity type of this method.
    pub fn domain_type(&self) -> &TypeRef {
        &self.resolved.domain_type
    }

    /// The element type the method returns.
    pub fn returned_object_type(&self) -> &TypeRef {
        &self.resolved.returned_domain_type
    }

    /// The entity this method works on.
    pub fn entity_information(&self) -> EntityInformation {
        EntityInformation {
            domain_type: self.domain_type().clone(),
        }
    }

    /// Returns true if the method returns a bulk collection of results.
    ///
    /// Pages, slices and windows are result containers of their own and are
    /// never reported as collections.
    pub fn is_collection_like(&self) -> bool {
        *self.collection_like.get_or_init(|| match self.shape_kind() {
            ShapeKind::Page | ShapeKind::Slice | ShapeKind::Window | ShapeKind::Single => false,
            ShapeKind::Collection => true,
            ShapeKind::Stream | ShapeKind::Search => self.resolver.is_collection_result(
                &self.resolved.declared,
                &self.resolved.unwrapped,
                &self.resolved.domain_type,
            ),
        })
    }

    /// Returns true if the method returns a page.
    pub fn is_page_result(&self) -> bool {
        self.shape_kind() == ShapeKind::Page
    }

    /// Returns true if the method returns a slice that is not a page.
    pub fn is_slice_result(&self) -> bool {
        self.shape_kind() == ShapeKind::Slice
    }

    /// Returns true if the method returns a scroll window.
    pub fn is_window_result(&self) -> bool {
        self.shape_kind() == ShapeKind::Window
    }

    /// Returns true if the method returns search results.
    pub fn is_search_result(&self) -> bool {
        self.shape_kind() == ShapeKind::Search
    }

    /// Returns true if the method returns a lazy stream.
    pub fn is_stream_result(&self) -> bool {
        self.shape_kind() == ShapeKind::Stream
    }

    /// Returns true if the method returns entities rather than projections.
    pub fn represents_entity_result(&self) -> bool {
        *self.entity_result.get_or_init(|| {
            self.resolver
                .catalog()
                .is_type_assignable(self.domain_type(), self.returned_object_type())
        })
    }

    /// Lookup key for externally declared named queries: `Entity.method`.
    pub fn derived_query_identifier(&self) -> &str {
        self.query_identifier
            .get_or_init(|| format!("{}.{}", self.domain_type().simple_name(), self.name()))
    }
}

impl fmt::Debug for QueryMethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryMethodDescriptor")
            .field("signature", &self.signature)
            .field("parameters", &self.parameters)
            .field("shape", &self.resolved.shape)
            .field("domain_type", &self.resolved.domain_type)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for QueryMethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.signature, f)
    }
}

/// A query method, possibly specialised by the persistence technology.
///
/// Wrappers around a [`QueryMethodDescriptor`] implement this trait to
/// override behaviour the generic descriptor cannot know, such as whether the
/// method writes.
pub trait QueryMethod {
    /// The underlying descriptor.
    fn descriptor(&self) -> &QueryMethodDescriptor;

    /// Returns true if the method modifies data (deletes, updates).
    #[inline]
    fn is_modifying(&self) -> bool {
        false
    }

    /// The method name.
    #[inline]
    fn name(&self) -> &str {
        self.descriptor().name()
    }
}

impl QueryMethod for QueryMethodDescriptor {
    fn descriptor(&self) -> &QueryMethodDescriptor {
        self
    }
}
