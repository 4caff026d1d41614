//! Repository-level metadata consumed while describing query methods.

use std::collections::HashMap;
use std::fmt::Debug;

use crate::signature::MethodSignature;
use crate::type_ref::TypeRef;

/// Repository information a descriptor needs from its surroundings.
///
/// Implementations are shared by every descriptor of the repository and may
/// be read from many threads.
pub trait RepositoryMetadata: Debug + Send + Sync {
    /// The repository's nominal entity type, if it declares one.
    fn domain_type(&self) -> Option<&TypeRef>;

    /// The repository interface name, if known.
    #[inline]
    fn repository_name(&self) -> Option<&str> {
        None
    }

    /// Resolve repository-level generic parameters in `ty`.
    #[inline]
    fn resolve_type(&self, ty: &TypeRef) -> TypeRef {
        ty.clone()
    }

    /// The method's return type with generics resolved.
    #[inline]
    fn return_type(&self, method: &MethodSignature) -> TypeRef {
        self.resolve_type(method.return_type())
    }

    /// The element type the method returns, if the provider already knows it.
    ///
    /// `None` lets the analyzer derive it by peeling wrappers and containers.
    #[inline]
    fn returned_domain_type(&self, _method: &MethodSignature) -> Option<TypeRef> {
        None
    }
}

/// Plain [`RepositoryMetadata`] built from a name, a domain type and generic bindings.
///
/// # Example
///
/// ```
/// use query_shape::{MethodSignature, RepositoryInfo, RepositoryMetadata, TypeRef};
///
/// let repository = RepositoryInfo::new("UserRepository")
///     .with_domain_type(TypeRef::named("User"))
///     .bind("T", TypeRef::named("User"));
///
/// let method = MethodSignature::new("find_all")
///     .returns(TypeRef::generic("Vec", [TypeRef::named("T")]));
/// assert_eq!(repository.return_type(&method).to_string(), "Vec<User>");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RepositoryInfo {
    name: Option<String>,
    domain_type: Option<TypeRef>,
    bindings: HashMap<String, TypeRef>,
}

impl RepositoryInfo {
    /// Metadata for the repository called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Metadata for a repository known only by its domain type.
    pub fn for_domain(domain_type: TypeRef) -> Self {
        Self {
            domain_type: Some(domain_type),
            ..Default::default()
        }
    }

    /// Set the nominal entity type.
    #[must_use]
    pub fn with_domain_type(mut self, domain_type: TypeRef) -> Self {
        self.domain_type = Some(domain_type);
        self
    }

    /// Bind the generic parameter `name` to `ty`.
    #[must_use]
    pub fn bind(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.bindings.insert(name.into(), ty);
        self
    }
}

impl RepositoryMetadata for RepositoryInfo {
    fn domain_type(&self) -> Option<&TypeRef> {
        self.domain_type.as_ref()
    }

    fn repository_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn resolve_type(&self, ty: &TypeRef) -> TypeRef {
        if self.bindings.is_empty() {
            ty.clone()
        } else {
            ty.substitute(&self.bindings)
        }
    }
}
