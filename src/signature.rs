//! Raw method signatures, as supplied by a signature source.

use std::fmt;

use crate::type_ref::TypeRef;

/// A parameter as declared, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclaredParameter {
    /// The declared name, if the source provides one.
    pub name: Option<String>,
    /// The declared type.
    pub ty: TypeRef,
}

impl DeclaredParameter {
    /// Create a declared parameter.
    pub fn new(name: Option<&str>, ty: TypeRef) -> Self {
        Self {
            name: name.map(str::to_string),
            ty,
        }
    }
}

/// Identity of a method within one repository: its name and parameter types.
///
/// Overloads with different parameter types have different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodKey(String);

impl MethodKey {
    /// The key as a string, e.g. `find_by_name(String, Pageable)`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A declared data-access method: name, ordered parameters and return type.
///
/// # Example
///
/// ```
/// use query_shape::{MethodSignature, TypeRef};
///
/// let signature = MethodSignature::new("find_all")
///     .declared_in("UserRepository")
///     .param("page", TypeRef::named("Pageable"))
///     .returns(TypeRef::generic("Page", [TypeRef::named("User")]));
///
/// assert_eq!(
///     signature.to_string(),
///     "UserRepository::find_all(page: Pageable) -> Page<User>"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    name: String,
    declaring_type: Option<String>,
    parameters: Vec<DeclaredParameter>,
    return_type: TypeRef,
}

impl MethodSignature {
    /// A method without parameters returning `()`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declaring_type: None,
            parameters: Vec::new(),
            return_type: TypeRef::unit(),
        }
    }

    /// Set the name of the repository type declaring the method.
    #[must_use]
    pub fn declared_in(mut self, declaring_type: impl Into<String>) -> Self {
        self.declaring_type = Some(declaring_type.into());
        self
    }

    /// Append a named parameter.
    #[must_use]
    pub fn param(mut self, name: impl AsRef<str>, ty: TypeRef) -> Self {
        self.parameters
            .push(DeclaredParameter::new(Some(name.as_ref()), ty));
        self
    }

    /// Append a parameter without a name.
    #[must_use]
    pub fn unnamed_param(mut self, ty: TypeRef) -> Self {
        self.parameters.push(DeclaredParameter::new(None, ty));
        self
    }

    /// Set the declared return type.
    #[must_use]
    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.return_type = ty;
        self
    }

    /// The method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declaring repository type, if known.
    pub fn declaring_type(&self) -> Option<&str> {
        self.declaring_type.as_deref()
    }

    /// Declared parameters, in order.
    pub fn parameters(&self) -> &[DeclaredParameter] {
        &self.parameters
    }

    /// The declared return type.
    pub fn return_type(&self) -> &TypeRef {
        &self.return_type
    }

    /// The method's identity within its repository.
    pub fn key(&self) -> MethodKey {
        let types = self
            .parameters
            .iter()
            .map(|p| p.ty.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        MethodKey(format!("{}({})", self.name, types))
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(declaring) = &self.declaring_type {
            write!(f, "{}::", declaring)?;
        }
        write!(f, "{}(", self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match &param.name {
                Some(name) => write!(f, "{}: {}", name, param.ty)?,
                None => write!(f, "{}", param.ty)?,
            }
        }
        f.write_str(")")?;
        if !self.return_type.is_unit() {
            write!(f, " -> {}", self.return_type)?;
        }
        Ok(())
    }
}
