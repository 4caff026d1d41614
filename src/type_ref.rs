//! Declared types as they appear in a method signature.

use std::collections::HashMap;
use std::fmt;

/// Pseudo-name used for arrays and slices (`[User]`, `[User; 4]`, `&[User]`).
pub const ARRAY_NAME: &str = "[]";

/// Pseudo-name used for the unit type `()`.
pub const UNIT_NAME: &str = "()";

/// A declared type together with its generic type arguments.
///
/// Types are identified by their *simple name* (the last path segment) for all
/// classification purposes, so `crate::domain::Page<User>` and `Page<User>`
/// describe the same container. The full path is kept for display only.
///
/// # Example
///
/// ```
/// use query_shape::TypeRef;
///
/// let ty = TypeRef::generic("Future", [TypeRef::generic("Vec", [TypeRef::named("User")])]);
/// assert_eq!(ty.simple_name(), "Future");
/// assert_eq!(ty.to_string(), "Future<Vec<User>>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    path: Vec<String>,
    args: Vec<TypeRef>,
}

impl TypeRef {
    /// A non-generic type. `::`-separated paths are split into segments.
    pub fn named(name: impl AsRef<str>) -> Self {
        Self {
            path: split_path(name.as_ref()),
            args: Vec::new(),
        }
    }

    /// A generic type with the given type arguments.
    pub fn generic(name: impl AsRef<str>, args: impl IntoIterator<Item = TypeRef>) -> Self {
        Self {
            path: split_path(name.as_ref()),
            args: args.into_iter().collect(),
        }
    }

    /// An array or slice of `element`.
    pub fn array(element: TypeRef) -> Self {
        Self {
            path: vec![ARRAY_NAME.to_string()],
            args: vec![element],
        }
    }

    /// The unit type, used for methods without a declared return type.
    pub fn unit() -> Self {
        Self::named(UNIT_NAME)
    }

    /// The last path segment, which identifies the type.
    pub fn simple_name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or(UNIT_NAME)
    }

    /// The full `::`-joined path.
    pub fn path(&self) -> String {
        self.path.join("::")
    }

    /// Generic type arguments, in declaration order.
    pub fn args(&self) -> &[TypeRef] {
        &self.args
    }

    /// The first generic type argument, if any.
    pub fn first_arg(&self) -> Option<&TypeRef> {
        self.args.first()
    }

    /// Returns true if this type is declared without type arguments.
    pub fn is_raw(&self) -> bool {
        self.args.is_empty()
    }

    /// Returns true for arrays and slices.
    pub fn is_array(&self) -> bool {
        self.simple_name() == ARRAY_NAME
    }

    /// Returns true for `()`.
    pub fn is_unit(&self) -> bool {
        self.simple_name() == UNIT_NAME
    }

    /// Replace generic parameters by their bound types, recursively.
    ///
    /// Only raw single-segment types are considered generic parameters, so
    /// `T` is substituted while `T<X>` and `a::T` are left alone.
    #[must_use]
    pub fn substitute(&self, bindings: &HashMap<String, TypeRef>) -> Self {
        if self.args.is_empty() && self.path.len() == 1 {
            if let Some(bound) = bindings.get(&self.path[0]) {
                return bound.clone();
            }
        }
        Self {
            path: self.path.clone(),
            args: self.args.iter().map(|a| a.substitute(bindings)).collect(),
        }
    }
}

fn split_path(name: &str) -> Vec<String> {
    let name = name.trim();
    if name == ARRAY_NAME || name == UNIT_NAME {
        return vec![name.to_string()];
    }
    name.split("::")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_array() {
            return match self.first_arg() {
                Some(element) => write!(f, "[{}]", element),
                None => f.write_str(ARRAY_NAME),
            };
        }
        f.write_str(&self.path())?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::named(name)
    }
}
