//! Signatures and types from Rust declarations, parsed with `syn`.
//!
//! References and the smart pointers `Box`, `Arc`, `Rc`, `Pin` and `Cow` are
//! transparent, `Result<T, E>` contributes its `T`, and `async fn` wraps its
//! return type in `Future`. `impl Trait<Item = T>` and `dyn Trait<Item = T>`
//! become `Trait<T>`.

use std::str::FromStr;

use quote::ToTokens;
use syn::{
    FnArg, GenericArgument, GenericParam, Pat, PathArguments, ReturnType, TraitItem, Type,
    TypeParamBound,
};

use crate::error::ParseError;
use crate::signature::MethodSignature;
use crate::type_ref::TypeRef;

const TRANSPARENT: &[&str] = &["Box", "Arc", "Rc", "Pin", "Cow", "Result"];

impl FromStr for TypeRef {
    type Err = ParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let ty: Type = syn::parse_str(source)?;
        TypeRef::try_from(&ty)
    }
}

impl TryFrom<&Type> for TypeRef {
    type Error = ParseError;

    fn try_from(ty: &Type) -> Result<Self, Self::Error> {
        match ty {
            Type::Path(path) => convert_path(&path.path, ty),
            Type::Reference(reference) => TypeRef::try_from(reference.elem.as_ref()),
            Type::Paren(paren) => TypeRef::try_from(paren.elem.as_ref()),
            Type::Group(group) => TypeRef::try_from(group.elem.as_ref()),
            Type::Slice(slice) => Ok(TypeRef::array(TypeRef::try_from(slice.elem.as_ref())?)),
            Type::Array(array) => Ok(TypeRef::array(TypeRef::try_from(array.elem.as_ref())?)),
            Type::Tuple(tuple) if tuple.elems.is_empty() => Ok(TypeRef::unit()),
            Type::ImplTrait(bounds) => convert_bounds(bounds.bounds.iter(), ty),
            Type::TraitObject(bounds) => convert_bounds(bounds.bounds.iter(), ty),
            other => Err(unsupported(other)),
        }
    }
}

fn unsupported(ty: &impl ToTokens) -> ParseError {
    ParseError::UnsupportedType(ty.to_token_stream().to_string())
}

fn convert_path(path: &syn::Path, ty: &Type) -> Result<TypeRef, ParseError> {
    let Some(last) = path.segments.last() else {
        return Err(unsupported(ty));
    };
    let args = match &last.arguments {
        PathArguments::None => Vec::new(),
        PathArguments::AngleBracketed(angle) => angle
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(t) => Some(TypeRef::try_from(t)),
                GenericArgument::AssocType(assoc) => Some(TypeRef::try_from(&assoc.ty)),
                _ => None,
            })
            .collect::<Result<Vec<_>, _>>()?,
        PathArguments::Parenthesized(_) => return Err(unsupported(ty)),
    };

    let name = last.ident.to_string();
    if TRANSPARENT.contains(&name.as_str()) {
        if let Some(inner) = args.into_iter().next() {
            return Ok(inner);
        }
        return Err(unsupported(ty));
    }

    let full_path = path
        .segments
        .iter()
        .map(|s| s.ident.to_string())
        .collect::<Vec<_>>()
        .join("::");
    Ok(TypeRef::generic(full_path, args))
}

fn convert_bounds<'a>(
    mut bounds: impl Iterator<Item = &'a TypeParamBound>,
    ty: &Type,
) -> Result<TypeRef, ParseError> {
    bounds
        .find_map(|bound| match bound {
            TypeParamBound::Trait(t) => Some(convert_path(&t.path, ty)),
            _ => None,
        })
        .unwrap_or_else(|| Err(unsupported(ty)))
}

fn convert_signature(
    sig: &syn::Signature,
    declaring_type: Option<&str>,
) -> Result<MethodSignature, ParseError> {
    let name = sig.ident.to_string();
    let mut method = MethodSignature::new(name.clone());
    if let Some(declaring) = declaring_type {
        method = method.declared_in(declaring);
    }

    for input in &sig.inputs {
        let FnArg::Typed(typed) = input else {
            continue;
        };
        let ty = TypeRef::try_from(typed.ty.as_ref())?;
        method = match typed.pat.as_ref() {
            Pat::Ident(ident) => method.param(ident.ident.to_string(), ty),
            Pat::Wild(_) => method.unnamed_param(ty),
            _ => return Err(ParseError::UnsupportedPattern(name)),
        };
    }

    let mut return_type = match &sig.output {
        ReturnType::Default => TypeRef::unit(),
        ReturnType::Type(_, ty) => TypeRef::try_from(ty.as_ref())?,
    };
    if sig.asyncness.is_some() {
        return_type = TypeRef::generic("Future", [return_type]);
    }
    Ok(method.returns(return_type))
}

impl MethodSignature {
    /// Parse a Rust method declaration such as
    /// `fn find_all(&self, page: Pageable) -> Page<User>;`.
    ///
    /// The receiver is skipped and the trailing semicolon is optional.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let source = source.trim();
        let item: syn::TraitItemFn = if source.ends_with(';') || source.ends_with('}') {
            syn::parse_str(source)?
        } else {
            syn::parse_str(&format!("{};", source))?
        };
        convert_signature(&item.sig, None)
    }
}

/// A repository trait declaration.
///
/// # Example
///
/// ```
/// use query_shape::RepositoryDeclaration;
///
/// let declaration: RepositoryDeclaration = r#"
///     trait UserRepository: CrudRepository<User, u64> {
///         fn find_by_lastname(&self, lastname: &str, page: Pageable) -> Page<User>;
///         async fn find_all(&self) -> Result<Vec<User>, Error>;
///     }
/// "#
/// .parse()
/// .unwrap();
///
/// assert_eq!(declaration.name, "UserRepository");
/// assert_eq!(declaration.domain_type().unwrap().to_string(), "User");
/// assert_eq!(declaration.methods[1].return_type().to_string(), "Future<Vec<User>>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDeclaration {
    /// The trait name.
    pub name: String,
    /// Names of the trait's generic type parameters.
    pub generics: Vec<String>,
    /// Supertraits, in declaration order.
    pub supertraits: Vec<TypeRef>,
    /// Declared methods, in declaration order.
    pub methods: Vec<MethodSignature>,
}

impl RepositoryDeclaration {
    /// The entity type named by the first `*Repository<Entity, ..>` supertrait.
    pub fn domain_type(&self) -> Option<&TypeRef> {
        self.supertraits
            .iter()
            .find(|t| t.simple_name().ends_with("Repository"))
            .and_then(TypeRef::first_arg)
    }
}

impl FromStr for RepositoryDeclaration {
    type Err = ParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let item: syn::ItemTrait = syn::parse_str(source)?;
        let name = item.ident.to_string();

        let generics = item
            .generics
            .params
            .iter()
            .filter_map(|param| match param {
                GenericParam::Type(t) => Some(t.ident.to_string()),
                _ => None,
            })
            .collect();

        let supertraits = item
            .supertraits
            .iter()
            .filter_map(|bound| match bound {
                TypeParamBound::Trait(t) => Some(t),
                _ => None,
            })
            .map(|t| {
                let ty = Type::Path(syn::TypePath {
                    qself: None,
                    path: t.path.clone(),
                });
                convert_path(&t.path, &ty)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let methods = item
            .items
            .iter()
            .filter_map(|item| match item {
                TraitItem::Fn(f) => Some(convert_signature(&f.sig, Some(name.as_str()))),
                _ => None,
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name,
            generics,
            supertraits,
            methods,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(source: &str) -> String {
        source.parse::<TypeRef>().unwrap().to_string()
    }

    #[test]
    fn test_parse_types() {
        assert_eq!(ty("Page<User>"), "Page<User>");
        assert_eq!(ty("&[User]"), "[User]");
        assert_eq!(ty("[User; 4]"), "[User]");
        assert_eq!(ty("()"), "()");
        assert_eq!(ty("crate::model::User"), "crate::model::User");
        assert_eq!(ty("Box<dyn Iterator<Item = User> + Send>"), "Iterator<User>");
        assert_eq!(ty("Pin<Box<dyn Stream<Item = User>>>"), "Stream<User>");
        assert_eq!(ty("impl Iterator<Item = &'static User>"), "Iterator<User>");
        assert_eq!(ty("Result<Option<User>, Error>"), "Option<User>");
        assert_eq!(ty("HashMap<String, User>"), "HashMap<String, User>");
    }

    #[test]
    fn test_unsupported_types() {
        assert!(matches!(
            "(User, u64)".parse::<TypeRef>(),
            Err(ParseError::UnsupportedType(_))
        ));
        assert!(matches!(
            "fn(User) -> u64".parse::<TypeRef>(),
            Err(ParseError::UnsupportedType(_))
        ));
        assert!(matches!("Page<".parse::<TypeRef>(), Err(ParseError::Syntax(_))));
    }

    #[test]
    fn test_parse_method() {
        let method =
            MethodSignature::parse("fn find_by_name(&self, name: &str, _: Sort) -> Vec<User>")
                .unwrap();
        assert_eq!(method.name(), "find_by_name");
        assert_eq!(method.parameters().len(), 2);
        assert_eq!(method.parameters()[1].name, None);
        assert_eq!(method.to_string(), "find_by_name(name: str, Sort) -> Vec<User>");
    }

    #[test]
    fn test_parse_async_method() {
        let method = MethodSignature::parse("async fn count(&self) -> u64;").unwrap();
        assert_eq!(method.return_type().to_string(), "Future<u64>");
    }

    #[test]
    fn test_parse_method_without_return_type() {
        let method = MethodSignature::parse("fn delete_all(&self);").unwrap();
        assert!(method.return_type().is_unit());
    }

    #[test]
    fn test_parse_rejects_destructuring_pattern() {
        let result = MethodSignature::parse("fn find(&self, (a, b): Pair) -> User");
        assert!(matches!(result, Err(ParseError::UnsupportedPattern(name)) if name == "find"));
    }

    #[test]
    fn test_parse_repository_declaration() {
        let declaration: RepositoryDeclaration = r#"
            trait PersonRepository<T>: Repository<Person, u64> + Send {
                const NAME: &'static str;
                fn find_all(&self, page: Pageable) -> Page<T>;
                fn stream_all(&self) -> impl Iterator<Item = T>;
            }
        "#
        .parse()
        .unwrap();

        assert_eq!(declaration.name, "PersonRepository");
        assert_eq!(declaration.generics, vec!["T".to_string()]);
        assert_eq!(declaration.domain_type(), Some(&TypeRef::named("Person")));
        assert_eq!(declaration.methods.len(), 2);
        assert_eq!(
            declaration.methods[0].to_string(),
            "PersonRepository::find_all(page: Pageable) -> Page<T>"
        );
    }
}
