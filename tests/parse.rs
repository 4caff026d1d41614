//! Describing methods parsed from Rust trait declarations.
#![cfg(feature = "signature-parser")]

use std::sync::Arc;

use query_shape::{
    ParseError, QueryMethodAnalyzer, RepositoryDeclaration, RepositoryInfo, RepositoryMethods,
    ShapeKind, TypeRef, ValidationError,
};

const USER_REPOSITORY: &str = r#"
    pub trait UserRepository: CrudRepository<User, u64> {
        fn find_by_lastname(&self, lastname: &str, page: PageRequest) -> Page<User>;
        fn find_top(&self, limit: Limit, sort: Sort) -> Vec<User>;
        fn scroll_by_lastname(&self, lastname: &str, cursor: KeysetScrollPosition) -> Window<User>;
        fn stream_all(&self) -> Pin<Box<dyn Stream<Item = User> + Send>>;
        fn search(&self, text: &str) -> SearchResults<User>;
        async fn find_by_id(&self, id: u64) -> Result<Option<User>, Error>;
        fn count_by_lastname(&self, lastname: &str) -> u64;
    }
"#;

#[test]
fn test_describe_parsed_repository() -> anyhow::Result<()> {
    let declaration: RepositoryDeclaration = USER_REPOSITORY.parse()?;
    let domain = declaration.domain_type().cloned().expect("domain type");
    let metadata = Arc::new(RepositoryInfo::new(declaration.name.clone()).with_domain_type(domain));

    let repository =
        RepositoryMethods::bootstrap(metadata, QueryMethodAnalyzer::new(), declaration.methods)?;

    let shapes: Vec<_> = repository
        .descriptors()
        .iter()
        .map(|d| (d.name().to_string(), d.shape_kind()))
        .collect();
    assert_eq!(
        shapes,
        vec![
            ("find_by_lastname".to_string(), ShapeKind::Page),
            ("find_top".to_string(), ShapeKind::Collection),
            ("scroll_by_lastname".to_string(), ShapeKind::Window),
            ("stream_all".to_string(), ShapeKind::Stream),
            ("search".to_string(), ShapeKind::Search),
            ("find_by_id".to_string(), ShapeKind::Single),
            ("count_by_lastname".to_string(), ShapeKind::Single),
        ]
    );

    let find_by_id = &repository.by_name("find_by_id")[0];
    assert_eq!(find_by_id.unwrapped_return_type().to_string(), "Option<User>");
    assert!(find_by_id.represents_entity_result());

    let count = &repository.by_name("count_by_lastname")[0];
    assert!(!count.represents_entity_result());
    assert_eq!(count.derived_query_identifier(), "User.count_by_lastname");
    Ok(())
}

#[test]
fn test_invalid_parsed_method() -> anyhow::Result<()> {
    let declaration: RepositoryDeclaration = r#"
        trait BrokenRepository: Repository<User, u64> {
            fn find_all(&self, page: Pageable, sort: Sort) -> Page<User>;
        }
    "#
    .parse()?;
    let metadata = Arc::new(RepositoryInfo::for_domain(TypeRef::named("User")));

    let err = RepositoryMethods::bootstrap(metadata, QueryMethodAnalyzer::new(), declaration.methods)
        .unwrap_err();
    assert!(matches!(err, ValidationError::ConflictingParameters { .. }));
    assert!(err.to_string().contains("BrokenRepository::find_all"));
    Ok(())
}

#[test]
fn test_parse_errors() {
    assert!(matches!(
        "trait Broken { fn find(&self) -> (u64, u64); }".parse::<RepositoryDeclaration>(),
        Err(ParseError::UnsupportedType(_))
    ));
    assert!(matches!(
        "struct NotATrait;".parse::<RepositoryDeclaration>(),
        Err(ParseError::Syntax(_))
    ));
}
