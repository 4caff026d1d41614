//! Entry point turning signatures into validated descriptors.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::catalog::TypeCatalog;
use crate::config::AnalyzerConfig;
use crate::descriptor::QueryMethodDescriptor;
use crate::error::{MalformedReason, ValidationError};
use crate::metadata::RepositoryMetadata;
use crate::parameter::{MarkerTypeClassifier, ParameterClassifier, ParameterList};
use crate::shape::{ResolvedReturn, ReturnShapeResolver};
use crate::signature::{DeclaredParameter, MethodSignature};
use crate::tracer::{DescribeOutcome, NoopTracer, SpanId, Tracer};
use crate::validate::SignatureValidator;
use crate::wrapper::{WrapperInfo, WrapperRegistry};

static DEFAULT_ANALYZER: Lazy<QueryMethodAnalyzer> = Lazy::new(QueryMethodAnalyzer::new);

/// Describe `signature` with the default analyzer.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use query_shape::{describe, MethodSignature, RepositoryInfo, TypeRef};
///
/// let repository = Arc::new(RepositoryInfo::for_domain(TypeRef::named("User")));
/// let method = MethodSignature::new("find_all")
///     .param("page", TypeRef::named("Pageable"))
///     .returns(TypeRef::generic("Page", [TypeRef::named("User")]));
///
/// let descriptor = describe(method, repository).unwrap();
/// assert!(descriptor.is_page_result());
/// assert_eq!(descriptor.derived_query_identifier(), "User.find_all");
/// ```
pub fn describe(
    signature: MethodSignature,
    metadata: Arc<dyn RepositoryMetadata>,
) -> Result<QueryMethodDescriptor, ValidationError> {
    DEFAULT_ANALYZER.describe(signature, metadata)
}

/// Classifies and validates query method signatures.
///
/// This is cheap to clone; registries and the tracer are shared.
#[derive(Clone)]
pub struct QueryMethodAnalyzer {
    resolver: ReturnShapeResolver,
    classifier: Arc<dyn ParameterClassifier>,
    tracer: Arc<dyn Tracer>,
}

impl Default for QueryMethodAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QueryMethodAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryMethodAnalyzer")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl QueryMethodAnalyzer {
    /// An analyzer with the built-in registry and catalog.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for customizing the analyzer.
    pub fn builder() -> QueryMethodAnalyzerBuilder {
        QueryMethodAnalyzerBuilder::new()
    }

    /// The return shape resolver.
    pub fn resolver(&self) -> &ReturnShapeResolver {
        &self.resolver
    }

    /// The tracer receiving describe events.
    pub fn tracer(&self) -> &Arc<dyn Tracer> {
        &self.tracer
    }

    /// Classify and validate one method.
    ///
    /// Steps run in a fixed order and stop at the first failure: parameter
    /// roles (at most one parameter per role), return type unwrapping, shape
    /// resolution, and the [`SignatureValidator`] rules.
    pub fn describe(
        &self,
        signature: MethodSignature,
        metadata: Arc<dyn RepositoryMetadata>,
    ) -> Result<QueryMethodDescriptor, ValidationError> {
        let span_id = self.tracer.new_span_id();
        self.tracer.on_describe_start(span_id, &signature);

        let result = self.build(span_id, &signature, metadata.as_ref());
        let outcome = match &result {
            Ok((_, resolved)) => DescribeOutcome::Described {
                shape: resolved.shape.kind(),
            },
            Err(error) => DescribeOutcome::Rejected {
                error: error.clone(),
            },
        };
        self.tracer.on_describe_end(span_id, &signature, &outcome);

        match result {
            Ok((parameters, resolved)) => {
                tracing::debug!(
                    method = %signature,
                    shape = %resolved.shape,
                    domain_type = %resolved.domain_type,
                    "described query method"
                );
                Ok(QueryMethodDescriptor::new(
                    signature,
                    metadata,
                    parameters,
                    resolved,
                    self.resolver.clone(),
                ))
            }
            Err(error) => {
                tracing::debug!(method = %signature, %error, "rejected query method");
                Err(error)
            }
        }
    }

    fn build(
        &self,
        span_id: SpanId,
        signature: &MethodSignature,
        metadata: &dyn RepositoryMetadata,
    ) -> Result<(ParameterList, ResolvedReturn), ValidationError> {
        let malformed = |reason: MalformedReason| ValidationError::MalformedSignature {
            method: signature.to_string(),
            reason,
        };

        let resolved_parameters: Vec<_> = signature
            .parameters()
            .iter()
            .map(|p| DeclaredParameter {
                name: p.name.clone(),
                ty: metadata.resolve_type(&p.ty),
            })
            .collect();
        let parameters =
            ParameterList::classify(&resolved_parameters, self.classifier.as_ref())
                .map_err(malformed)?;
        self.tracer.on_parameters_classified(span_id, &parameters);

        let return_type = metadata.return_type(signature);
        let resolved = self
            .resolver
            .resolve(
                &return_type,
                metadata.domain_type(),
                metadata.returned_domain_type(signature),
            )
            .map_err(malformed)?;
        self.tracer.on_return_shape_resolved(span_id, &resolved.shape);

        SignatureValidator::validate(signature, &parameters, resolved.shape.kind())?;
        Ok((parameters, resolved))
    }
}

/// Builder for [`QueryMethodAnalyzer`] with custom configuration.
///
/// # Example
///
/// ```
/// use query_shape::{QueryMethodAnalyzer, WrapperInfo, WrapperKind};
///
/// let analyzer = QueryMethodAnalyzer::builder()
///     .wrapper("Uni", WrapperInfo::single(WrapperKind::Reactive))
///     .subtype("GeoPage", "Page")
///     .build();
/// ```
pub struct QueryMethodAnalyzerBuilder {
    wrappers: WrapperRegistry,
    catalog: TypeCatalog,
    classifier: Option<Arc<dyn ParameterClassifier>>,
    tracer: Arc<dyn Tracer>,
}

impl Default for QueryMethodAnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryMethodAnalyzerBuilder {
    /// Create a new builder with the built-in registry and catalog.
    pub fn new() -> Self {
        Self {
            wrappers: WrapperRegistry::with_defaults(),
            catalog: TypeCatalog::with_defaults(),
            classifier: None,
            tracer: Arc::new(NoopTracer),
        }
    }

    /// Replace registry and catalog by the ones described in `config`.
    pub fn config(mut self, config: &AnalyzerConfig) -> Self {
        self.wrappers = config.wrapper_registry();
        self.catalog = config.type_catalog();
        self
    }

    /// Replace the wrapper registry.
    pub fn wrappers(mut self, wrappers: WrapperRegistry) -> Self {
        self.wrappers = wrappers;
        self
    }

    /// Register one additional wrapper type.
    pub fn wrapper(mut self, name: impl Into<String>, info: WrapperInfo) -> Self {
        self.wrappers.register(name, info);
        self
    }

    /// Replace the type catalog.
    pub fn catalog(mut self, catalog: TypeCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Declare `subtype` assignable to `supertype`.
    pub fn subtype(mut self, subtype: impl Into<String>, supertype: impl Into<String>) -> Self {
        self.catalog.register(subtype, [supertype]);
        self
    }

    /// Use a custom parameter classifier instead of marker-type matching.
    pub fn classifier(mut self, classifier: impl ParameterClassifier + 'static) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    /// Set the tracer receiving describe events.
    pub fn tracer(mut self, tracer: impl Tracer) -> Self {
        self.tracer = Arc::new(tracer);
        self
    }

    /// Build the analyzer.
    pub fn build(self) -> QueryMethodAnalyzer {
        let catalog = Arc::new(self.catalog);
        let classifier = self
            .classifier
            .unwrap_or_else(|| {
                Arc::new(MarkerTypeClassifier::new(catalog.clone())) as Arc<dyn ParameterClassifier>
            });
        QueryMethodAnalyzer {
            resolver: ReturnShapeResolver::new(Arc::new(self.wrappers), catalog),
            classifier,
            tracer: self.tracer,
        }
    }
}
