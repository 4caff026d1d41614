#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

mod analyzer;
mod catalog;
mod config;
mod descriptor;
mod error;
mod metadata;
mod parameter;
#[cfg(feature = "signature-parser")]
mod parse;
mod repository;
mod shape;
mod signature;
pub mod tracer;
mod type_ref;
pub mod validate;
mod wrapper;

pub use analyzer::{describe, QueryMethodAnalyzer, QueryMethodAnalyzerBuilder};
pub use catalog::{well_known, TypeCatalog};
pub use config::{AnalyzerConfig, WrapperEntry};
pub use descriptor::{EntityInformation, QueryMethod, QueryMethodDescriptor};
#[cfg(feature = "signature-parser")]
pub use error::ParseError;
pub use error::{ConfigError, MalformedReason, ValidationError};
pub use metadata::{RepositoryInfo, RepositoryMetadata};
pub use parameter::{
    MarkerTypeClassifier, ParameterClassifier, ParameterList, ParameterRole, ParameterSignature,
};
#[cfg(feature = "signature-parser")]
pub use parse::RepositoryDeclaration;
pub use repository::RepositoryMethods;
pub use shape::{ResolvedReturn, ReturnShape, ReturnShapeResolver, ShapeKind};
pub use signature::{DeclaredParameter, MethodKey, MethodSignature};
pub use tracer::{DescribeOutcome, NoopTracer, SpanId, Tracer};
pub use type_ref::{TypeRef, ARRAY_NAME, UNIT_NAME};
pub use validate::SignatureValidator;
pub use wrapper::{WrapperInfo, WrapperKind, WrapperRegistry};
