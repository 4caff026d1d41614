//! Error types for signature classification and validation.

use thiserror::Error;

use crate::parameter::ParameterRole;
use crate::shape::ShapeKind;

/// A query method signature that cannot be used.
///
/// All variants are detected while the descriptor is built and always name
/// the offending method. There is no partially valid descriptor: an invalid
/// signature is a programming error in the repository declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The signature itself is not well formed.
    #[error("malformed signature: {reason}; offending method: {method}")]
    MalformedSignature {
        /// Rendered signature of the offending method.
        method: String,
        /// What is wrong with it.
        reason: MalformedReason,
    },

    /// Two parameters whose roles must not appear together.
    #[error(
        "method using a {present} parameter must not declare a {conflicting} parameter; \
         express it through the {present} parameter instead; offending method: {method}"
    )]
    ConflictingParameters {
        /// Rendered signature of the offending method.
        method: String,
        /// The role that forbids the other one.
        present: ParameterRole,
        /// The forbidden role.
        conflicting: ParameterRole,
    },

    /// The return shape needs a parameter the method does not declare.
    #[error("{shape} query needs one of the following parameters: {}; offending method: {method}", join_roles(.required))]
    MissingRequiredParameter {
        /// Rendered signature of the offending method.
        method: String,
        /// The resolved return shape.
        shape: ShapeKind,
        /// Roles of which at least one must be present.
        required: Vec<ParameterRole>,
    },

    /// A parameter role that only makes sense for other return shapes.
    #[error("{role} parameter requires one of the following return shapes: {}, found {shape}; offending method: {method}", join_shapes(.allowed))]
    IllegalParameterForShape {
        /// Rendered signature of the offending method.
        method: String,
        /// The offending parameter role.
        role: ParameterRole,
        /// The resolved return shape.
        shape: ShapeKind,
        /// Shapes for which the role is legal.
        allowed: Vec<ShapeKind>,
    },

    /// A pagination parameter combined with a result that cannot carry paging metadata.
    #[error("method with a {role} parameter has to return one of the following shapes: {}, found {shape}; offending method: {method}", join_shapes(.allowed))]
    UnsupportedReturnShape {
        /// Rendered signature of the offending method.
        method: String,
        /// The parameter role demanding a paging-capable result.
        role: ParameterRole,
        /// The resolved return shape.
        shape: ShapeKind,
        /// Shapes that accept paging metadata.
        allowed: Vec<ShapeKind>,
    },
}

impl ValidationError {
    /// The rendered signature of the offending method.
    pub fn method(&self) -> &str {
        match self {
            ValidationError::MalformedSignature { method, .. }
            | ValidationError::ConflictingParameters { method, .. }
            | ValidationError::MissingRequiredParameter { method, .. }
            | ValidationError::IllegalParameterForShape { method, .. }
            | ValidationError::UnsupportedReturnShape { method, .. } => method,
        }
    }
}

/// Why a signature is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    /// More than one parameter plays the same reserved role.
    #[error("method must have only one {role} parameter, found {} at positions {positions:?}", .positions.len())]
    DuplicateRole {
        /// The duplicated role.
        role: ParameterRole,
        /// Positions of all parameters playing the role.
        positions: Vec<usize>,
    },

    /// A wrapper type used without a type argument, so no element type can be resolved.
    #[error("could not find component type of wrapper return type {wrapper}")]
    MissingTypeArgument {
        /// The raw wrapper type.
        wrapper: String,
    },
}

/// Failure to turn Rust source into a signature or type.
#[cfg(feature = "signature-parser")]
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input is not valid Rust syntax for the expected item.
    #[error("invalid syntax: {0}")]
    Syntax(#[from] syn::Error),

    /// The input is valid Rust but uses a type form that has no query shape.
    #[error("unsupported type `{0}`")]
    UnsupportedType(String),

    /// A parameter pattern other than a plain identifier or `_`.
    #[error("unsupported parameter pattern in method `{0}`")]
    UnsupportedPattern(String),
}

/// Failure to load an analyzer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema.
    #[error("invalid analyzer configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

fn join_roles(roles: &[ParameterRole]) -> String {
    roles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_shapes(shapes: &[ShapeKind]) -> String {
    shapes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
