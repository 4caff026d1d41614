//! Consistency rules between parameter roles and the return shape.
//!
//! The rules are plain tables so each one can be audited and tested on its
//! own. [`SignatureValidator::validate`] evaluates them in this order:
//! conflicting roles, role/shape restrictions, required roles per shape.
//! Duplicate roles are rejected earlier, when the parameter list is built.

use crate::error::ValidationError;
use crate::parameter::{ParameterList, ParameterRole};
use crate::shape::ShapeKind;
use crate::signature::MethodSignature;

use ParameterRole::*;

/// Pairs of roles that must not both be present; the first forbids the second.
pub const CONFLICTING_ROLES: &[(ParameterRole, ParameterRole)] =
    &[(Pagination, Sort), (Pagination, Limit)];

/// Result shapes that can carry paging metadata.
pub const PAGINATABLE_SHAPES: &[ShapeKind] = &[
    ShapeKind::Page,
    ShapeKind::Slice,
    ShapeKind::Window,
    ShapeKind::Collection,
    ShapeKind::Search,
];

/// How a violated [`RoleRestriction`] is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictionViolation {
    /// The parameter does not belong on this method at all.
    IllegalParameter,
    /// The return shape cannot honour the parameter.
    UnsupportedShape,
}

/// A role that is only legal together with certain return shapes.
#[derive(Debug, Clone, Copy)]
pub struct RoleRestriction {
    /// The restricted role.
    pub role: ParameterRole,
    /// Shapes the role is legal with.
    pub allowed: &'static [ShapeKind],
    /// Shapes exempt from the restriction.
    pub exempt: &'static [ShapeKind],
    /// How a violation is reported.
    pub violation: RestrictionViolation,
}

/// Roles restricted to certain return shapes.
pub const ROLE_RESTRICTIONS: &[RoleRestriction] = &[
    RoleRestriction {
        role: ScrollCursor,
        allowed: &[ShapeKind::Window],
        exempt: &[],
        violation: RestrictionViolation::IllegalParameter,
    },
    RoleRestriction {
        role: Pagination,
        allowed: PAGINATABLE_SHAPES,
        exempt: &[ShapeKind::Stream],
        violation: RestrictionViolation::UnsupportedShape,
    },
];

/// A return shape that needs at least one of a set of roles.
#[derive(Debug, Clone, Copy)]
pub struct ShapeRequirement {
    /// The demanding shape.
    pub shape: ShapeKind,
    /// At least one of these roles must be present.
    pub any_of: &'static [ParameterRole],
}

/// Roles required by return shapes.
pub const SHAPE_REQUIREMENTS: &[ShapeRequirement] = &[
    ShapeRequirement {
        shape: ShapeKind::Page,
        any_of: &[Pagination],
    },
    ShapeRequirement {
        shape: ShapeKind::Window,
        any_of: &[ScrollCursor, Pagination],
    },
];

/// Applies the rule tables to a classified signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureValidator;

impl SignatureValidator {
    /// Check all rules, failing on the first violation.
    pub fn validate(
        method: &MethodSignature,
        parameters: &ParameterList,
        shape: ShapeKind,
    ) -> Result<(), ValidationError> {
        Self::check_conflicts(method, parameters)?;
        Self::check_restrictions(method, parameters, shape)?;
        Self::check_requirements(method, parameters, shape)
    }

    /// Roles that exclude each other.
    pub fn check_conflicts(
        method: &MethodSignature,
        parameters: &ParameterList,
    ) -> Result<(), ValidationError> {
        for &(present, conflicting) in CONFLICTING_ROLES {
            if parameters.has(present) && parameters.has(conflicting) {
                return Err(ValidationError::ConflictingParameters {
                    method: method.to_string(),
                    present,
                    conflicting,
                });
            }
        }
        Ok(())
    }

    /// Roles only legal with certain shapes.
    pub fn check_restrictions(
        method: &MethodSignature,
        parameters: &ParameterList,
        shape: ShapeKind,
    ) -> Result<(), ValidationError> {
        for restriction in ROLE_RESTRICTIONS {
            if !parameters.has(restriction.role)
                || restriction.exempt.contains(&shape)
                || restriction.allowed.contains(&shape)
            {
                continue;
            }
            let method = method.to_string();
            let allowed = restriction.allowed.to_vec();
            return Err(match restriction.violation {
                RestrictionViolation::IllegalParameter => {
                    ValidationError::IllegalParameterForShape {
                        method,
                        role: restriction.role,
                        shape,
                        allowed,
                    }
                }
                RestrictionViolation::UnsupportedShape => ValidationError::UnsupportedReturnShape {
                    method,
                    role: restriction.role,
                    shape,
                    allowed,
                },
            });
        }
        Ok(())
    }

    /// Roles needed by the shape.
    pub fn check_requirements(
        method: &MethodSignature,
        parameters: &ParameterList,
        shape: ShapeKind,
    ) -> Result<(), ValidationError> {
        for requirement in SHAPE_REQUIREMENTS {
            if requirement.shape == shape
                && !requirement.any_of.iter().any(|r| parameters.has(*r))
            {
                return Err(ValidationError::MissingRequiredParameter {
                    method: method.to_string(),
                    shape,
                    required: requirement.any_of.to_vec(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::MarkerTypeClassifier;
    use crate::parameter::ParameterRole::{Limit, Pagination, Sort};
    use crate::{TypeCatalog, TypeRef};
    use std::sync::Arc;

    fn method(params: &[&str]) -> (MethodSignature, ParameterList) {
        let signature = params.iter().enumerate().fold(
            MethodSignature::new("find_all"),
            |signature, (i, ty)| signature.param(format!("p{}", i), TypeRef::named(*ty)),
        );
        let classifier = MarkerTypeClassifier::new(Arc::new(TypeCatalog::with_defaults()));
        let list = ParameterList::classify(signature.parameters(), &classifier).unwrap();
        (signature, list)
    }

    #[test]
    fn test_conflicts_table() {
        let (m, p) = method(&["Pageable", "Sort"]);
        assert!(matches!(
            SignatureValidator::check_conflicts(&m, &p),
            Err(ValidationError::ConflictingParameters {
                present: Pagination,
                conflicting: Sort,
                ..
            })
        ));

        let (m, p) = method(&["Pageable", "Limit"]);
        assert!(matches!(
            SignatureValidator::check_conflicts(&m, &p),
            Err(ValidationError::ConflictingParameters {
                conflicting: Limit,
                ..
            })
        ));

        let (m, p) = method(&["Sort", "Limit"]);
        assert!(SignatureValidator::check_conflicts(&m, &p).is_ok());
    }

    #[test]
    fn test_restrictions_table() {
        let (m, p) = method(&["ScrollPosition"]);
        assert!(SignatureValidator::check_restrictions(&m, &p, ShapeKind::Window).is_ok());
        assert!(matches!(
            SignatureValidator::check_restrictions(&m, &p, ShapeKind::Collection),
            Err(ValidationError::IllegalParameterForShape { .. })
        ));

        let (m, p) = method(&["Pageable"]);
        assert!(SignatureValidator::check_restrictions(&m, &p, ShapeKind::Stream).is_ok());
        for shape in PAGINATABLE_SHAPES {
            assert!(SignatureValidator::check_restrictions(&m, &p, *shape).is_ok());
        }
        assert!(matches!(
            SignatureValidator::check_restrictions(&m, &p, ShapeKind::Single),
            Err(ValidationError::UnsupportedReturnShape {
                shape: ShapeKind::Single,
                ..
            })
        ));
    }

    #[test]
    fn test_requirements_table() {
        let (m, p) = method(&["String"]);
        assert!(matches!(
            SignatureValidator::check_requirements(&m, &p, ShapeKind::Page),
            Err(ValidationError::MissingRequiredParameter {
                shape: ShapeKind::Page,
                ..
            })
        ));
        assert!(SignatureValidator::check_requirements(&m, &p, ShapeKind::Slice).is_ok());

        let (m, p) = method(&["Pageable"]);
        assert!(SignatureValidator::check_requirements(&m, &p, ShapeKind::Window).is_ok());
    }

    #[test]
    fn test_error_names_method_and_rule() {
        let (m, p) = method(&["ScrollPosition"]);
        let err = SignatureValidator::validate(&m, &p, ShapeKind::Collection).unwrap_err();
        assert_eq!(err.method(), "find_all(p0: ScrollPosition)");
        assert_eq!(
            err.to_string(),
            "ScrollCursor parameter requires one of the following return shapes: Window, \
             found Collection; offending method: find_all(p0: ScrollPosition)"
        );
    }
}
