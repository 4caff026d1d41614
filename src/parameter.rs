//! Classified method parameters.

use std::fmt;
use std::sync::Arc;

use crate::catalog::{well_known, TypeCatalog};
use crate::error::MalformedReason;
use crate::signature::DeclaredParameter;
use crate::type_ref::TypeRef;

/// Reserved roles a parameter can play instead of binding a query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParameterRole {
    /// Page number and size, optionally with an embedded sort or limit.
    Pagination,
    /// Result ordering.
    Sort,
    /// Result-count cap.
    Limit,
    /// Resumable scroll position.
    ScrollCursor,
}

impl ParameterRole {
    /// All roles, in classification order.
    pub const ALL: [ParameterRole; 4] = [
        ParameterRole::Pagination,
        ParameterRole::Sort,
        ParameterRole::Limit,
        ParameterRole::ScrollCursor,
    ];

    /// The marker type whose subtypes play this role.
    pub fn marker_type(self) -> &'static str {
        match self {
            ParameterRole::Pagination => well_known::PAGEABLE,
            ParameterRole::Sort => well_known::SORT,
            ParameterRole::Limit => well_known::LIMIT,
            ParameterRole::ScrollCursor => well_known::SCROLL_POSITION,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ParameterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterRole::Pagination => "Pagination",
            ParameterRole::Sort => "Sort",
            ParameterRole::Limit => "Limit",
            ParameterRole::ScrollCursor => "ScrollCursor",
        };
        f.write_str(name)
    }
}

/// Decides which reserved role, if any, a parameter plays.
pub trait ParameterClassifier: Send + Sync {
    /// The role of `parameter`, or `None` for an ordinary parameter.
    fn classify(&self, parameter: &DeclaredParameter) -> Option<ParameterRole>;
}

impl<F> ParameterClassifier for F
where
    F: Fn(&DeclaredParameter) -> Option<ParameterRole> + Send + Sync,
{
    fn classify(&self, parameter: &DeclaredParameter) -> Option<ParameterRole> {
        self(parameter)
    }
}

/// Assigns the first role whose marker type is assignable from the parameter type.
#[derive(Debug, Clone)]
pub struct MarkerTypeClassifier {
    catalog: Arc<TypeCatalog>,
}

impl MarkerTypeClassifier {
    /// Classify against the hierarchy in `catalog`.
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self { catalog }
    }
}

impl ParameterClassifier for MarkerTypeClassifier {
    fn classify(&self, parameter: &DeclaredParameter) -> Option<ParameterRole> {
        let name = parameter.ty.simple_name();
        ParameterRole::ALL
            .into_iter()
            .find(|role| self.catalog.is_assignable(role.marker_type(), name))
    }
}

/// One classified parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSignature {
    position: usize,
    name: Option<String>,
    declared_type: TypeRef,
    role: Option<ParameterRole>,
}

impl ParameterSignature {
    /// Zero-based position in the method's parameter list.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The declared name, when the signature source provides one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The declared type, with repository generics resolved.
    pub fn declared_type(&self) -> &TypeRef {
        &self.declared_type
    }

    /// The reserved role, or `None` for an ordinary parameter.
    pub fn role(&self) -> Option<ParameterRole> {
        self.role
    }

    /// Ordinary parameters bind values into the query.
    pub fn is_bindable(&self) -> bool {
        self.role.is_none()
    }
}

/// The ordered, classified parameters of one method.
///
/// Holds at most one parameter per reserved role; built once per method.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterList {
    parameters: Vec<ParameterSignature>,
    role_positions: [Option<usize>; 4],
}

impl ParameterList {
    /// Classify `parameters` in order.
    ///
    /// Fails if any reserved role is played by more than one parameter. All
    /// parameters are classified before the check, so the reported positions
    /// are complete.
    pub fn classify<'a, I>(
        parameters: I,
        classifier: &dyn ParameterClassifier,
    ) -> Result<Self, MalformedReason>
    where
        I: IntoIterator<Item = &'a DeclaredParameter>,
    {
        let parameters: Vec<ParameterSignature> = parameters
            .into_iter()
            .enumerate()
            .map(|(position, declared)| ParameterSignature {
                position,
                name: declared.name.clone(),
                declared_type: declared.ty.clone(),
                role: classifier.classify(declared),
            })
            .collect();

        let mut role_positions = [None; 4];
        for role in ParameterRole::ALL {
            let positions: Vec<usize> = parameters
                .iter()
                .filter(|p| p.role == Some(role))
                .map(|p| p.position)
                .collect();
            if positions.len() > 1 {
                return Err(MalformedReason::DuplicateRole { role, positions });
            }
            role_positions[role.index()] = positions.first().copied();
        }

        Ok(Self {
            parameters,
            role_positions,
        })
    }

    /// Returns true if a parameter plays `role`.
    pub fn has(&self, role: ParameterRole) -> bool {
        self.role_positions[role.index()].is_some()
    }

    /// Returns true if a pagination parameter is present.
    pub fn has_pagination(&self) -> bool {
        self.has(ParameterRole::Pagination)
    }

    /// Returns true if a sort parameter is present.
    pub fn has_sort(&self) -> bool {
        self.has(ParameterRole::Sort)
    }

    /// Returns true if a limit parameter is present.
    pub fn has_limit(&self) -> bool {
        self.has(ParameterRole::Limit)
    }

    /// Returns true if a scroll cursor parameter is present.
    pub fn has_scroll_cursor(&self) -> bool {
        self.has(ParameterRole::ScrollCursor)
    }

    /// Position of the parameter playing `role`.
    pub fn position_of(&self, role: ParameterRole) -> Option<usize> {
        self.role_positions[role.index()]
    }

    /// The parameter playing `role`.
    pub fn parameter(&self, role: ParameterRole) -> Option<&ParameterSignature> {
        self.position_of(role).map(|i| &self.parameters[i])
    }

    /// Roles present in this list, in classification order.
    pub fn roles(&self) -> impl Iterator<Item = ParameterRole> + '_ {
        ParameterRole::ALL.into_iter().filter(|r| self.has(*r))
    }

    /// Parameters that bind query values, in declaration order.
    pub fn bindable(&self) -> impl Iterator<Item = &ParameterSignature> {
        self.parameters.iter().filter(|p| p.is_bindable())
    }

    /// The parameter at `position`.
    pub fn get(&self, position: usize) -> Option<&ParameterSignature> {
        self.parameters.get(position)
    }

    /// All parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterSignature> {
        self.parameters.iter()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns true if the method takes no parameters.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl<'a> IntoIterator for &'a ParameterList {
    type Item = &'a ParameterSignature;
    type IntoIter = std::slice::Iter<'a, ParameterSignature>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}
