//! Protections: controls that discharge security requirements.
//!
//! A protection is characterized by the actors it relies on (its
//! trustees), how reliable it is, and which security properties it can
//! provide. Its single capability is [`Protection::fill`]: given a
//! requirement, return what remains unmet once the protection is applied.
//!
//! # Trust
//!
//! A protection only counts for a requirement when every actor it relies
//! on is a trustee of that requirement. Trustees are closed-world per
//! requirement, so a control run by an actor the requirement does not
//! trust discharges nothing.
//!
//! # Reliability
//!
//! Reliability is `1 - P(penetration in a year)`, kept as an exact
//! fraction so that repeated comparisons and complements never drift.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use num::rational::Ratio;
use num::One;

use crate::element::{Actor, DataType, Flow};
use crate::error::ModelError;
use crate::graph::Graph;
use crate::requirement::{Requirement, RequirementType};

/// Yearly reliability of a protection, an exact fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reliability(Ratio<u64>);

impl Reliability {
    /// `numer / denom`, rejected when the denominator is zero or the value
    /// exceeds one.
    pub fn new(numer: u64, denom: u64) -> Result<Self, ModelError> {
        if denom == 0 || numer > denom {
            return Err(ModelError::InvalidReliability(format!("{}/{}", numer, denom)));
        }
        Ok(Self(Ratio::new(numer, denom)))
    }

    /// A protection that is never penetrated.
    pub fn certain() -> Self {
        Self(Ratio::one())
    }

    /// Reliability from the yearly penetration probability `numer / denom`.
    pub fn from_penetration_probability(numer: u64, denom: u64) -> Result<Self, ModelError> {
        let probability = Self::new(numer, denom)?;
        Ok(Self(Ratio::one() - probability.0))
    }

    /// Probability of penetration in a year.
    pub fn penetration_probability(&self) -> Ratio<u64> {
        Ratio::one() - self.0
    }

    /// The exact value.
    pub fn as_ratio(&self) -> Ratio<u64> {
        self.0
    }
}

impl fmt::Display for Reliability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Reliability {
    type Err = ModelError;

    /// Parses `"n/d"` or `"n"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ratio = Ratio::<u64>::from_str(s.trim())
            .map_err(|_| ModelError::InvalidReliability(s.to_string()))?;
        Self::new(*ratio.numer(), *ratio.denom())
    }
}

/// A control able to discharge security requirements.
///
/// `fill` must be a pure function of the graph and the requirement. It
/// returns `None` when the requirement is fully discharged, or the unmet
/// remainder otherwise (the input itself when nothing applies).
pub trait Protection: fmt::Debug + Send + Sync {
    /// Short label used in reports and diagrams.
    fn label(&self) -> &str;

    /// Actors this protection relies on.
    fn trustees(&self) -> &[Actor];

    /// Yearly reliability.
    fn reliability(&self) -> Reliability;

    /// Properties this protection can provide.
    fn security_properties(&self) -> &BTreeSet<RequirementType>;

    /// Discharge what this protection can of `requirement`.
    fn fill(&self, graph: &Graph, requirement: Requirement) -> Option<Requirement>;

    /// The member view of this protection, for member-scoped controls.
    fn as_with_members(&self) -> Option<&dyn ProtectionWithMembers> {
        None
    }

    /// Whether `requirement` trusts every actor this protection relies on.
    fn is_trusted_by(&self, requirement: &Requirement) -> bool {
        self.trustees().iter().all(|t| requirement.is_trustee(t))
    }
}

/// A protection whose coverage depends on which actors participate.
pub trait ProtectionWithMembers: Protection {
    /// Participating actors.
    fn members(&self) -> &[Actor];

    /// Whether `actor` participates.
    fn is_member(&self, actor: &Actor) -> bool {
        self.members().iter().any(|m| m.name_str() == actor.name_str())
    }
}

/// A control providing some properties for every flow in its scope, e.g.
/// transport encryption or signed payloads.
///
/// With an empty scope the control applies to any data type.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityControl {
    /// Report label.
    pub label: String,
    /// Actors the control relies on.
    pub trustees: Vec<Actor>,
    /// Yearly reliability.
    pub reliability: Reliability,
    /// Properties provided.
    pub security_properties: BTreeSet<RequirementType>,
    /// Data types the control applies to; empty means all.
    pub scope: Vec<DataType>,
}

impl SecurityControl {
    /// A control that provides nothing yet.
    pub fn new(label: impl Into<String>, reliability: Reliability) -> Self {
        Self {
            label: label.into(),
            trustees: Vec::new(),
            reliability,
            security_properties: BTreeSet::new(),
            scope: Vec::new(),
        }
    }

    /// Set the actors the control relies on.
    pub fn trustees(mut self, actors: impl IntoIterator<Item = Actor>) -> Self {
        self.trustees = actors.into_iter().collect();
        self
    }

    /// Set the properties provided.
    pub fn provides(mut self, properties: impl IntoIterator<Item = RequirementType>) -> Self {
        self.security_properties = properties.into_iter().collect();
        self
    }

    /// Restrict the control to flows of these data types.
    pub fn scoped_to(mut self, data_types: impl IntoIterator<Item = DataType>) -> Self {
        self.scope = data_types.into_iter().collect();
        self
    }

    fn in_scope(&self, data_type: &DataType) -> bool {
        self.scope.is_empty() || self.scope.iter().any(|d| d.name == data_type.name)
    }

    fn covers(&self, requirement: &Requirement) -> bool {
        requirement.flows.iter().all(|f| self.in_scope(&f.data_type))
            && requirement.data_types.iter().all(|d| self.in_scope(d))
    }
}

impl Protection for SecurityControl {
    fn label(&self) -> &str {
        &self.label
    }

    fn trustees(&self) -> &[Actor] {
        &self.trustees
    }

    fn reliability(&self) -> Reliability {
        self.reliability
    }

    fn security_properties(&self) -> &BTreeSet<RequirementType> {
        &self.security_properties
    }

    fn fill(&self, _graph: &Graph, requirement: Requirement) -> Option<Requirement> {
        if !self.is_trusted_by(&requirement) || !self.covers(&requirement) {
            return Some(requirement);
        }
        let mut residual = requirement;
        residual
            .types
            .retain(|t| !self.security_properties.contains(t));
        if residual.types.is_empty() {
            None
        } else {
            Some(residual)
        }
    }
}

/// A member-scoped control, e.g. an access-control group or a private
/// network segment: flows between two members are protected.
///
/// The group only acts on a requirement when it provides every demanded
/// property. It then removes the flows between members; the requirement
/// is discharged once no flow is left.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessGroup {
    /// Report label.
    pub label: String,
    /// Actors the group relies on, e.g. its administrator.
    pub trustees: Vec<Actor>,
    /// Yearly reliability.
    pub reliability: Reliability,
    /// Properties provided to flows between members.
    pub security_properties: BTreeSet<RequirementType>,
    /// Members of the group.
    pub members: Vec<Actor>,
}

impl AccessGroup {
    /// An empty group.
    pub fn new(label: impl Into<String>, reliability: Reliability) -> Self {
        Self {
            label: label.into(),
            trustees: Vec::new(),
            reliability,
            security_properties: BTreeSet::new(),
            members: Vec::new(),
        }
    }

    /// Set the actors the group relies on.
    pub fn trustees(mut self, actors: impl IntoIterator<Item = Actor>) -> Self {
        self.trustees = actors.into_iter().collect();
        self
    }

    /// Set the properties provided.
    pub fn provides(mut self, properties: impl IntoIterator<Item = RequirementType>) -> Self {
        self.security_properties = properties.into_iter().collect();
        self
    }

    /// Set the members.
    pub fn members(mut self, actors: impl IntoIterator<Item = Actor>) -> Self {
        self.members = actors.into_iter().collect();
        self
    }

    fn is_internal(&self, flow: &Flow) -> bool {
        self.is_member(&flow.producer) && self.is_member(&flow.consumer)
    }
}

impl Protection for AccessGroup {
    fn label(&self) -> &str {
        &self.label
    }

    fn trustees(&self) -> &[Actor] {
        &self.trustees
    }

    fn reliability(&self) -> Reliability {
        self.reliability
    }

    fn security_properties(&self) -> &BTreeSet<RequirementType> {
        &self.security_properties
    }

    fn fill(&self, graph: &Graph, requirement: Requirement) -> Option<Requirement> {
        if !self.is_trusted_by(&requirement)
            || !requirement.types.is_subset(&self.security_properties)
        {
            return Some(requirement);
        }

        // Judge the listed flows together with every graph flow the data
        // types select, deduplicated by identity.
        let mut judged = requirement.clone();
        judged.expand(graph);

        let (internal, remaining): (Vec<Flow>, Vec<Flow>) =
            judged.flows.into_iter().partition(|f| self.is_internal(f));
        if internal.is_empty() {
            return Some(requirement);
        }
        if remaining.is_empty() {
            return None;
        }
        // The residual lists its open flows explicitly and selects no data types.
        Some(Requirement {
            flows: remaining,
            data_types: Vec::new(),
            ..requirement
        })
    }

    fn as_with_members(&self) -> Option<&dyn ProtectionWithMembers> {
        Some(self)
    }
}

impl ProtectionWithMembers for AccessGroup {
    fn members(&self) -> &[Actor] {
        &self.members
    }
}
