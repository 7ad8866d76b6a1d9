//! Security requirements over flows.

use std::collections::BTreeSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::element::{Actor, DataType, Flow};
use crate::graph::Graph;
use crate::name::FlowKey;

/// A named security property, e.g. secrecy. The set is open: any name is
/// a valid requirement type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RequirementType {
    /// Name of the property.
    pub name: String,
}

impl RequirementType {
    /// Create a requirement type.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for RequirementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A demand that some security properties hold over a set of flows.
///
/// Trustees are closed-world per requirement: an actor not listed here is
/// not trusted for this requirement, whatever other requirements say.
///
/// The flow list can be given explicitly, derived from `data_types` with
/// [`expand`](Self::expand), or both.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Requirement {
    /// Properties demanded.
    pub types: BTreeSet<RequirementType>,
    /// Actors the requirement protects.
    pub beneficiaries: Vec<Actor>,
    /// Actors trusted to uphold the requirement.
    pub trustees: Vec<Actor>,
    /// Flows the requirement applies to.
    pub flows: Vec<Flow>,
    /// Data types whose flows the requirement applies to.
    pub data_types: Vec<DataType>,
    /// Free-text comment.
    pub comment: Option<String>,
}

impl Requirement {
    /// A requirement demanding `types`, with nothing else set yet.
    pub fn new(types: impl IntoIterator<Item = RequirementType>) -> Self {
        Self {
            types: types.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Set the beneficiaries.
    pub fn beneficiaries(mut self, actors: impl IntoIterator<Item = Actor>) -> Self {
        self.beneficiaries = actors.into_iter().collect();
        self
    }

    /// Set the trustees.
    pub fn trustees(mut self, actors: impl IntoIterator<Item = Actor>) -> Self {
        self.trustees = actors.into_iter().collect();
        self
    }

    /// Set the explicit flows.
    pub fn flows(mut self, flows: impl IntoIterator<Item = Flow>) -> Self {
        self.flows = flows.into_iter().collect();
        self
    }

    /// Set the data types from which flows are derived.
    pub fn data_types(mut self, data_types: impl IntoIterator<Item = DataType>) -> Self {
        self.data_types = data_types.into_iter().collect();
        self
    }

    /// Set the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Whether `actor` is trusted for this requirement.
    pub fn is_trustee(&self, actor: &Actor) -> bool {
        self.trustees.iter().any(|t| t.name_str() == actor.name_str())
    }

    /// Whether `actor` benefits from this requirement.
    pub fn is_beneficiary(&self, actor: &Actor) -> bool {
        self.beneficiaries.iter().any(|b| b.name_str() == actor.name_str())
    }

    /// Whether this requirement demands `property`.
    pub fn demands(&self, property: &RequirementType) -> bool {
        self.types.contains(property)
    }

    /// Whether flows of `data_type` fall under this requirement's data types.
    pub fn covers_data_type(&self, data_type: &DataType) -> bool {
        self.data_types.iter().any(|d| d.name == data_type.name)
    }

    /// Identities of the flows currently listed.
    pub fn flow_keys(&self) -> BTreeSet<FlowKey> {
        self.flows.iter().map(Flow::key).collect()
    }

    /// Append every flow in `graph` whose data type is one of `data_types`.
    ///
    /// Flows already listed (by identity) are skipped, so calling this
    /// repeatedly never duplicates entries. Returns the number of flows
    /// added.
    pub fn expand(&mut self, graph: &Graph) -> usize {
        let mut known = self.flow_keys();
        let before = self.flows.len();
        for flow in graph.flows.values() {
            if self.covers_data_type(&flow.data_type) && known.insert(flow.key()) {
                self.flows.push(flow.clone());
            }
        }
        self.flows.len() - before
    }
}
