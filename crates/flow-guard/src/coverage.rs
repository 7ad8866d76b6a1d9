//! Requirement coverage: which requirements no protection discharges.
//!
//! ```text
//! for each requirement r (in order):
//!     for each protection p (in order):
//!         r = p.fill(graph, r)      // None: covered, stop
//!     if r is still present: report r
//! ```
//!
//! Protections are OR-combined per requirement: the first protection that
//! returns `None` covers the requirement outright. There is no partial
//! credit across protections beyond the narrowing each `fill` performs.
//!
//! Requirements declared by data type must be expanded
//! ([`Graph::expand_requirements`]) before coverage is meaningful; this
//! module never expands them itself.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;
use crate::graph::Graph;
use crate::protection::Reliability;
use crate::requirement::Requirement;

/// What to do with a requirement that demands no security property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EmptyTypesPolicy {
    /// Pass it through the protections like any other requirement; the
    /// outcome is up to each protection's `fill`.
    #[default]
    Delegate,
    /// Treat it as covered without consulting any protection.
    Satisfied,
    /// Treat it as ill-formed input.
    Reject,
}

impl EmptyTypesPolicy {
    /// Name of the policy as written in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delegate => "delegate",
            Self::Satisfied => "satisfied",
            Self::Reject => "reject",
        }
    }
}

/// Tunables of the coverage engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageConfig {
    /// Handling of requirements without types.
    pub empty_types: EmptyTypesPolicy,
    /// Protections less reliable than this are ignored.
    pub min_reliability: Option<Reliability>,
}

impl CoverageConfig {
    /// Set the empty-types policy.
    pub fn with_empty_types(mut self, policy: EmptyTypesPolicy) -> Self {
        self.empty_types = policy;
        self
    }

    /// Ignore protections below `reliability`.
    pub fn with_min_reliability(mut self, reliability: Reliability) -> Self {
        self.min_reliability = Some(reliability);
        self
    }
}

/// Requirements left unfilled by the graph's protections, with the default
/// configuration.
pub fn fill_requirements(graph: &Graph) -> Vec<Requirement> {
    let mut unfilled = Vec::new();
    for requirement in &graph.requirements {
        if let Some(residual) = fill_one(graph, requirement.clone(), None) {
            unfilled.push(residual);
        }
    }
    unfilled
}

/// Requirements left unfilled by the graph's protections.
pub fn fill_requirements_with(
    graph: &Graph,
    config: &CoverageConfig,
) -> Result<Vec<Requirement>, ModelError> {
    let mut unfilled = Vec::new();
    for (index, requirement) in graph.requirements.iter().enumerate() {
        if requirement.types.is_empty() {
            match config.empty_types {
                EmptyTypesPolicy::Delegate => {}
                EmptyTypesPolicy::Satisfied => {
                    debug!(index, "requirement without types treated as satisfied");
                    continue;
                }
                EmptyTypesPolicy::Reject => {
                    return Err(ModelError::EmptyRequirementTypes { index });
                }
            }
        }
        if let Some(residual) = fill_one(graph, requirement.clone(), config.min_reliability) {
            unfilled.push(residual);
        }
    }
    Ok(unfilled)
}

fn fill_one(
    graph: &Graph,
    requirement: Requirement,
    min_reliability: Option<Reliability>,
) -> Option<Requirement> {
    let mut residual = requirement;
    for protection in &graph.protections {
        if min_reliability.is_some_and(|min| protection.reliability() < min) {
            debug!(protection = protection.label(), "skipped: below minimum reliability");
            continue;
        }
        match protection.fill(graph, residual) {
            Some(rest) => residual = rest,
            None => {
                debug!(protection = protection.label(), "requirement covered");
                return None;
            }
        }
    }
    Some(residual)
}
