//! # Flow Guard
//!
//! A data-flow security model: who sends what to whom, which security
//! properties those flows must have, and whether the declared protections
//! actually provide them.
//!
//! ## Model
//!
//! ```text
//! TrustZone ─┐
//!            ├─ Actor ──┬── Flow (type, producer, consumer)
//! Aspect ────┘          └── Store (type, owner)
//!
//! Requirement { types, beneficiaries, trustees, flows | data_types }
//! Protection  { trustees, reliability, properties, fill() }
//! ```
//!
//! A [`Graph`] holds actors, stores and flows keyed by identity (last write
//! wins), plus requirements and protections in order. Flow templates
//! ([`MultiFlow`], [`FlowPath`]) are expanded to plain flows on insertion.
//!
//! [`fill_requirements`] runs every requirement through the protections in
//! order and returns what is left: the gaps in the model's security.
//!
//! ## Quick Start
//!
//! ```rust
//! use flow_guard::{fill_requirements, security, Actor, AccessGroup, DataType, Flow, Graph,
//!     Reliability, Requirement};
//!
//! let (a, b) = (Actor::new("A"), Actor::new("B"));
//! let mut graph = Graph::new();
//! graph.update(vec![Flow::new(DataType::new("X"), a.clone(), b.clone())]).unwrap();
//! graph.update_requirements([Requirement::new([security::secrecy()])
//!     .trustees([a.clone(), b.clone()])
//!     .data_types([DataType::new("X")])]);
//! graph.expand_requirements();
//!
//! assert_eq!(fill_requirements(&graph).len(), 1);
//!
//! graph.add_protection(AccessGroup::new("vpc", Reliability::certain())
//!     .provides([security::secrecy()])
//!     .members([a, b]));
//! assert!(fill_requirements(&graph).is_empty());
//! ```
//!
//! ## Quantification
//!
//! A [`QuantifiedGraph`] states a model for every value of its
//! [`PredicateVariable`]s, e.g. every tenant. Coverage over the graph as
//! stored treats unexpanded variables as opaque names; per-value checks
//! need an expansion over finite ranges with [`QuantifiedGraph::instantiate`].

#![deny(missing_docs)]
#![deny(unsafe_code)]

mod coverage;
mod derive;
mod element;
mod error;
mod graph;
mod name;
mod protection;
mod quantifier;
mod requirement;
pub mod security;

#[cfg(feature = "serde")]
pub mod document;

pub use coverage::{fill_requirements, fill_requirements_with, CoverageConfig, EmptyTypesPolicy};
pub use derive::{add_to_collection, make_collection, Collection, Entity, FlowPath, MultiFlow};
pub use element::{
    Actor, Aspect, AspectType, Bound, DataKind, DataType, Detail, ElementKind, Flow,
    PredicateVariable, Store, Term, TrustZone, ZoneKind,
};
pub use error::ModelError;
pub use graph::{FlowStatus, Graph};
pub use name::{Element, FlowKey, Name, StoreKey};
pub use protection::{AccessGroup, Protection, ProtectionWithMembers, Reliability, SecurityControl};
pub use quantifier::{Assignment, Instance, QuantifiedGraph, Quantifier, Ranges};
pub use requirement::{Requirement, RequirementType};

#[cfg(feature = "serde")]
pub use document::{ModelSpec, SpecError};
