//! Model documents: graphs declared in YAML or TOML.
//!
//! A document lists every element by name and refers to other elements by
//! name. [`ModelSpec::build`] resolves the references and produces a
//! [`QuantifiedGraph`].
//!
//! # File Format
//!
//! ```yaml
//! name: tenant-example
//! trust_zones:
//!   - name: first_tz
//! variables:
//!   - name: tenant
//!     element_type: trust_zone
//! quantifiers:
//!   - for_all: [tenant]
//! data_types:
//!   - name: red_data
//!     aspects:
//!       - type: tenant
//!         variable: tenant
//! actors:
//!   - name: customer
//!   - name: service_1
//!     trust_zones: [first_tz]
//! flows:
//!   - data_type: red_data
//!     producer: customer
//!     consumer: service_1
//! requirements:
//!   - types: [secrecy]
//!     data_types: [red_data]
//!     trustees: [customer, service_1]
//! protections:
//!   - kind: access_group
//!     label: vpc
//!     reliability: "999/1000"
//!     provides: [secrecy]
//!     members: [customer, service_1]
//! ```
//!
//! Actor trust zones may name a declared trust zone or a declared
//! variable; a name declared as both is ambiguous and rejected.
//!
//! Aspects pointing at data types or actors carry the referenced
//! element's identity only, not its own aspects.
//!
//! # Loading
//!
//! ```rust,ignore
//! use flow_guard::document::ModelSpec;
//!
//! let yaml = std::fs::read_to_string("model.yaml")?;
//! let graph = ModelSpec::from_yaml(&yaml)?.build()?;
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::derive::{Entity, FlowPath, MultiFlow};
use crate::element::{
    Actor, Aspect, AspectType, Bound, DataKind, DataType, Detail, ElementKind, Flow,
    PredicateVariable, Store, Term, TrustZone,
};
use crate::error::ModelError;
use crate::graph::Graph;
use crate::protection::{AccessGroup, Protection, Reliability, SecurityControl};
use crate::quantifier::{QuantifiedGraph, Quantifier};
use crate::requirement::{Requirement, RequirementType};

/// Error type for model document parsing.
#[derive(Debug, Error)]
pub enum SpecError {
    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(String),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(String),
    /// The document is well-formed but inconsistent.
    #[error("validation error: {0}")]
    Validation(String),
    /// The model engine rejected a declared element.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A whole model, as loaded from a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Model name (required).
    pub name: String,

    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether a flow absent from the model is forbidden.
    #[serde(default)]
    pub flow_omission_equals_restriction: bool,

    /// Trust zones and accounts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trust_zones: Vec<TrustZoneSpec>,

    /// Predicate variables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<VariableSpec>,

    /// Quantifiers over the whole model, written `- for_all: [...]`.
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        with = "serde_yaml::with::singleton_map_recursive"
    )]
    pub quantifiers: Vec<QuantifierSpec>,

    /// Data types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_types: Vec<DataTypeSpec>,

    /// Actors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actors: Vec<ActorSpec>,

    /// Single flows.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flows: Vec<FlowSpec>,

    /// Cartesian flow templates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub multi_flows: Vec<MultiFlowSpec>,

    /// Path flow templates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flow_paths: Vec<FlowPathSpec>,

    /// Stores.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stores: Vec<StoreSpec>,

    /// Requirements, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<RequirementSpec>,

    /// Protections, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protections: Vec<ProtectionSpec>,
}

/// A trust zone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrustZoneSpec {
    /// Zone name.
    pub name: String,
    /// Whether the zone is an account.
    #[serde(default)]
    pub account: bool,
    /// Free-text comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A predicate variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    /// Variable name.
    pub name: String,
    /// What the variable ranges over.
    pub element_type: ElementKind,
}

/// A quantifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantifierSpec {
    /// Universal quantification over the named variables.
    ForAll(Vec<String>),
}

/// An aspect: a type tag plus exactly one reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AspectSpec {
    /// Aspect type name.
    #[serde(rename = "type")]
    pub aspect_type: String,
    /// A declared variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    /// A declared trust zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_zone: Option<String>,
    /// A declared data type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// A declared actor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

/// A data type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTypeSpec {
    /// Data type name.
    pub name: String,
    /// Role of the data.
    #[serde(default)]
    pub kind: DataKind,
    /// Opaque facts, each a single-key map such as `tenant_specific: true`.
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        with = "serde_yaml::with::singleton_map_recursive"
    )]
    pub details: Vec<Detail>,
    /// Aspects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aspects: Vec<AspectSpec>,
    /// Free-text comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// An actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorSpec {
    /// Actor name.
    pub name: String,
    /// Trust zones or trust-zone variables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trust_zones: Vec<String>,
    /// Aspects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aspects: Vec<AspectSpec>,
    /// Free-text comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A single flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSpec {
    /// Data type name.
    pub data_type: String,
    /// Producing actor.
    pub producer: String,
    /// Consuming actor.
    pub consumer: String,
}

/// Every type from every producer to every consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiFlowSpec {
    /// Data type names.
    pub types: Vec<String>,
    /// Producing actors.
    pub producers: Vec<String>,
    /// Consuming actors.
    pub consumers: Vec<String>,
}

/// Every type along each hop of a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowPathSpec {
    /// Data type names.
    pub types: Vec<String>,
    /// Actors in path order.
    pub path: Vec<String>,
}

/// A store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSpec {
    /// Stored data type.
    pub data_type: String,
    /// Owning actor.
    pub owner: String,
}

/// A requirement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementSpec {
    /// Demanded properties.
    pub types: Vec<RequirementType>,
    /// Beneficiary actors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub beneficiaries: Vec<String>,
    /// Trusted actors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trustees: Vec<String>,
    /// Explicit flows.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flows: Vec<FlowSpec>,
    /// Data types whose flows are covered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_types: Vec<String>,
    /// Free-text comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A protection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProtectionSpec {
    /// A [`SecurityControl`].
    Control(ControlSpec),
    /// An [`AccessGroup`].
    AccessGroup(AccessGroupSpec),
}

/// A security control.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlSpec {
    /// Label.
    pub label: String,
    /// Reliability as `"n/d"` or `"n"`.
    pub reliability: String,
    /// Actors the control relies on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trustees: Vec<String>,
    /// Properties provided.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<RequirementType>,
    /// Data types the control is limited to; empty means all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<String>,
}

/// An access group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessGroupSpec {
    /// Label.
    pub label: String,
    /// Reliability as `"n/d"` or `"n"`.
    pub reliability: String,
    /// Actors the group relies on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trustees: Vec<String>,
    /// Properties provided.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<RequirementType>,
    /// Members of the group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
}

impl ModelSpec {
    /// Parse from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, SpecError> {
        serde_yaml::from_str(yaml).map_err(|e| SpecError::Yaml(e.to_string()))
    }

    /// Parse from TOML.
    pub fn from_toml(toml_str: &str) -> Result<Self, SpecError> {
        toml::from_str(toml_str).map_err(|e| SpecError::Toml(e.to_string()))
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, SpecError> {
        serde_yaml::to_string(self).map_err(|e| SpecError::Yaml(e.to_string()))
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, SpecError> {
        toml::to_string_pretty(self).map_err(|e| SpecError::Toml(e.to_string()))
    }

    /// Check names and references without building anything.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.name.trim().is_empty() {
            return Err(invalid("model name cannot be empty"));
        }
        let names = Names::collect(self)?;

        for quantifier in &self.quantifiers {
            let QuantifierSpec::ForAll(vars) = quantifier;
            for var in vars {
                names.variable(var)?;
            }
        }
        for data_type in &self.data_types {
            for detail in &data_type.details {
                if let Detail::Uses(used) = detail {
                    names.data_type(used)?;
                }
            }
            for aspect in &data_type.aspects {
                names.aspect(aspect)?;
            }
        }
        for actor in &self.actors {
            for zone in &actor.trust_zones {
                names.zone_slot(zone)?;
            }
            for aspect in &actor.aspects {
                names.aspect(aspect)?;
            }
        }
        for flow in &self.flows {
            names.flow(flow)?;
        }
        for multi in &self.multi_flows {
            names.data_types(&multi.types)?;
            names.actors(&multi.producers)?;
            names.actors(&multi.consumers)?;
        }
        for path in &self.flow_paths {
            names.data_types(&path.types)?;
            names.actors(&path.path)?;
        }
        for store in &self.stores {
            names.data_type(&store.data_type)?;
            names.actor(&store.owner)?;
        }
        for requirement in &self.requirements {
            names.actors(&requirement.beneficiaries)?;
            names.actors(&requirement.trustees)?;
            names.data_types(&requirement.data_types)?;
            for flow in &requirement.flows {
                names.flow(flow)?;
            }
        }
        for protection in &self.protections {
            match protection {
                ProtectionSpec::Control(control) => {
                    nonempty("protection", &control.label)?;
                    names.actors(&control.trustees)?;
                    names.data_types(&control.scope)?;
                }
                ProtectionSpec::AccessGroup(group) => {
                    nonempty("protection", &group.label)?;
                    names.actors(&group.trustees)?;
                    names.actors(&group.members)?;
                }
            }
        }
        Ok(())
    }

    /// Validate and build the quantified graph.
    pub fn build(&self) -> Result<QuantifiedGraph, SpecError> {
        self.validate()?;
        let scope = Scope::new(self);

        let mut graph = if self.flow_omission_equals_restriction {
            Graph::restrictive()
        } else {
            Graph::new()
        };
        graph.update_actors(scope.actors.values().cloned());

        let mut entities: Vec<Entity> = Vec::new();
        for flow in &self.flows {
            entities.push(scope.flow(flow).into());
        }
        for multi in &self.multi_flows {
            entities.push(
                MultiFlow::new(
                    scope.data_types(&multi.types),
                    scope.actors(&multi.producers),
                    scope.actors(&multi.consumers),
                )
                .into(),
            );
        }
        for path in &self.flow_paths {
            entities.push(FlowPath::new(scope.data_types(&path.types), scope.actors(&path.path)).into());
        }
        for store in &self.stores {
            entities.push(Store::new(scope.data_type(&store.data_type), scope.actor(&store.owner)).into());
        }
        graph.update(entities)?;

        graph.update_requirements(self.requirements.iter().map(|spec| {
            let mut requirement = Requirement::new(spec.types.iter().cloned())
                .beneficiaries(scope.actors(&spec.beneficiaries))
                .trustees(scope.actors(&spec.trustees))
                .flows(spec.flows.iter().map(|f| scope.flow(f)))
                .data_types(scope.data_types(&spec.data_types));
            requirement.comment = spec.comment.clone();
            requirement
        }));

        let mut protections: Vec<Arc<dyn Protection>> = Vec::new();
        for spec in &self.protections {
            let protection: Arc<dyn Protection> = match spec {
                ProtectionSpec::Control(control) => Arc::new(
                    SecurityControl::new(&control.label, control.reliability.parse::<Reliability>()?)
                        .trustees(scope.actors(&control.trustees))
                        .provides(control.provides.iter().cloned())
                        .scoped_to(scope.data_types(&control.scope)),
                ) as Arc<dyn Protection>,
                ProtectionSpec::AccessGroup(group) => Arc::new(
                    AccessGroup::new(&group.label, group.reliability.parse::<Reliability>()?)
                        .trustees(scope.actors(&group.trustees))
                        .provides(group.provides.iter().cloned())
                        .members(scope.actors(&group.members)),
                ) as Arc<dyn Protection>,
            };
            protections.push(protection);
        }
        graph.update_protections(protections);

        let quantifiers = self.quantifiers.iter().map(|q| {
            let QuantifierSpec::ForAll(vars) = q;
            Quantifier::for_all(vars.iter().filter_map(|v| scope.variables.get(v).cloned()))
        });
        Ok(QuantifiedGraph::from_graph(graph, quantifiers.collect::<Vec<_>>()))
    }
}

fn invalid(msg: impl Into<String>) -> SpecError {
    SpecError::Validation(msg.into())
}

fn nonempty(what: &str, name: &str) -> Result<(), SpecError> {
    if name.trim().is_empty() {
        return Err(invalid(format!("{} name cannot be empty", what)));
    }
    Ok(())
}

/// Declared names per category.
struct Names<'a> {
    zones: BTreeSet<&'a str>,
    variables: BTreeMap<&'a str, ElementKind>,
    data_types: BTreeSet<&'a str>,
    actors: BTreeSet<&'a str>,
}

impl<'a> Names<'a> {
    fn collect(spec: &'a ModelSpec) -> Result<Self, SpecError> {
        let mut names = Self {
            zones: BTreeSet::new(),
            variables: BTreeMap::new(),
            data_types: BTreeSet::new(),
            actors: BTreeSet::new(),
        };
        for zone in &spec.trust_zones {
            declare("trust zone", &zone.name, names.zones.insert(zone.name.as_str()))?;
        }
        for var in &spec.variables {
            let fresh = names.variables.insert(var.name.as_str(), var.element_type).is_none();
            declare("variable", &var.name, fresh)?;
            if names.zones.contains(var.name.as_str()) {
                return Err(invalid(format!(
                    "`{}` is declared both as a trust zone and as a variable",
                    var.name
                )));
            }
        }
        for data_type in &spec.data_types {
            declare("data type", &data_type.name, names.data_types.insert(data_type.name.as_str()))?;
        }
        for actor in &spec.actors {
            declare("actor", &actor.name, names.actors.insert(actor.name.as_str()))?;
        }
        Ok(names)
    }

    fn variable(&self, name: &str) -> Result<ElementKind, SpecError> {
        self.variables
            .get(name)
            .copied()
            .ok_or_else(|| unknown("variable", name))
    }

    fn data_type(&self, name: &str) -> Result<(), SpecError> {
        if self.data_types.contains(name) {
            Ok(())
        } else {
            Err(unknown("data type", name))
        }
    }

    fn data_types(&self, names: &[String]) -> Result<(), SpecError> {
        names.iter().try_for_each(|n| self.data_type(n))
    }

    fn actor(&self, name: &str) -> Result<(), SpecError> {
        if self.actors.contains(name) {
            Ok(())
        } else {
            Err(unknown("actor", name))
        }
    }

    fn actors(&self, names: &[String]) -> Result<(), SpecError> {
        names.iter().try_for_each(|n| self.actor(n))
    }

    fn flow(&self, flow: &FlowSpec) -> Result<(), SpecError> {
        self.data_type(&flow.data_type)?;
        self.actor(&flow.producer)?;
        self.actor(&flow.consumer)
    }

    fn zone_slot(&self, name: &str) -> Result<(), SpecError> {
        if self.zones.contains(name) {
            return Ok(());
        }
        match self.variables.get(name) {
            Some(kind) if kind.admits(ElementKind::TrustZone) || *kind == ElementKind::Account => Ok(()),
            Some(kind) => Err(invalid(format!(
                "variable `{}` ranges over {} and cannot stand for a trust zone",
                name, kind
            ))),
            None => Err(unknown("trust zone", name)),
        }
    }

    fn aspect(&self, aspect: &AspectSpec) -> Result<(), SpecError> {
        nonempty("aspect type", &aspect.aspect_type)?;
        let targets = [
            aspect.variable.as_deref().map(|v| self.variable(v).map(|_| ())),
            aspect.trust_zone.as_deref().map(|z| {
                if self.zones.contains(z) {
                    Ok(())
                } else {
                    Err(unknown("trust zone", z))
                }
            }),
            aspect.data_type.as_deref().map(|d| self.data_type(d)),
            aspect.actor.as_deref().map(|a| self.actor(a)),
        ];
        let mut set = targets.into_iter().flatten();
        match (set.next(), set.next()) {
            (Some(result), None) => result,
            _ => Err(invalid(format!(
                "aspect `{}` must reference exactly one element",
                aspect.aspect_type
            ))),
        }
    }
}

fn declare(what: &str, name: &str, fresh: bool) -> Result<(), SpecError> {
    nonempty(what, name)?;
    if !fresh {
        return Err(invalid(format!("{} `{}` is declared twice", what, name)));
    }
    Ok(())
}

fn unknown(what: &str, name: &str) -> SpecError {
    invalid(format!("unknown {} `{}`", what, name))
}

/// Resolved elements of a validated document.
struct Scope {
    zones: BTreeMap<String, TrustZone>,
    variables: BTreeMap<String, PredicateVariable>,
    data_types: BTreeMap<String, DataType>,
    actors: BTreeMap<String, Actor>,
}

impl Scope {
    fn new(model: &ModelSpec) -> Self {
        let zones: BTreeMap<String, TrustZone> = model
            .trust_zones
            .iter()
            .map(|z| {
                let mut zone = if z.account {
                    TrustZone::account(&z.name)
                } else {
                    TrustZone::new(&z.name)
                };
                zone.comment = z.comment.clone();
                (z.name.clone(), zone)
            })
            .collect();
        let variables: BTreeMap<String, PredicateVariable> = model
            .variables
            .iter()
            .map(|v| (v.name.clone(), PredicateVariable::new(&v.name, v.element_type)))
            .collect();

        let mut scope = Self {
            zones,
            variables,
            data_types: BTreeMap::new(),
            actors: BTreeMap::new(),
        };

        for spec in &model.data_types {
            let data_type = DataType {
                name: spec.name.clone(),
                kind: spec.kind,
                details: spec.details.clone(),
                aspects: spec.aspects.iter().map(|a| scope.aspect(a)).collect(),
                comment: spec.comment.clone(),
            };
            scope.data_types.insert(spec.name.clone(), data_type);
        }
        for spec in &model.actors {
            let mut actor = Actor::new(&spec.name);
            for zone in &spec.trust_zones {
                actor = match scope.zones.get(zone) {
                    Some(concrete) => actor.in_zone(concrete.clone()),
                    None => match scope.variables.get(zone) {
                        Some(var) => actor.in_zone(var.clone()),
                        None => actor,
                    },
                };
            }
            for aspect in &spec.aspects {
                let Aspect { aspect_type, value } = scope.aspect(aspect);
                actor = actor.with_aspect(aspect_type, value);
            }
            if let Some(comment) = &spec.comment {
                actor = actor.with_comment(comment);
            }
            scope.actors.insert(spec.name.clone(), actor);
        }
        scope
    }

    fn aspect(&self, spec: &AspectSpec) -> Aspect {
        let aspect_type = AspectType::new(&spec.aspect_type);
        let value: Bound<Term> = if let Some(var) = spec.variable.as_ref().and_then(|v| self.variables.get(v)) {
            Bound::Variable(var.clone())
        } else if let Some(zone) = spec.trust_zone.as_ref().and_then(|z| self.zones.get(z)) {
            Bound::Concrete(Term::TrustZone(zone.clone()))
        } else if let Some(name) = &spec.data_type {
            Bound::Concrete(Term::DataType(DataType::new(name)))
        } else {
            Bound::Concrete(Term::Actor(Actor::new(spec.actor.as_deref().unwrap_or_default())))
        };
        Aspect::new(aspect_type, value)
    }

    fn data_type(&self, name: &str) -> DataType {
        self.data_types
            .get(name)
            .cloned()
            .unwrap_or_else(|| DataType::new(name))
    }

    fn data_types(&self, names: &[String]) -> Vec<DataType> {
        names.iter().map(|n| self.data_type(n)).collect()
    }

    fn actor(&self, name: &str) -> Actor {
        self.actors.get(name).cloned().unwrap_or_else(|| Actor::new(name))
    }

    fn actors(&self, names: &[String]) -> Vec<Actor> {
        names.iter().map(|n| self.actor(n)).collect()
    }

    fn flow(&self, spec: &FlowSpec) -> Flow {
        Flow::new(
            self.data_type(&spec.data_type),
            self.actor(&spec.producer),
            self.actor(&spec.consumer),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::fill_requirements;
    use crate::name::{Element, FlowKey};
    use crate::quantifier::Ranges;
    use crate::security::secrecy;

    const EXAMPLE_YAML: &str = r#"
name: tenant-example
description: One tenant's data through two services
trust_zones:
  - name: first_tz
  - name: second_tz
    account: true
variables:
  - name: tenant
    element_type: trust_zone
quantifiers:
  - for_all: [tenant]
data_types:
  - name: red_data
    aspects:
      - type: tenant
        variable: tenant
  - name: creds
    kind: authentication_secret
    details:
      - tenant_specific: true
actors:
  - name: customer
    trust_zones: [tenant]
  - name: service_1
    trust_zones: [first_tz]
  - name: service_2
    trust_zones: [second_tz]
flow_paths:
  - types: [red_data]
    path: [customer, service_1, service_2]
flows:
  - data_type: creds
    producer: customer
    consumer: service_1
requirements:
  - types: [secrecy, integrity]
    data_types: [red_data]
    trustees: [customer, service_1, service_2]
    beneficiaries: [customer]
protections:
  - kind: access_group
    label: private-network
    reliability: "999/1000"
    provides: [secrecy, integrity]
    members: [customer, service_1, service_2]
"#;

    #[test]
    fn parse_yaml() {
        let spec = ModelSpec::from_yaml(EXAMPLE_YAML).unwrap();
        assert_eq!(spec.name, "tenant-example");
        assert_eq!(spec.trust_zones.len(), 2);
        assert!(spec.trust_zones[1].account);
        assert_eq!(spec.quantifiers, vec![QuantifierSpec::ForAll(vec!["tenant".into()])]);
        assert_eq!(spec.data_types[1].kind, DataKind::AuthenticationSecret);
        assert_eq!(spec.data_types[1].details, vec![Detail::TenantSpecific(true)]);
        assert!(matches!(spec.protections[0], ProtectionSpec::AccessGroup(_)));
    }

    #[test]
    fn build_resolves_references() {
        let graph = ModelSpec::from_yaml(EXAMPLE_YAML).unwrap().build().unwrap();
        assert_eq!(graph.actors.len(), 3);
        assert_eq!(graph.flows.len(), 3);
        assert!(graph.flows.contains_key(&FlowKey::new("red_data", "service_1", "service_2")));
        assert_eq!(graph.bound_variables().len(), 1);
        assert!(graph.free_variables().is_empty());

        let customer = graph.actor("customer").unwrap();
        assert_eq!(customer.trust_zones()[0].name().to_string(), "tenant");
        let red = &graph.flows[&FlowKey::new("red_data", "customer", "service_1")].data_type;
        assert_eq!(red.aspects()[0].aspect_type, AspectType::new("tenant"));
        assert_eq!(graph.requirements[0].types.len(), 2);
        assert!(graph.requirements[0].demands(&secrecy()));
        assert_eq!(graph.protections[0].label(), "private-network");
    }

    #[test]
    fn access_group_covers_model_flows() {
        let mut graph = ModelSpec::from_yaml(EXAMPLE_YAML).unwrap().build().unwrap();
        assert!(fill_requirements(&graph).is_empty());
        assert_eq!(graph.expand_requirements(), 2);
        assert!(fill_requirements(&graph).is_empty());
    }

    #[test]
    fn built_model_instantiates() {
        let graph = ModelSpec::from_yaml(EXAMPLE_YAML).unwrap().build().unwrap();
        let ranges = Ranges::new().with(
            "tenant",
            [Term::TrustZone(TrustZone::new("t1")), Term::TrustZone(TrustZone::new("t2"))],
        );
        assert_eq!(graph.instantiate(&ranges).unwrap().len(), 2);
    }

    #[test]
    fn validation_empty_name() {
        let spec = ModelSpec::default();
        assert!(matches!(spec.validate(), Err(SpecError::Validation(_))));
    }

    #[test]
    fn unknown_actor_is_rejected() {
        let yaml = r#"
name: broken
data_types: [{ name: x }]
actors: [{ name: a }]
flows:
  - data_type: x
    producer: a
    consumer: ghost
"#;
        let err = ModelSpec::from_yaml(yaml).unwrap().build().unwrap_err();
        assert!(err.to_string().contains("unknown actor `ghost`"));
    }

    #[test]
    fn zone_and_variable_names_must_not_collide() {
        let yaml = r#"
name: ambiguous
trust_zones: [{ name: tenant }]
variables:
  - name: tenant
    element_type: trust_zone
"#;
        let err = ModelSpec::from_yaml(yaml).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("both as a trust zone and as a variable"));
    }

    #[test]
    fn actor_variables_cannot_be_zones() {
        let yaml = r#"
name: mistyped
variables:
  - name: someone
    element_type: actor
actors:
  - name: a
    trust_zones: [someone]
"#;
        let err = ModelSpec::from_yaml(yaml).unwrap().validate().unwrap_err();
        assert!(matches!(err, SpecError::Validation(_)));
    }

    #[test]
    fn aspect_needs_exactly_one_reference() {
        let yaml = r#"
name: vague
trust_zones: [{ name: z }]
data_types:
  - name: x
    aspects:
      - type: tenant
"#;
        assert!(ModelSpec::from_yaml(yaml).unwrap().validate().is_err());
    }

    #[test]
    fn malformed_reliability_is_a_model_error() {
        let yaml = r#"
name: unreliable
protections:
  - kind: control
    label: tls
    reliability: "3/2"
"#;
        let err = ModelSpec::from_yaml(yaml).unwrap().build().unwrap_err();
        assert!(matches!(err, SpecError::Model(ModelError::InvalidReliability(_))));
    }

    #[test]
    fn duplicate_declarations_are_rejected() {
        let yaml = r#"
name: twice
actors: [{ name: a }, { name: a }]
"#;
        let err = ModelSpec::from_yaml(yaml).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn single_key_maps_parse_in_both_formats() {
        let yaml = r#"
name: details
variables:
  - name: tenant
    element_type: trust_zone
quantifiers:
  - for_all: [tenant]
data_types:
  - name: creds
  - name: session
    details:
      - uses: creds
      - tenant_specific: true
      - note: short lived
"#;
        let spec = ModelSpec::from_yaml(yaml).unwrap();
        assert_eq!(spec.quantifiers, vec![QuantifierSpec::ForAll(vec!["tenant".into()])]);
        assert_eq!(
            spec.data_types[1].details,
            vec![
                Detail::Uses("creds".into()),
                Detail::TenantSpecific(true),
                Detail::Note("short lived".into()),
            ]
        );
        assert!(spec.to_yaml().unwrap().contains("for_all"));
        assert_eq!(ModelSpec::from_yaml(&spec.to_yaml().unwrap()).unwrap(), spec);

        let toml = r#"
name = "details"
variables = [{ name = "tenant", element_type = "trust_zone" }]
quantifiers = [{ for_all = ["tenant"] }]

[[data_types]]
name = "creds"

[[data_types]]
name = "session"
details = [{ uses = "creds" }, { tenant_specific = true }, { note = "short lived" }]
"#;
        assert_eq!(ModelSpec::from_toml(toml).unwrap(), spec);
    }

    #[test]
    fn roundtrip_yaml() {
        let spec = ModelSpec::from_yaml(EXAMPLE_YAML).unwrap();
        let parsed = ModelSpec::from_yaml(&spec.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed, spec);
    }

    #[test]
    fn toml_parsing() {
        let toml = r#"
name = "toml-model"
flow_omission_equals_restriction = true

[[data_types]]
name = "x"

[[actors]]
name = "a"

[[actors]]
name = "b"

[[flows]]
data_type = "x"
producer = "a"
consumer = "b"

[[requirements]]
types = ["secrecy"]
data_types = ["x"]
trustees = ["a", "b"]

[[protections]]
kind = "control"
label = "tls"
reliability = "1"
provides = ["secrecy"]
"#;
        let graph = ModelSpec::from_toml(toml).unwrap().build().unwrap();
        assert!(graph.flow_omission_equals_restriction);
        assert_eq!(graph.flows.len(), 1);
        assert!(fill_requirements(&graph).is_empty());
    }
}
