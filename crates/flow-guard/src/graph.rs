//! The graph: the aggregate root of a data-flow model.
//!
//! A graph is built by a single writer through the `update*` operations and
//! then handed, read-only, to coverage checking and reporting. Actors,
//! stores and flows are kept in identity-keyed maps (last write wins);
//! requirements and protections are positional lists.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::derive::{make_collection, Entity};
use crate::element::{Actor, Flow, Store};
use crate::error::ModelError;
use crate::name::{FlowKey, StoreKey};
use crate::protection::{Protection, ProtectionWithMembers};
use crate::requirement::Requirement;

/// How a flow relates to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStatus {
    /// The flow is in the graph.
    Modeled,
    /// The flow is absent and the graph treats absence as prohibition.
    Forbidden,
    /// The flow is absent and nothing is known about it.
    Unmodeled,
}

/// Actors, stores and flows plus the requirements and protections that
/// apply to them.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// When true, a flow absent from the graph is not permitted, rather
    /// than merely not modeled.
    pub flow_omission_equals_restriction: bool,
    /// Actors by name.
    pub actors: BTreeMap<String, Actor>,
    /// Stores by `(type, owner)`.
    pub stores: BTreeMap<StoreKey, Store>,
    /// Flows by `(type, producer, consumer)`.
    pub flows: BTreeMap<FlowKey, Flow>,
    /// Requirements, in insertion order.
    pub requirements: Vec<Requirement>,
    /// Protections, in insertion order.
    pub protections: Vec<Arc<dyn Protection>>,
}

impl Graph {
    /// An empty graph where absent flows are merely unmodeled.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty graph where absent flows are forbidden.
    pub fn restrictive() -> Self {
        Self {
            flow_omission_equals_restriction: true,
            ..Self::default()
        }
    }

    /// Merge actors by name.
    pub fn update_actors(&mut self, actors: impl IntoIterator<Item = Actor>) {
        for actor in actors {
            self.actors.insert(actor.name_str().to_string(), actor);
        }
    }

    /// Merge actors, stores and flows, expanding flow templates first.
    ///
    /// The whole batch is validated before anything is inserted: any other
    /// kind of entity rejects the batch and leaves the graph untouched.
    pub fn update<I>(&mut self, elements: I) -> Result<(), ModelError>
    where
        I: IntoIterator,
        I::Item: Into<Entity>,
    {
        let elements: Vec<Entity> = elements.into_iter().map(Into::into).collect();
        if let Some(rejected) = elements.iter().find(|e| !e.is_storable()) {
            return Err(ModelError::UnsupportedKind {
                kind: rejected.kind(),
                name: rejected.label(),
            });
        }

        let collection = make_collection(elements);
        let (mut actors, mut stores, mut flows) = (0usize, 0usize, 0usize);
        for entity in collection.into_values() {
            match entity {
                Entity::Actor(actor) => {
                    actors += 1;
                    self.actors.insert(actor.name_str().to_string(), actor);
                }
                Entity::Store(store) => {
                    stores += 1;
                    self.stores.insert(store.key(), store);
                }
                Entity::Flow(flow) => {
                    flows += 1;
                    self.flows.insert(flow.key(), flow);
                }
                // Filtered out by the validation above.
                _ => {}
            }
        }
        debug!(actors, stores, flows, "graph updated");
        Ok(())
    }

    /// Append requirements. No deduplication: identity is positional.
    pub fn update_requirements(&mut self, requirements: impl IntoIterator<Item = Requirement>) {
        self.requirements.extend(requirements);
    }

    /// Append protections. No deduplication: identity is positional.
    pub fn update_protections(
        &mut self,
        protections: impl IntoIterator<Item = Arc<dyn Protection>>,
    ) {
        self.protections.extend(protections);
    }

    /// Append one protection.
    pub fn add_protection(&mut self, protection: impl Protection + 'static) {
        self.protections.push(Arc::new(protection));
    }

    /// Flows consumed by `actor`, read live from the flow map.
    pub fn inputs<'a>(&'a self, actor: &'a Actor) -> impl Iterator<Item = &'a Flow> + 'a {
        self.flows
            .values()
            .filter(move |f| f.consumer.name_str() == actor.name_str())
    }

    /// Flows produced by `actor`, read live from the flow map.
    pub fn outputs<'a>(&'a self, actor: &'a Actor) -> impl Iterator<Item = &'a Flow> + 'a {
        self.flows
            .values()
            .filter(move |f| f.producer.name_str() == actor.name_str())
    }

    /// Look up an actor by name.
    pub fn actor(&self, name: &str) -> Option<&Actor> {
        self.actors.get(name)
    }

    /// Interpret a flow's presence or absence.
    pub fn flow_status(&self, key: &FlowKey) -> FlowStatus {
        if self.flows.contains_key(key) {
            FlowStatus::Modeled
        } else if self.flow_omission_equals_restriction {
            FlowStatus::Forbidden
        } else {
            FlowStatus::Unmodeled
        }
    }

    /// Protections whose coverage depends on their members.
    pub fn protections_with_members(&self) -> impl Iterator<Item = &dyn ProtectionWithMembers> + '_ {
        self.protections.iter().filter_map(|p| p.as_with_members())
    }

    /// Derive every requirement's flows from its data types.
    ///
    /// Coverage checking assumes this has been done; it is never run
    /// implicitly. Returns the number of flows added across requirements.
    pub fn expand_requirements(&mut self) -> usize {
        let mut requirements = std::mem::take(&mut self.requirements);
        let added: usize = requirements.iter_mut().map(|r| r.expand(self)).sum();
        self.requirements = requirements;
        added
    }
}
