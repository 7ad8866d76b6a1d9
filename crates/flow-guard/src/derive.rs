//! Flow templates and their expansion into concrete flows.
//!
//! Models are usually written compactly: "these three data types go from
//! every client to every server", or "this data travels along
//! customer → gateway → backend". The templates here capture those
//! statements; only the flows they derive ever enter a graph.
//!
//! ```text
//! MultiFlow(T, P, C)   →  |T| × |P| × |C| flows
//! FlowPath(T, a1..an)  →  |T| × (n - 1) flows   (zero when n < 2)
//! ```

use std::collections::BTreeMap;

use crate::element::{Actor, DataType, Flow, PredicateVariable, Store, TrustZone};
use crate::name::{Element, Name};

/// Every data type flows from every producer to every consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiFlow {
    /// Data types in motion.
    pub types: Vec<DataType>,
    /// Producing actors.
    pub producers: Vec<Actor>,
    /// Consuming actors.
    pub consumers: Vec<Actor>,
}

impl MultiFlow {
    /// Create the template.
    pub fn new(types: Vec<DataType>, producers: Vec<Actor>, consumers: Vec<Actor>) -> Self {
        Self {
            types,
            producers,
            consumers,
        }
    }

    /// The cartesian product of concrete flows, type-major.
    pub fn derived_elements(&self) -> impl Iterator<Item = Flow> + '_ {
        self.types.iter().flat_map(move |data_type| {
            self.producers.iter().flat_map(move |producer| {
                self.consumers
                    .iter()
                    .map(move |consumer| Flow::new(data_type.clone(), producer.clone(), consumer.clone()))
            })
        })
    }
}

/// Data types that travel hop by hop along an ordered path of actors.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowPath {
    /// Data types in motion.
    pub types: Vec<DataType>,
    /// The actors visited, in order.
    pub path: Vec<Actor>,
}

impl FlowPath {
    /// Create the template.
    pub fn new(types: Vec<DataType>, path: Vec<Actor>) -> Self {
        Self { types, path }
    }

    /// One flow per type per adjacent pair of actors on the path.
    pub fn derived_elements(&self) -> impl Iterator<Item = Flow> + '_ {
        self.types.iter().flat_map(move |data_type| {
            self.path
                .windows(2)
                .map(move |hop| Flow::new(data_type.clone(), hop[0].clone(), hop[1].clone()))
        })
    }
}

/// Anything a model script may hand to [`Graph::update`](crate::Graph::update).
///
/// Only actors, stores and flows (and the templates that derive flows)
/// are stored by a graph; the remaining kinds are modeled elements in
/// their own right but are rejected by `update`.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    /// A trust zone.
    TrustZone(TrustZone),
    /// A data type.
    DataType(DataType),
    /// A predicate variable.
    Variable(PredicateVariable),
    /// An actor.
    Actor(Actor),
    /// A store.
    Store(Store),
    /// A flow.
    Flow(Flow),
    /// A cartesian flow template.
    MultiFlow(MultiFlow),
    /// A path flow template.
    FlowPath(FlowPath),
}

impl Entity {
    /// Human-readable kind, used in validation errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TrustZone(zone) if zone.is_account() => "account",
            Self::TrustZone(_) => "trust zone",
            Self::DataType(_) => "data type",
            Self::Variable(_) => "predicate variable",
            Self::Actor(_) => "actor",
            Self::Store(_) => "store",
            Self::Flow(_) => "flow",
            Self::MultiFlow(_) => "multi-flow",
            Self::FlowPath(_) => "flow path",
        }
    }

    /// Whether a graph can store this entity (possibly after derivation).
    pub fn is_storable(&self) -> bool {
        matches!(
            self,
            Self::Actor(_) | Self::Store(_) | Self::Flow(_) | Self::MultiFlow(_) | Self::FlowPath(_)
        )
    }

    /// Identity of a concrete entity. Templates have none.
    pub fn name(&self) -> Option<Name> {
        match self {
            Self::TrustZone(zone) => Some(zone.name()),
            Self::DataType(data_type) => Some(data_type.name()),
            Self::Variable(var) => Some(var.name()),
            Self::Actor(actor) => Some(actor.name()),
            Self::Store(store) => Some(store.name()),
            Self::Flow(flow) => Some(flow.name()),
            Self::MultiFlow(_) | Self::FlowPath(_) => None,
        }
    }

    /// Display label for diagnostics; templates are labeled by their kind.
    pub fn label(&self) -> String {
        self.name()
            .map(|name| name.to_string())
            .unwrap_or_else(|| format!("<{}>", self.kind()))
    }
}

macro_rules! entity_from {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Entity {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

entity_from! {
    TrustZone => TrustZone,
    DataType => DataType,
    PredicateVariable => Variable,
    Actor => Actor,
    Store => Store,
    Flow => Flow,
    MultiFlow => MultiFlow,
    FlowPath => FlowPath,
}

/// Identity-keyed entities with templates replaced by their derived flows.
pub type Collection = BTreeMap<Name, Entity>;

/// Insert `entities` into `collection` by identity, expanding templates.
///
/// Later entries overwrite earlier ones sharing an identity.
pub fn add_to_collection<I>(collection: &mut Collection, entities: I)
where
    I: IntoIterator,
    I::Item: Into<Entity>,
{
    for entity in entities {
        match entity.into() {
            Entity::MultiFlow(template) => {
                for flow in template.derived_elements() {
                    collection.insert(flow.name(), Entity::Flow(flow));
                }
            }
            Entity::FlowPath(template) => {
                for flow in template.derived_elements() {
                    collection.insert(flow.name(), Entity::Flow(flow));
                }
            }
            concrete => {
                if let Some(name) = concrete.name() {
                    collection.insert(name, concrete);
                }
            }
        }
    }
}

/// Build a fresh collection from `entities`.
pub fn make_collection<I>(entities: I) -> Collection
where
    I: IntoIterator,
    I::Item: Into<Entity>,
{
    let mut collection = Collection::new();
    add_to_collection(&mut collection, entities);
    collection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::FlowKey;

    fn actors(names: &[&str]) -> Vec<Actor> {
        names.iter().map(|n| Actor::new(*n)).collect()
    }

    fn types(names: &[&str]) -> Vec<DataType> {
        names.iter().map(|n| DataType::new(*n)).collect()
    }

    #[test]
    fn multi_flow_is_cartesian_product() {
        let template = MultiFlow::new(types(&["x", "y"]), actors(&["a", "b"]), actors(&["c", "d", "e"]));
        let keys: Vec<FlowKey> = template.derived_elements().map(|f| f.key()).collect();
        assert_eq!(keys.len(), 12);
        assert_eq!(keys[0], FlowKey::new("x", "a", "c"));
        assert_eq!(keys[11], FlowKey::new("y", "b", "e"));
    }

    #[test]
    fn multi_flow_with_empty_side_derives_nothing() {
        let template = MultiFlow::new(types(&["x"]), Vec::new(), actors(&["c"]));
        assert_eq!(template.derived_elements().count(), 0);
        let template = MultiFlow::new(Vec::new(), actors(&["a"]), actors(&["c"]));
        assert_eq!(template.derived_elements().count(), 0);
    }

    #[test]
    fn flow_path_slides_a_window_of_two() {
        let template = FlowPath::new(types(&["red"]), actors(&["customer", "s1", "s2"]));
        let keys: Vec<FlowKey> = template.derived_elements().map(|f| f.key()).collect();
        assert_eq!(
            keys,
            vec![FlowKey::new("red", "customer", "s1"), FlowKey::new("red", "s1", "s2")]
        );
    }

    #[test]
    fn short_flow_path_derives_nothing() {
        assert_eq!(FlowPath::new(types(&["red"]), actors(&["solo"])).derived_elements().count(), 0);
        assert_eq!(FlowPath::new(types(&["red"]), Vec::new()).derived_elements().count(), 0);
    }

    #[test]
    fn templates_never_become_keys() {
        let collection = make_collection(vec![
            Entity::from(Actor::new("a")),
            Entity::from(FlowPath::new(types(&["x"]), actors(&["a", "b"]))),
        ]);
        assert_eq!(collection.len(), 2);
        assert!(collection.values().all(|e| !matches!(e, Entity::FlowPath(_) | Entity::MultiFlow(_))));
    }

    #[test]
    fn later_entries_win() {
        let first = Actor::new("a").with_comment("first");
        let second = Actor::new("a").with_comment("second");
        let collection = make_collection(vec![first, second.clone()]);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get(&Name::from("a")), Some(&Entity::Actor(second)));
    }

    #[test]
    fn template_labels_show_kind() {
        let template = Entity::from(MultiFlow::new(Vec::new(), Vec::new(), Vec::new()));
        assert_eq!(template.label(), "<multi-flow>");
        assert_eq!(Entity::from(Actor::new("a")).label(), "a");
    }
}
