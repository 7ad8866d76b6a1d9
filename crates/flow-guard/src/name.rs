//! Identity keys for model elements.
//!
//! Every element derives its identity from names, never from object
//! identity. Atomic elements (actors, trust zones, data types) are keyed by
//! their own name; composite elements are keyed by the names of the
//! elements they bind:
//!
//! ```text
//! Store: (type, owner)
//! Flow:  (type, producer, consumer)
//! ```
//!
//! Collections keyed this way deduplicate on insert: a later element with
//! the same key replaces the earlier one.

use std::fmt;

use crate::element::Aspect;

/// The identity of an element: a single string or an ordered tuple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Name {
    /// Identity of a named element.
    Atom(String),
    /// Structural identity of a composite element.
    Tuple(Vec<String>),
}

impl Name {
    /// The parts of this name in order. An atom has exactly one part.
    pub fn parts(&self) -> Vec<&str> {
        match self {
            Self::Atom(name) => vec![name.as_str()],
            Self::Tuple(parts) => parts.iter().map(String::as_str).collect(),
        }
    }

    /// Returns the atom, or `None` for tuple names.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Self::Atom(name) => Some(name),
            Self::Tuple(_) => None,
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(name) => f.write_str(name),
            Self::Tuple(parts) => write!(f, "({})", parts.join(", ")),
        }
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Self::Atom(name.to_string())
    }
}

impl From<String> for Name {
    fn from(name: String) -> Self {
        Self::Atom(name)
    }
}

/// Identity of a [`Store`](crate::Store): `(type, owner)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreKey {
    /// Name of the stored data type.
    pub data_type: String,
    /// Name of the owning actor.
    pub owner: String,
}

impl StoreKey {
    /// Build a store key from names.
    pub fn new(data_type: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            owner: owner.into(),
        }
    }
}

impl From<StoreKey> for Name {
    fn from(key: StoreKey) -> Self {
        Name::Tuple(vec![key.data_type, key.owner])
    }
}

/// Identity of a [`Flow`](crate::Flow): `(type, producer, consumer)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlowKey {
    /// Name of the data type in motion.
    pub data_type: String,
    /// Name of the producing actor.
    pub producer: String,
    /// Name of the consuming actor.
    pub consumer: String,
}

impl FlowKey {
    /// Build a flow key from names.
    pub fn new(
        data_type: impl Into<String>,
        producer: impl Into<String>,
        consumer: impl Into<String>,
    ) -> Self {
        Self {
            data_type: data_type.into(),
            producer: producer.into(),
            consumer: consumer.into(),
        }
    }
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --[{}]-> {}", self.producer, self.data_type, self.consumer)
    }
}

impl From<FlowKey> for Name {
    fn from(key: FlowKey) -> Self {
        Name::Tuple(vec![key.data_type, key.producer, key.consumer])
    }
}

/// Common read model of every modeled element.
///
/// Renderers and reports only ever see elements through this trait:
/// a name for labels, an optional comment, and the attached aspects.
pub trait Element {
    /// The identity of this element.
    fn name(&self) -> Name;

    /// Free-text comment, if any.
    fn comment(&self) -> Option<&str> {
        None
    }

    /// Typed metadata attached to this element. Never part of identity.
    fn aspects(&self) -> &[Aspect] {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_displays_as_plain_string() {
        assert_eq!(Name::from("customer").to_string(), "customer");
    }

    #[test]
    fn tuple_displays_parenthesized() {
        let name: Name = FlowKey::new("X", "A", "B").into();
        assert_eq!(name.to_string(), "(X, A, B)");
        assert_eq!(name.parts(), vec!["X", "A", "B"]);
        assert!(name.as_atom().is_none());
    }

    #[test]
    fn store_and_flow_keys_never_collide_with_atoms() {
        let atom = Name::from("X");
        let store: Name = StoreKey::new("X", "A").into();
        let flow: Name = FlowKey::new("X", "A", "B").into();
        assert_ne!(atom, store);
        assert_ne!(store, flow);
    }

    #[test]
    fn flow_key_display_reads_as_arrow() {
        assert_eq!(FlowKey::new("red", "a", "b").to_string(), "a --[red]-> b");
    }
}
