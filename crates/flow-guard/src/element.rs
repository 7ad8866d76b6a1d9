//! The entity vocabulary: trust zones, data types, actors, stores, flows
//! and predicate variables, plus the aspects that annotate them.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::name::{Element, FlowKey, Name, StoreKey};

/// The type tag of an aspect, e.g. `tenant`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AspectType {
    /// Name of the aspect type.
    pub name: String,
}

impl AspectType {
    /// Create an aspect type.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Typed metadata attached to an element.
///
/// Aspects are informational: they are rendered in labels and carried
/// through quantification, but never take part in identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Aspect {
    /// What this aspect says.
    pub aspect_type: AspectType,
    /// The element the aspect points at, possibly a predicate variable.
    pub value: Bound<Term>,
}

impl Aspect {
    /// Attach `value` under `aspect_type`.
    pub fn new(aspect_type: AspectType, value: impl Into<Bound<Term>>) -> Self {
        Self {
            aspect_type,
            value: value.into(),
        }
    }
}

/// The kinds of element a predicate variable can stand for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ElementKind {
    /// A trust zone (accounts included).
    TrustZone,
    /// An account trust zone.
    Account,
    /// A data type.
    DataType,
    /// An actor.
    Actor,
}

impl ElementKind {
    /// Whether a value of kind `found` may be substituted for a variable of
    /// this kind. Accounts are trust zones.
    pub fn admits(self, found: ElementKind) -> bool {
        self == found || (self == Self::TrustZone && found == Self::Account)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TrustZone => "trust zone",
            Self::Account => "account",
            Self::DataType => "data type",
            Self::Actor => "actor",
        };
        f.write_str(s)
    }
}

/// A concrete element that can be referenced from an aspect or bound to a
/// predicate variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// A trust zone or account.
    TrustZone(TrustZone),
    /// A data type.
    DataType(DataType),
    /// An actor.
    Actor(Actor),
}

impl Term {
    /// The element kind of this term.
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::TrustZone(zone) if zone.kind == ZoneKind::Account => ElementKind::Account,
            Self::TrustZone(_) => ElementKind::TrustZone,
            Self::DataType(_) => ElementKind::DataType,
            Self::Actor(_) => ElementKind::Actor,
        }
    }
}

impl Element for Term {
    fn name(&self) -> Name {
        match self {
            Self::TrustZone(zone) => zone.name(),
            Self::DataType(data_type) => data_type.name(),
            Self::Actor(actor) => actor.name(),
        }
    }
}

/// A slot holding either a concrete element or a predicate variable that
/// stands for every element of its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound<T> {
    /// A concrete element.
    Concrete(T),
    /// A universally quantified placeholder.
    Variable(PredicateVariable),
}

impl<T> Bound<T> {
    /// The concrete element, if this slot is not a variable.
    pub fn concrete(&self) -> Option<&T> {
        match self {
            Self::Concrete(value) => Some(value),
            Self::Variable(_) => None,
        }
    }

    /// The variable, if this slot is one.
    pub fn variable(&self) -> Option<&PredicateVariable> {
        match self {
            Self::Concrete(_) => None,
            Self::Variable(var) => Some(var),
        }
    }
}

impl<T: Element> Element for Bound<T> {
    fn name(&self) -> Name {
        match self {
            Self::Concrete(value) => value.name(),
            Self::Variable(var) => var.name(),
        }
    }
}

impl<T> From<PredicateVariable> for Bound<T> {
    fn from(var: PredicateVariable) -> Self {
        Self::Variable(var)
    }
}

impl From<TrustZone> for Bound<TrustZone> {
    fn from(zone: TrustZone) -> Self {
        Self::Concrete(zone)
    }
}

impl From<TrustZone> for Bound<Term> {
    fn from(zone: TrustZone) -> Self {
        Self::Concrete(Term::TrustZone(zone))
    }
}

impl From<DataType> for Bound<Term> {
    fn from(data_type: DataType) -> Self {
        Self::Concrete(Term::DataType(data_type))
    }
}

impl From<Actor> for Bound<Term> {
    fn from(actor: Actor) -> Self {
        Self::Concrete(Term::Actor(actor))
    }
}

/// Whether a trust zone is a plain perimeter or an addressable account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ZoneKind {
    /// A named security perimeter.
    #[default]
    Perimeter,
    /// A perimeter that is also individually addressable.
    Account,
}

/// A named security perimeter. Identity is the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustZone {
    /// Name of the zone.
    pub name: String,
    /// Perimeter or account.
    pub kind: ZoneKind,
    /// Free-text comment.
    pub comment: Option<String>,
}

impl TrustZone {
    /// A plain trust zone.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ZoneKind::Perimeter,
            comment: None,
        }
    }

    /// An account: a trust zone with the same identity contract.
    pub fn account(name: impl Into<String>) -> Self {
        Self {
            kind: ZoneKind::Account,
            ..Self::new(name)
        }
    }

    /// Whether this zone is an account.
    pub fn is_account(&self) -> bool {
        self.kind == ZoneKind::Account
    }
}

impl Element for TrustZone {
    fn name(&self) -> Name {
        Name::Atom(self.name.clone())
    }

    fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

/// Special roles a data type can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DataKind {
    /// Ordinary information.
    #[default]
    Plain,
    /// A secret used to authenticate, e.g. credentials.
    AuthenticationSecret,
    /// A proof of authentication derived from a secret.
    Authentication,
}

/// Free-form facts about a data type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Detail {
    /// The data is partitioned per tenant.
    TenantSpecific(bool),
    /// The data is derived from, or makes use of, the named data type.
    Uses(String),
    /// Anything else worth recording.
    Note(String),
}

/// A named kind of information. Identity is the name.
#[derive(Debug, Clone, PartialEq)]
pub struct DataType {
    /// Name of the data type.
    pub name: String,
    /// Role of the data.
    pub kind: DataKind,
    /// Opaque facts.
    pub details: Vec<Detail>,
    /// Attached aspects.
    pub aspects: Vec<Aspect>,
    /// Free-text comment.
    pub comment: Option<String>,
}

impl DataType {
    /// A plain data type with no details.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DataKind::Plain,
            details: Vec::new(),
            aspects: Vec::new(),
            comment: None,
        }
    }

    /// Set the role of this data type.
    pub fn with_kind(mut self, kind: DataKind) -> Self {
        self.kind = kind;
        self
    }

    /// Record a detail.
    pub fn with_detail(mut self, detail: Detail) -> Self {
        self.details.push(detail);
        self
    }

    /// Attach an aspect.
    pub fn with_aspect(mut self, aspect_type: AspectType, value: impl Into<Bound<Term>>) -> Self {
        self.aspects.push(Aspect::new(aspect_type, value));
        self
    }

    /// Set the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Whether a `TenantSpecific(true)` detail is recorded.
    pub fn is_tenant_specific(&self) -> bool {
        self.details.contains(&Detail::TenantSpecific(true))
    }
}

impl Element for DataType {
    fn name(&self) -> Name {
        Name::Atom(self.name.clone())
    }

    fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    fn aspects(&self) -> &[Aspect] {
        &self.aspects
    }
}

/// A participant that produces, holds or consumes data.
///
/// Actors are frozen: the builder methods consume `self`, and no mutable
/// access exists once the actor is handed to a graph. Identity is the name.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    name: String,
    trust_zones: Vec<Bound<TrustZone>>,
    aspects: Vec<Aspect>,
    comment: Option<String>,
}

impl Actor {
    /// An actor outside every trust zone.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trust_zones: Vec::new(),
            aspects: Vec::new(),
            comment: None,
        }
    }

    /// Place the actor in a trust zone, or in the zone a variable stands for.
    pub fn in_zone(mut self, zone: impl Into<Bound<TrustZone>>) -> Self {
        self.trust_zones.push(zone.into());
        self
    }

    /// Attach an aspect.
    pub fn with_aspect(mut self, aspect_type: AspectType, value: impl Into<Bound<Term>>) -> Self {
        self.aspects.push(Aspect::new(aspect_type, value));
        self
    }

    /// Set the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// The actor's name.
    pub fn name_str(&self) -> &str {
        &self.name
    }

    /// Trust zones the actor belongs to.
    pub fn trust_zones(&self) -> &[Bound<TrustZone>] {
        &self.trust_zones
    }

    /// Rebuild the actor with different zones and aspects, keeping its
    /// identity. Used by quantifier instantiation.
    pub(crate) fn rebind(&self, trust_zones: Vec<Bound<TrustZone>>, aspects: Vec<Aspect>) -> Self {
        Self {
            name: self.name.clone(),
            trust_zones,
            aspects,
            comment: self.comment.clone(),
        }
    }
}

impl Element for Actor {
    fn name(&self) -> Name {
        Name::Atom(self.name.clone())
    }

    fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    fn aspects(&self) -> &[Aspect] {
        &self.aspects
    }
}

/// Data at rest: one data type held by one owner.
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    /// What is stored.
    pub data_type: DataType,
    /// Who holds it.
    pub owner: Actor,
}

impl Store {
    /// Bind `data_type` to `owner`.
    pub fn new(data_type: DataType, owner: Actor) -> Self {
        Self { data_type, owner }
    }

    /// The structural identity `(type, owner)`.
    pub fn key(&self) -> StoreKey {
        StoreKey::new(&self.data_type.name, self.owner.name_str())
    }
}

impl Element for Store {
    fn name(&self) -> Name {
        self.key().into()
    }
}

/// Data in motion: one data type from a producer to a consumer.
///
/// Identity is fully structural, so two flows with the same
/// `(type, producer, consumer)` triple are the same flow.
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    /// What moves.
    pub data_type: DataType,
    /// Where it comes from.
    pub producer: Actor,
    /// Where it goes.
    pub consumer: Actor,
}

impl Flow {
    /// A flow of `data_type` from `producer` to `consumer`.
    pub fn new(data_type: DataType, producer: Actor, consumer: Actor) -> Self {
        Self {
            data_type,
            producer,
            consumer,
        }
    }

    /// The structural identity `(type, producer, consumer)`.
    pub fn key(&self) -> FlowKey {
        FlowKey::new(
            &self.data_type.name,
            self.producer.name_str(),
            self.consumer.name_str(),
        )
    }
}

impl Element for Flow {
    fn name(&self) -> Name {
        self.key().into()
    }
}

/// A named placeholder for any element of `element_type`.
///
/// Variables appear where a concrete trust zone, data type or actor would,
/// and express that the statement holds for every value of the variable.
/// Frozen once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateVariable {
    name: String,
    element_type: ElementKind,
    aspects: Vec<Aspect>,
}

impl PredicateVariable {
    /// A variable ranging over elements of `element_type`.
    pub fn new(name: impl Into<String>, element_type: ElementKind) -> Self {
        Self {
            name: name.into(),
            element_type,
            aspects: Vec::new(),
        }
    }

    /// Attach an aspect.
    pub fn with_aspect(mut self, aspect_type: AspectType, value: impl Into<Bound<Term>>) -> Self {
        self.aspects.push(Aspect::new(aspect_type, value));
        self
    }

    /// The variable's name.
    pub fn name_str(&self) -> &str {
        &self.name
    }

    /// The kind of element this variable ranges over.
    pub fn element_type(&self) -> ElementKind {
        self.element_type
    }
}

impl Element for PredicateVariable {
    fn name(&self) -> Name {
        Name::Atom(self.name.clone())
    }

    fn aspects(&self) -> &[Aspect] {
        &self.aspects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_identity_is_type_and_owner() {
        let store = Store::new(DataType::new("X"), Actor::new("A"));
        assert_eq!(store.key(), StoreKey::new("X", "A"));
        assert_eq!(store.name(), Name::Tuple(vec!["X".into(), "A".into()]));
    }

    #[test]
    fn same_type_different_owner_is_distinct_store() {
        let x = DataType::new("X");
        let a = Store::new(x.clone(), Actor::new("A"));
        let b = Store::new(x, Actor::new("B"));
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn flow_identity_ignores_aspects() {
        let tenant = AspectType::new("tenant");
        let plain = Flow::new(DataType::new("X"), Actor::new("A"), Actor::new("B"));
        let tagged = Flow::new(
            DataType::new("X").with_aspect(tenant, TrustZone::new("t1")),
            Actor::new("A"),
            Actor::new("B"),
        );
        assert_ne!(plain, tagged);
        assert_eq!(plain.key(), tagged.key());
    }

    #[test]
    fn account_is_a_trust_zone_for_variables() {
        assert!(ElementKind::TrustZone.admits(ElementKind::Account));
        assert!(!ElementKind::Account.admits(ElementKind::TrustZone));
        assert!(!ElementKind::Actor.admits(ElementKind::DataType));
        assert_eq!(
            Term::TrustZone(TrustZone::account("prod")).kind(),
            ElementKind::Account
        );
    }

    #[test]
    fn actor_zones_accept_variables() {
        let tenant = PredicateVariable::new("tenant", ElementKind::TrustZone);
        let actor = Actor::new("customer")
            .in_zone(TrustZone::new("edge"))
            .in_zone(tenant.clone());
        assert_eq!(actor.trust_zones().len(), 2);
        assert_eq!(actor.trust_zones()[1].variable(), Some(&tenant));
        assert_eq!(actor.trust_zones()[1].name(), Name::from("tenant"));
    }

    #[test]
    fn tenant_specific_detail_is_detected() {
        let creds = DataType::new("creds")
            .with_kind(DataKind::AuthenticationSecret)
            .with_detail(Detail::TenantSpecific(true));
        assert!(creds.is_tenant_specific());
        assert!(!DataType::new("logs").is_tenant_specific());
    }
}
