//! Universally quantified graphs.
//!
//! A [`QuantifiedGraph`] is a graph whose actors, data types, flows and
//! requirements may mention [`PredicateVariable`]s in place of concrete
//! trust zones, data types or actors. The graph as a whole is read as a
//! statement quantified over its bound variables:
//!
//! ```text
//! ∀ tenant. customer(tenant) --[red_data(tenant)]-> service_1
//! ```
//!
//! Ranges may be abstract or unbounded, so nothing is expanded implicitly.
//! [`QuantifiedGraph::instantiate`] is the single explicit operation that
//! takes a finite range per variable and produces one concrete graph per
//! point of the cartesian product.
//!
//! Inferring quantification from aspects (an element tagged with a
//! variable being itself quantified over it) is not performed; variables
//! must be bound by a [`Quantifier`].

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::element::{
    Actor, Aspect, Bound, DataType, ElementKind, Flow, PredicateVariable, Store, Term, TrustZone,
};
use crate::error::ModelError;
use crate::graph::Graph;
use crate::requirement::Requirement;

/// Concrete values chosen for variables, by variable name.
pub type Assignment = BTreeMap<String, Term>;

/// Binds predicate variables over a whole graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Quantifier {
    /// The graph holds for every value of each variable.
    ForAll(Vec<PredicateVariable>),
}

impl Quantifier {
    /// Universal quantification over `variables`.
    pub fn for_all(variables: impl IntoIterator<Item = PredicateVariable>) -> Self {
        Self::ForAll(variables.into_iter().collect())
    }

    /// The bound variables.
    pub fn variables(&self) -> &[PredicateVariable] {
        match self {
            Self::ForAll(variables) => variables,
        }
    }
}

/// Finite ranges to instantiate a quantified graph over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranges(BTreeMap<String, Vec<Term>>);

impl Ranges {
    /// No ranges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Let the variable named `variable` range over `values`.
    pub fn with(mut self, variable: impl Into<String>, values: impl IntoIterator<Item = Term>) -> Self {
        self.insert(variable, values);
        self
    }

    /// Let the variable named `variable` range over `values`.
    pub fn insert(&mut self, variable: impl Into<String>, values: impl IntoIterator<Item = Term>) {
        self.0.insert(variable.into(), values.into_iter().collect());
    }

    /// The range of `variable`.
    pub fn get(&self, variable: &str) -> Option<&[Term]> {
        self.0.get(variable).map(Vec::as_slice)
    }
}

/// One concrete graph of a quantified family.
#[derive(Debug, Clone)]
pub struct Instance {
    /// The values chosen for the bound variables.
    pub assignment: Assignment,
    /// The graph with those values substituted.
    pub graph: Graph,
}

/// A graph plus the quantifiers binding its variables.
///
/// Dereferences to the underlying [`Graph`], so it is built and read with
/// the same operations.
#[derive(Debug, Clone, Default)]
pub struct QuantifiedGraph {
    /// The unexpanded graph.
    pub graph: Graph,
    /// Quantifiers over the whole graph.
    pub quantifiers: Vec<Quantifier>,
}

impl Deref for QuantifiedGraph {
    type Target = Graph;

    fn deref(&self) -> &Graph {
        &self.graph
    }
}

impl DerefMut for QuantifiedGraph {
    fn deref_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }
}

impl QuantifiedGraph {
    /// An empty graph quantified by `quantifiers`.
    pub fn new(quantifiers: impl IntoIterator<Item = Quantifier>) -> Self {
        Self {
            graph: Graph::new(),
            quantifiers: quantifiers.into_iter().collect(),
        }
    }

    /// Quantify an existing graph.
    pub fn from_graph(graph: Graph, quantifiers: impl IntoIterator<Item = Quantifier>) -> Self {
        Self {
            graph,
            quantifiers: quantifiers.into_iter().collect(),
        }
    }

    /// Bound variables in quantifier order, first binding wins.
    pub fn bound_variables(&self) -> Vec<&PredicateVariable> {
        let mut seen = Vec::<&PredicateVariable>::new();
        for var in self.quantifiers.iter().flat_map(Quantifier::variables) {
            if !seen.iter().any(|v| v.name_str() == var.name_str()) {
                seen.push(var);
            }
        }
        seen
    }

    /// Every variable mentioned by the graph's elements and requirements.
    pub fn referenced_variables(&self) -> BTreeMap<String, PredicateVariable> {
        let mut found = BTreeMap::new();
        for actor in self.graph.actors.values() {
            actor.collect_variables(&mut found);
        }
        for store in self.graph.stores.values() {
            store.collect_variables(&mut found);
        }
        for flow in self.graph.flows.values() {
            flow.collect_variables(&mut found);
        }
        for requirement in &self.graph.requirements {
            requirement.collect_variables(&mut found);
        }
        found
    }

    /// Variables mentioned but not bound by any quantifier.
    pub fn free_variables(&self) -> Vec<PredicateVariable> {
        let bound = self.bound_variables();
        self.referenced_variables()
            .into_values()
            .filter(|var| !bound.iter().any(|b| b.name_str() == var.name_str()))
            .collect()
    }

    /// Expand into one concrete graph per combination of range values.
    ///
    /// Every bound variable needs a range whose values match its element
    /// type. An empty range yields no instance; a graph without bound
    /// variables yields itself. Free variables stay abstract.
    pub fn instantiate(&self, ranges: &Ranges) -> Result<Vec<Instance>, ModelError> {
        let bound = self.bound_variables();
        for var in &bound {
            let range = ranges.get(var.name_str()).ok_or_else(|| ModelError::MissingRange {
                variable: var.name_str().to_string(),
            })?;
            check_range(var, range)?;
        }
        for var in self.free_variables() {
            warn!(variable = var.name_str(), "free variable left abstract");
        }

        let mut assignments = vec![Assignment::new()];
        for var in &bound {
            let range = ranges.get(var.name_str()).unwrap_or(&[]);
            assignments = assignments
                .into_iter()
                .flat_map(|assignment| {
                    range.iter().map(move |value| {
                        let mut next = assignment.clone();
                        next.insert(var.name_str().to_string(), value.clone());
                        next
                    })
                })
                .collect();
        }
        debug!(instances = assignments.len(), "instantiating quantified graph");

        assignments
            .into_iter()
            .map(|assignment| {
                let graph = substitute_graph(&self.graph, &assignment)?;
                Ok(Instance { assignment, graph })
            })
            .collect()
    }
}

fn check_range(var: &PredicateVariable, range: &[Term]) -> Result<(), ModelError> {
    for value in range {
        if !var.element_type().admits(value.kind()) {
            return Err(ModelError::KindMismatch {
                variable: var.name_str().to_string(),
                expected: var.element_type(),
                found: value.kind(),
            });
        }
    }
    Ok(())
}

fn substitute_graph(graph: &Graph, assignment: &Assignment) -> Result<Graph, ModelError> {
    let mut concrete = Graph {
        flow_omission_equals_restriction: graph.flow_omission_equals_restriction,
        protections: graph.protections.clone(),
        ..Graph::default()
    };
    for (name, actor) in &graph.actors {
        concrete.actors.insert(name.clone(), actor.substitute(assignment)?);
    }
    for (key, store) in &graph.stores {
        concrete.stores.insert(key.clone(), store.substitute(assignment)?);
    }
    for (key, flow) in &graph.flows {
        concrete.flows.insert(key.clone(), flow.substitute(assignment)?);
    }
    concrete.requirements = substitute_all(&graph.requirements, assignment)?;
    Ok(concrete)
}

/// Elements that may mention predicate variables.
trait Quantified: Sized {
    /// Replace assigned variables by their values.
    fn substitute(&self, assignment: &Assignment) -> Result<Self, ModelError>;

    /// Record every variable mentioned, by name.
    fn collect_variables(&self, out: &mut BTreeMap<String, PredicateVariable>);
}

fn substitute_all<T: Quantified>(items: &[T], assignment: &Assignment) -> Result<Vec<T>, ModelError> {
    items.iter().map(|item| item.substitute(assignment)).collect()
}

fn collect_all<T: Quantified>(items: &[T], out: &mut BTreeMap<String, PredicateVariable>) {
    for item in items {
        item.collect_variables(out);
    }
}

fn record(var: &PredicateVariable, out: &mut BTreeMap<String, PredicateVariable>) {
    out.entry(var.name_str().to_string())
        .or_insert_with(|| var.clone());
}

impl Quantified for Term {
    fn substitute(&self, assignment: &Assignment) -> Result<Self, ModelError> {
        Ok(match self {
            Self::TrustZone(zone) => Self::TrustZone(zone.clone()),
            Self::DataType(data_type) => Self::DataType(data_type.substitute(assignment)?),
            Self::Actor(actor) => Self::Actor(actor.substitute(assignment)?),
        })
    }

    fn collect_variables(&self, out: &mut BTreeMap<String, PredicateVariable>) {
        match self {
            Self::TrustZone(_) => {}
            Self::DataType(data_type) => data_type.collect_variables(out),
            Self::Actor(actor) => actor.collect_variables(out),
        }
    }
}

impl Quantified for Bound<Term> {
    fn substitute(&self, assignment: &Assignment) -> Result<Self, ModelError> {
        match self {
            Self::Concrete(term) => Ok(Self::Concrete(term.substitute(assignment)?)),
            Self::Variable(var) => Ok(match assignment.get(var.name_str()) {
                Some(value) => Self::Concrete(value.clone()),
                None => Self::Variable(var.clone()),
            }),
        }
    }

    fn collect_variables(&self, out: &mut BTreeMap<String, PredicateVariable>) {
        match self {
            Self::Concrete(term) => term.collect_variables(out),
            Self::Variable(var) => record(var, out),
        }
    }
}

impl Quantified for Bound<TrustZone> {
    fn substitute(&self, assignment: &Assignment) -> Result<Self, ModelError> {
        let Self::Variable(var) = self else {
            return Ok(self.clone());
        };
        match assignment.get(var.name_str()) {
            None => Ok(self.clone()),
            Some(Term::TrustZone(zone)) => Ok(Self::Concrete(zone.clone())),
            Some(other) => Err(ModelError::KindMismatch {
                variable: var.name_str().to_string(),
                expected: ElementKind::TrustZone,
                found: other.kind(),
            }),
        }
    }

    fn collect_variables(&self, out: &mut BTreeMap<String, PredicateVariable>) {
        if let Self::Variable(var) = self {
            record(var, out);
        }
    }
}

impl Quantified for Aspect {
    fn substitute(&self, assignment: &Assignment) -> Result<Self, ModelError> {
        Ok(Self {
            aspect_type: self.aspect_type.clone(),
            value: self.value.substitute(assignment)?,
        })
    }

    fn collect_variables(&self, out: &mut BTreeMap<String, PredicateVariable>) {
        self.value.collect_variables(out);
    }
}

impl Quantified for DataType {
    fn substitute(&self, assignment: &Assignment) -> Result<Self, ModelError> {
        Ok(Self {
            aspects: substitute_all(&self.aspects, assignment)?,
            ..self.clone()
        })
    }

    fn collect_variables(&self, out: &mut BTreeMap<String, PredicateVariable>) {
        collect_all(&self.aspects, out);
    }
}

impl Quantified for Actor {
    fn substitute(&self, assignment: &Assignment) -> Result<Self, ModelError> {
        Ok(self.rebind(
            substitute_all(self.trust_zones(), assignment)?,
            substitute_all(crate::name::Element::aspects(self), assignment)?,
        ))
    }

    fn collect_variables(&self, out: &mut BTreeMap<String, PredicateVariable>) {
        collect_all(self.trust_zones(), out);
        collect_all(crate::name::Element::aspects(self), out);
    }
}

impl Quantified for Store {
    fn substitute(&self, assignment: &Assignment) -> Result<Self, ModelError> {
        Ok(Self::new(
            self.data_type.substitute(assignment)?,
            self.owner.substitute(assignment)?,
        ))
    }

    fn collect_variables(&self, out: &mut BTreeMap<String, PredicateVariable>) {
        self.data_type.collect_variables(out);
        self.owner.collect_variables(out);
    }
}

impl Quantified for Flow {
    fn substitute(&self, assignment: &Assignment) -> Result<Self, ModelError> {
        Ok(Self::new(
            self.data_type.substitute(assignment)?,
            self.producer.substitute(assignment)?,
            self.consumer.substitute(assignment)?,
        ))
    }

    fn collect_variables(&self, out: &mut BTreeMap<String, PredicateVariable>) {
        self.data_type.collect_variables(out);
        self.producer.collect_variables(out);
        self.consumer.collect_variables(out);
    }
}

impl Quantified for Requirement {
    fn substitute(&self, assignment: &Assignment) -> Result<Self, ModelError> {
        Ok(Self {
            types: self.types.clone(),
            beneficiaries: substitute_all(&self.beneficiaries, assignment)?,
            trustees: substitute_all(&self.trustees, assignment)?,
            flows: substitute_all(&self.flows, assignment)?,
            data_types: substitute_all(&self.data_types, assignment)?,
            comment: self.comment.clone(),
        })
    }

    fn collect_variables(&self, out: &mut BTreeMap<String, PredicateVariable>) {
        collect_all(&self.beneficiaries, out);
        collect_all(&self.trustees, out);
        collect_all(&self.flows, out);
        collect_all(&self.data_types, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::AspectType;
    use crate::name::{Element, FlowKey};
    use crate::security::secrecy;

    fn tenant() -> PredicateVariable {
        PredicateVariable::new("tenant", ElementKind::TrustZone)
    }

    fn tenant_graph() -> QuantifiedGraph {
        let aspect = AspectType::new("tenant");
        let customer = Actor::new("customer").with_aspect(aspect.clone(), tenant());
        let service = Actor::new("service").in_zone(tenant());
        let red = DataType::new("red").with_aspect(aspect, tenant());

        let mut graph = QuantifiedGraph::new([Quantifier::for_all([tenant()])]);
        graph
            .update(vec![Flow::new(red.clone(), customer.clone(), service.clone())])
            .unwrap();
        graph.update_actors([customer.clone(), service]);
        graph.update_requirements([Requirement::new([secrecy()])
            .beneficiaries([customer.clone()])
            .trustees([customer])
            .data_types([red])]);
        graph
    }

    fn zones(names: &[&str]) -> Vec<Term> {
        names.iter().map(|n| Term::TrustZone(TrustZone::new(*n))).collect()
    }

    #[test]
    fn referenced_variables_are_found_everywhere() {
        let graph = tenant_graph();
        let referenced = graph.referenced_variables();
        assert_eq!(referenced.keys().collect::<Vec<_>>(), vec!["tenant"]);
        assert!(graph.free_variables().is_empty());
    }

    #[test]
    fn unbound_variables_are_free() {
        let mut graph = tenant_graph();
        graph.quantifiers.clear();
        let free = graph.free_variables();
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].name_str(), "tenant");
    }

    #[test]
    fn instantiate_produces_one_graph_per_value() {
        let graph = tenant_graph();
        let instances = graph
            .instantiate(&Ranges::new().with("tenant", zones(&["t1", "t2"])))
            .unwrap();
        assert_eq!(instances.len(), 2);

        let first = &instances[0];
        assert_eq!(first.assignment["tenant"], Term::TrustZone(TrustZone::new("t1")));
        let service = first.graph.actor("service").unwrap();
        assert_eq!(service.trust_zones()[0], Bound::Concrete(TrustZone::new("t1")));

        let flow = &first.graph.flows[&FlowKey::new("red", "customer", "service")];
        assert_eq!(
            flow.data_type.aspects()[0].value,
            Bound::Concrete(Term::TrustZone(TrustZone::new("t1")))
        );
        let customer = &first.graph.requirements[0].beneficiaries[0];
        assert!(customer.aspects()[0].value.variable().is_none());

        let second = &instances[1];
        assert_eq!(
            second.graph.actor("service").unwrap().trust_zones()[0],
            Bound::Concrete(TrustZone::new("t2"))
        );
    }

    #[test]
    fn instantiate_leaves_the_quantified_graph_untouched() {
        let graph = tenant_graph();
        graph
            .instantiate(&Ranges::new().with("tenant", zones(&["t1"])))
            .unwrap();
        assert!(graph.actor("service").unwrap().trust_zones()[0].variable().is_some());
    }

    #[test]
    fn empty_range_yields_no_instances() {
        let graph = tenant_graph();
        let instances = graph.instantiate(&Ranges::new().with("tenant", [])).unwrap();
        assert!(instances.is_empty());
    }

    #[test]
    fn unquantified_graph_instantiates_to_itself() {
        let mut graph = tenant_graph();
        graph.quantifiers.clear();
        let instances = graph.instantiate(&Ranges::new()).unwrap();
        assert_eq!(instances.len(), 1);
        assert!(instances[0].assignment.is_empty());
        assert_eq!(instances[0].graph.flows.len(), 1);
    }

    #[test]
    fn missing_range_is_an_error() {
        let err = tenant_graph().instantiate(&Ranges::new()).unwrap_err();
        assert_eq!(err, ModelError::MissingRange { variable: "tenant".into() });
    }

    #[test]
    fn range_values_must_match_variable_kind() {
        let ranges = Ranges::new().with("tenant", [Term::Actor(Actor::new("mallory"))]);
        let err = tenant_graph().instantiate(&ranges).unwrap_err();
        assert_eq!(
            err,
            ModelError::KindMismatch {
                variable: "tenant".into(),
                expected: ElementKind::TrustZone,
                found: ElementKind::Actor,
            }
        );
    }

    #[test]
    fn accounts_fill_trust_zone_variables() {
        let ranges = Ranges::new().with("tenant", [Term::TrustZone(TrustZone::account("acme"))]);
        let instances = tenant_graph().instantiate(&ranges).unwrap();
        assert_eq!(instances.len(), 1);
        assert!(instances[0].graph.actor("service").unwrap().trust_zones()[0]
            .concrete()
            .is_some_and(TrustZone::is_account));
    }

    #[test]
    fn cartesian_product_over_two_variables() {
        let region = PredicateVariable::new("region", ElementKind::TrustZone);
        let mut graph = tenant_graph();
        graph.quantifiers.push(Quantifier::for_all([region.clone()]));
        graph.update_actors([Actor::new("replica").in_zone(region)]);

        let ranges = Ranges::new()
            .with("tenant", zones(&["t1", "t2", "t3"]))
            .with("region", zones(&["eu", "us"]));
        assert_eq!(graph.instantiate(&ranges).unwrap().len(), 6);
    }

    #[test]
    fn duplicate_bindings_count_once() {
        let mut graph = tenant_graph();
        graph.quantifiers.push(Quantifier::for_all([tenant()]));
        assert_eq!(graph.bound_variables().len(), 1);
        let instances = graph
            .instantiate(&Ranges::new().with("tenant", zones(&["t1", "t2"])))
            .unwrap();
        assert_eq!(instances.len(), 2);
    }
}
