//! Integration tests that load and check the example model documents.

use flow_guard::security::{availability, integrity};
use flow_guard::{
    fill_requirements, FlowKey, FlowStatus, ModelSpec, QuantifiedGraph, Ranges, Term, TrustZone,
};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

fn models_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("models")
}

fn load_model(name: &str) -> ModelSpec {
    let path = models_dir().join(name);
    let text = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    let spec = if name.ends_with(".toml") {
        ModelSpec::from_toml(&text)
    } else {
        ModelSpec::from_yaml(&text)
    };
    spec.unwrap_or_else(|e| panic!("Failed to parse {}: {:?}", name, e))
}

fn build(name: &str) -> QuantifiedGraph {
    load_model(name)
        .build()
        .unwrap_or_else(|e| panic!("Failed to build {}: {}", name, e))
}

#[test]
fn tenant_model_loads() {
    let spec = load_model("tenant.yaml");
    assert_eq!(spec.name, "tenant-example");
    assert_eq!(spec.requirements.len(), 2);
    assert_eq!(spec.protections.len(), 2);

    let graph = build("tenant.yaml");
    assert_eq!(graph.actors.len(), 3);
    assert_eq!(graph.flows.len(), 3);
    assert_eq!(graph.bound_variables().len(), 1);
    assert!(graph.free_variables().is_empty());
}

#[test]
fn tenant_model_has_one_availability_gap() {
    let mut graph = build("tenant.yaml");
    graph.expand_requirements();

    let unfilled = fill_requirements(&graph);
    assert_eq!(unfilled.len(), 1);
    assert_eq!(unfilled[0].types, BTreeSet::from([availability()]));
    assert_eq!(
        unfilled[0].flow_keys(),
        BTreeSet::from([FlowKey::new("red_data", "customer", "service_1")])
    );
}

#[test]
fn tenant_model_instances_share_the_gap() {
    let graph = build("tenant.yaml");
    let ranges = Ranges::new().with(
        "tenant",
        ["acme", "globex"].map(|t| Term::TrustZone(TrustZone::new(t))),
    );
    let instances = graph.instantiate(&ranges).unwrap();
    assert_eq!(instances.len(), 2);
    for mut instance in instances {
        instance.graph.expand_requirements();
        assert_eq!(fill_requirements(&instance.graph).len(), 1);
    }
}

#[test]
fn webshop_model_loads() {
    let graph = build("webshop.toml");
    assert!(graph.flow_omission_equals_restriction);
    assert_eq!(graph.actors.len(), 4);
    assert_eq!(graph.flows.len(), 4);
    assert_eq!(graph.stores.len(), 1);
    assert_eq!(
        graph.flow_status(&FlowKey::new("card", "payments", "browser")),
        FlowStatus::Forbidden
    );
}

#[test]
fn webshop_order_path_from_browser_is_unprotected() {
    let mut graph = build("webshop.toml");
    graph.expand_requirements();

    let unfilled = fill_requirements(&graph);
    assert_eq!(unfilled.len(), 1);
    assert_eq!(unfilled[0].types, BTreeSet::from([integrity(), availability()]));
    assert_eq!(
        unfilled[0].flow_keys(),
        BTreeSet::from([FlowKey::new("order", "browser", "storefront")])
    );
}

#[test]
fn all_models_roundtrip_through_yaml() {
    for name in ["tenant.yaml", "webshop.toml"] {
        let spec = load_model(name);
        let yaml = spec.to_yaml().unwrap();
        assert_eq!(ModelSpec::from_yaml(&yaml).unwrap(), spec, "{}", name);
    }
}
