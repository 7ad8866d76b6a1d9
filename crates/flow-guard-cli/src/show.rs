//! Show command - print the elements of a model

use anyhow::Result;
use clap::Args;
use flow_guard::{Element, Graph, QuantifiedGraph};
use std::fmt::{self, Write};
use std::path::PathBuf;

use crate::model;

/// Print the elements of a model
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Model document (YAML or TOML)
    pub model: PathBuf,
}

/// Execute the show command
pub fn execute(args: ShowArgs) -> Result<()> {
    let (spec, graph) = model::load(&args.model)?;
    print!("{}", describe(&spec.name, &graph)?);
    Ok(())
}

fn names<T: Element>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.name().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe(name: &str, quantified: &QuantifiedGraph) -> Result<String, fmt::Error> {
    let graph: &Graph = quantified;
    let mut out = String::new();
    writeln!(out, "Model: {}", name)?;
    if graph.flow_omission_equals_restriction {
        writeln!(out, "Unlisted flows are forbidden")?;
    }

    let bound = quantified.bound_variables();
    if !bound.is_empty() {
        let vars: Vec<String> = bound
            .iter()
            .map(|v| format!("{}: {}", v.name_str(), v.element_type()))
            .collect();
        writeln!(out, "For all {}", vars.join(", "))?;
    }
    for free in quantified.free_variables() {
        writeln!(out, "Free variable: {}", free.name_str())?;
    }

    writeln!(out, "\nActors ({})", graph.actors.len())?;
    for actor in graph.actors.values() {
        let zones = names(actor.trust_zones());
        if zones.is_empty() {
            writeln!(out, "  {}", actor.name_str())?;
        } else {
            writeln!(out, "  {} in {}", actor.name_str(), zones)?;
        }
    }

    writeln!(out, "\nFlows ({})", graph.flows.len())?;
    for key in graph.flows.keys() {
        writeln!(out, "  {}", key)?;
    }

    if !graph.stores.is_empty() {
        writeln!(out, "\nStores ({})", graph.stores.len())?;
        for store in graph.stores.values() {
            writeln!(out, "  {} held by {}", store.data_type.name, store.owner.name_str())?;
        }
    }

    writeln!(out, "\nRequirements ({})", graph.requirements.len())?;
    for (i, req) in graph.requirements.iter().enumerate() {
        let types: Vec<String> = req.types.iter().map(|t| t.to_string()).collect();
        writeln!(out, "  Req.{}: {}", i, types.join(", "))?;
        if !req.data_types.is_empty() {
            writeln!(out, "    data types: {}", names(&req.data_types))?;
        }
        if !req.trustees.is_empty() {
            writeln!(out, "    trustees: {}", names(&req.trustees))?;
        }
    }

    writeln!(out, "\nProtections ({})", graph.protections.len())?;
    for protection in &graph.protections {
        let properties: Vec<String> = protection
            .security_properties()
            .iter()
            .map(|p| p.to_string())
            .collect();
        write!(
            out,
            "  {} [{}] reliability {}",
            protection.label(),
            properties.join(", "),
            protection.reliability()
        )?;
        if let Some(group) = protection.as_with_members() {
            write!(out, ", members: {}", names(group.members()))?;
        }
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_guard::ModelSpec;

    #[test]
    fn test_describe_lists_elements() {
        let yaml = r#"
name: demo
variables:
  - name: tenant
    element_type: trust_zone
quantifiers:
  - for_all: [tenant]
data_types: [{ name: x }]
actors:
  - name: a
    trust_zones: [tenant]
  - name: b
flows:
  - data_type: x
    producer: a
    consumer: b
requirements:
  - types: [secrecy]
    data_types: [x]
protections:
  - kind: access_group
    label: vpc
    reliability: "9/10"
    provides: [secrecy]
    members: [a, b]
"#;
        let graph = ModelSpec::from_yaml(yaml).unwrap().build().unwrap();
        let text = describe("demo", &graph).unwrap();
        assert!(text.contains("For all tenant: trust zone"));
        assert!(text.contains("  a in tenant"));
        assert!(text.contains("  a --[x]-> b"));
        assert!(text.contains("Req.0: secrecy"));
        assert!(text.contains("vpc [secrecy] reliability 9/10, members: a, b"));
    }
}
