//! Model document loading

use anyhow::{Context, Result};
use flow_guard::{ModelSpec, QuantifiedGraph};
use std::path::Path;
use tracing::debug;

/// Read a model document, choosing the format by extension.
///
/// `.toml` files are parsed as TOML, anything else as YAML.
pub fn load(path: &Path) -> Result<(ModelSpec, QuantifiedGraph)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read model {}", path.display()))?;
    let spec = parse(path, &content)?;
    let graph = spec
        .build()
        .with_context(|| format!("invalid model {}", path.display()))?;
    debug!(
        model = %spec.name,
        actors = graph.actors.len(),
        flows = graph.flows.len(),
        requirements = graph.requirements.len(),
        protections = graph.protections.len(),
        "model loaded"
    );
    Ok((spec, graph))
}

fn parse(path: &Path, content: &str) -> Result<ModelSpec> {
    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
    let spec = if is_toml {
        ModelSpec::from_toml(content)
    } else {
        ModelSpec::from_yaml(content)
    };
    spec.with_context(|| format!("failed to parse model {}", path.display()))
}
