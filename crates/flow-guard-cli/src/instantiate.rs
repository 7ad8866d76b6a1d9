//! Instantiate command - expand a quantified model over concrete values
//!
//! Each `--range var=v1,v2` gives the values of one bound variable. Values
//! name trust zones, accounts, data types or actors according to the
//! variable's element type. Every resulting instance is checked like a
//! plain model.

use anyhow::{bail, Context, Result};
use clap::Args;
use flow_guard::{
    fill_requirements_with, Actor, DataType, ElementKind, QuantifiedGraph, Ranges, Term, TrustZone,
};
use std::path::PathBuf;
use tracing::info;

use crate::config::{Config, OutputFormat};
use crate::model;
use crate::report::GapReport;

/// Expand a quantified model over concrete values
#[derive(Args, Debug)]
pub struct InstantiateArgs {
    /// Model document (YAML or TOML)
    pub model: PathBuf,

    /// Values of a bound variable, as `name=value1,value2`
    #[arg(long = "range", value_name = "VAR=VALUES")]
    pub ranges: Vec<String>,

    /// Exit with an error when any instance has unfilled requirements
    #[arg(long)]
    pub deny_gaps: bool,

    /// Report format, overriding the config file
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Execute the instantiate command
pub fn execute(args: InstantiateArgs, config_path: &str) -> Result<()> {
    let config = Config::load(config_path)?;
    let coverage = config.coverage_config()?;
    let format = args.format.unwrap_or(config.output.format);

    let (spec, graph) = model::load(&args.model)?;
    let ranges = parse_ranges(&graph, &args.ranges)?;
    let instances = graph.instantiate(&ranges)?;
    info!(instances = instances.len(), "model instantiated");

    let mut reports = Vec::with_capacity(instances.len());
    for mut instance in instances {
        instance.graph.expand_requirements();
        let unfilled = fill_requirements_with(&instance.graph, &coverage)?;
        let mut report = GapReport::new(&spec.name, instance.graph.requirements.len(), &unfilled);
        report.assignment = instance
            .assignment
            .iter()
            .map(|(var, value)| (var.clone(), flow_guard::Element::name(value).to_string()))
            .collect();
        reports.push(report);
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text => {
            if reports.is_empty() {
                println!("No instances: a range is empty");
            }
            for report in &reports {
                println!("{}", report.render(OutputFormat::Text)?);
            }
        }
    }

    let gaps: usize = reports.iter().map(|r| r.gaps.len()).sum();
    if args.deny_gaps && gaps > 0 {
        bail!("{} requirement(s) unfilled across instances", gaps);
    }
    Ok(())
}

/// Turn `var=v1,v2` arguments into typed ranges for the graph's variables.
fn parse_ranges(graph: &QuantifiedGraph, args: &[String]) -> Result<Ranges> {
    let mut ranges = Ranges::new();
    for arg in args {
        let (var, values) = arg
            .split_once('=')
            .with_context(|| format!("range {:?} is not of the form var=values", arg))?;
        let var = var.trim();
        let Some(kind) = graph
            .bound_variables()
            .iter()
            .find(|v| v.name_str() == var)
            .map(|v| v.element_type())
        else {
            bail!("`{}` is not a bound variable of the model", var);
        };
        let terms: Vec<Term> = values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|value| term(graph, kind, value))
            .collect();
        ranges.insert(var, terms);
    }
    Ok(ranges)
}

fn term(graph: &QuantifiedGraph, kind: ElementKind, value: &str) -> Term {
    match kind {
        ElementKind::TrustZone => Term::TrustZone(TrustZone::new(value)),
        ElementKind::Account => Term::TrustZone(TrustZone::account(value)),
        ElementKind::DataType => Term::DataType(
            graph
                .flows
                .values()
                .map(|f| &f.data_type)
                .find(|d| d.name == value)
                .cloned()
                .unwrap_or_else(|| DataType::new(value)),
        ),
        ElementKind::Actor => Term::Actor(
            graph
                .actor(value)
                .cloned()
                .unwrap_or_else(|| Actor::new(value)),
        ),
    }
}
