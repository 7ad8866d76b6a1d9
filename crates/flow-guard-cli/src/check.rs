//! Check command - report requirements no protection fills
//!
//! Requirements declared by data type are expanded against the model's
//! flows before coverage is computed.

use anyhow::{bail, Result};
use clap::Args;
use flow_guard::fill_requirements_with;
use std::path::PathBuf;
use tracing::info;

use crate::config::{Config, OutputFormat};
use crate::model;
use crate::report::GapReport;

/// Report requirements no protection fills
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Model document (YAML or TOML)
    pub model: PathBuf,

    /// Exit with an error when any requirement is unfilled
    #[arg(long)]
    pub deny_gaps: bool,

    /// Report format, overriding the config file
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Execute the check command
pub fn execute(args: CheckArgs, config_path: &str) -> Result<()> {
    let config = Config::load(config_path)?;
    let coverage = config.coverage_config()?;

    let (spec, mut graph) = model::load(&args.model)?;
    let added = graph.expand_requirements();
    info!(flows_added = added, "requirements expanded");

    let unfilled = fill_requirements_with(&graph, &coverage)?;
    let report = GapReport::new(&spec.name, graph.requirements.len(), &unfilled);
    println!("{}", report.render(args.format.unwrap_or(config.output.format))?);

    if args.deny_gaps && !report.is_clean() {
        bail!("{} requirement(s) unfilled", report.gaps.len());
    }
    Ok(())
}
