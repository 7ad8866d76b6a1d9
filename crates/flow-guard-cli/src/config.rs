//! Configuration handling

use anyhow::{Context, Result};
use clap::ValueEnum;
use flow_guard::{CoverageConfig, EmptyTypesPolicy, Reliability};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration file
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    /// Coverage engine settings
    #[serde(default)]
    pub coverage: CoverageSection,

    /// Report settings
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct CoverageSection {
    /// How requirements without types are handled: delegate, satisfied or reject
    #[serde(default)]
    pub empty_types: EmptyTypesPolicy,

    /// Ignore protections below this reliability, as "n/d"
    #[serde(default)]
    pub min_reliability: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct OutputSection {
    /// Report format
    #[serde(default)]
    pub format: OutputFormat,
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON document
    Json,
}

impl Config {
    /// Load config from a file path
    pub fn load(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path).to_string();
        let path = Path::new(&expanded);

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Coverage engine settings in library form
    pub fn coverage_config(&self) -> Result<CoverageConfig> {
        let mut config = CoverageConfig::default().with_empty_types(self.coverage.empty_types);
        if let Some(min) = &self.coverage.min_reliability {
            let min: Reliability = min
                .parse()
                .with_context(|| format!("invalid coverage.min_reliability {:?}", min))?;
            config = config.with_min_reliability(min);
        }
        Ok(config)
    }
}

/// Show current configuration
pub fn show(config_path: &str) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("Flowguard Configuration");
    println!("=======================");
    println!();
    println!("Config file: {}", config_path);
    println!();

    println!("[coverage]");
    println!("  empty_types = \"{}\"", config.coverage.empty_types.as_str());
    match &config.coverage.min_reliability {
        Some(min) => println!("  min_reliability = \"{}\"", min),
        None => println!("  min_reliability = (none)"),
    }
    println!();

    println!("[output]");
    println!(
        "  format = \"{}\"",
        match config.output.format {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    );

    Ok(())
}
