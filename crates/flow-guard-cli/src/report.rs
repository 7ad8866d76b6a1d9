//! Gap reports: unfilled requirements in text or JSON

use anyhow::Result;
use flow_guard::{Element, Requirement};
use serde::Serialize;
use std::fmt::{self, Write};

use crate::config::OutputFormat;

/// Unfilled requirements of one model or instance
#[derive(Debug, Serialize)]
pub struct GapReport {
    /// Model name
    pub model: String,
    /// Variable assignment, for instances of quantified models
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignment: Vec<(String, String)>,
    /// Number of requirements checked
    pub requirements: usize,
    /// What remains of each unfilled requirement
    pub gaps: Vec<Gap>,
}

/// The residual of one requirement
#[derive(Debug, Serialize, PartialEq)]
pub struct Gap {
    pub types: Vec<String>,
    pub beneficiaries: Vec<String>,
    pub trustees: Vec<String>,
    pub flows: Vec<String>,
    pub data_types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl From<&Requirement> for Gap {
    fn from(req: &Requirement) -> Self {
        Self {
            types: req.types.iter().map(|t| t.to_string()).collect(),
            beneficiaries: req.beneficiaries.iter().map(|a| a.name().to_string()).collect(),
            trustees: req.trustees.iter().map(|a| a.name().to_string()).collect(),
            flows: req.flows.iter().map(|f| f.key().to_string()).collect(),
            data_types: req.data_types.iter().map(|d| d.name.clone()).collect(),
            comment: req.comment.clone(),
        }
    }
}

impl GapReport {
    pub fn new(model: impl Into<String>, requirements: usize, unfilled: &[Requirement]) -> Self {
        Self {
            model: model.into(),
            assignment: Vec::new(),
            requirements,
            gaps: unfilled.iter().map(Gap::from).collect(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text()?),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    fn render_text(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        write!(out, "Model: {}", self.model)?;
        if !self.assignment.is_empty() {
            let bindings: Vec<String> = self
                .assignment
                .iter()
                .map(|(var, value)| format!("{} = {}", var, value))
                .collect();
            write!(out, " [{}]", bindings.join(", "))?;
        }
        out.push('\n');
        writeln!(
            out,
            "{} of {} requirement(s) unfilled",
            self.gaps.len(),
            self.requirements
        )?;

        for (i, gap) in self.gaps.iter().enumerate() {
            writeln!(out)?;
            writeln!(out, "Gap {}", i + 1)?;
            writeln!(out, "  Types: {}", gap.types.join(", "))?;
            if let Some(comment) = &gap.comment {
                writeln!(out, "  Comment: {}", comment)?;
            }
            writeln!(out, "  Beneficiaries: {}", gap.beneficiaries.join(", "))?;
            writeln!(out, "  Trustees: {}", gap.trustees.join(", "))?;
            if !gap.flows.is_empty() {
                writeln!(out, "  Flows:")?;
                for flow in &gap.flows {
                    writeln!(out, "    {}", flow)?;
                }
            }
            if !gap.data_types.is_empty() {
                writeln!(out, "  Data types: {}", gap.data_types.join(", "))?;
            }
        }
        Ok(out)
    }
}
