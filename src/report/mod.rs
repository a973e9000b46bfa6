mod json;
mod terminal;

use crate::analysis::UnreferencedReport;
use miette::Result;
use serde::Serialize;
use std::path::PathBuf;

/// Everything one analysis run has to say, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub project: String,
    pub container_count: usize,
    pub class_count: usize,
    /// Visible nodes and arcs under the collapse state used for the run.
    pub node_count: usize,
    pub arc_count: usize,
    /// None when the graph is too small for the measure.
    pub edge_density: Option<f64>,
    pub transitive_density: Option<f64>,
    pub cycles: Vec<CycleReport>,
    pub unreferenced: Option<UnreferencedReport>,
    pub skipped_containers: Vec<String>,
}

/// One component of strong connectivity with more than one member.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub size: usize,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Terminal,
    Json,
}

/// Renders an analysis summary to the terminal or a file.
pub struct Reporter {
    format: ReportFormat,
    output: Option<PathBuf>,
}

impl Reporter {
    pub fn new(format: ReportFormat, output: Option<PathBuf>) -> Self {
        Self { format, output }
    }

    pub fn report(&self, summary: &AnalysisSummary) -> Result<()> {
        match self.format {
            ReportFormat::Terminal => terminal::render(summary),
            ReportFormat::Json => json::render(summary, self.output.as_deref()),
        }
    }
}
