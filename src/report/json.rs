use super::AnalysisSummary;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::Path;

pub fn render(summary: &AnalysisSummary, output: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(summary)
        .into_diagnostic()
        .wrap_err("Failed to serialize report")?;
    match output {
        Some(path) => std::fs::write(path, rendered)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to write report to {}", path.display()))?,
        None => println!("{rendered}"),
    }
    Ok(())
}
