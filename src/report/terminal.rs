use super::AnalysisSummary;
use colored::Colorize;
use miette::Result;

pub fn render(summary: &AnalysisSummary) -> Result<()> {
    println!();
    println!("{}", format!("Dependency report: {}", summary.project).bold());
    println!(
        "  {} containers, {} classes, {} visible nodes, {} arcs",
        summary.container_count, summary.class_count, summary.node_count, summary.arc_count
    );
    match (summary.edge_density, summary.transitive_density) {
        (Some(density), Some(transitive)) => println!(
            "  edge density {:.3}, transitive {:.3}",
            density, transitive
        ),
        _ => println!("  {}", "graph too small for density measures".dimmed()),
    }

    println!();
    if summary.cycles.is_empty() {
        println!("{}", "No cyclic dependencies.".green());
    } else {
        println!(
            "{}",
            format!("{} cyclic dependency group(s):", summary.cycles.len()).yellow()
        );
        for cycle in &summary.cycles {
            println!("  {} nodes:", cycle.size);
            for member in &cycle.members {
                println!("    {member}");
            }
        }
    }

    if let Some(unreferenced) = &summary.unreferenced {
        println!();
        if unreferenced.is_empty() {
            println!("{}", "No unreferenced elements.".green());
        } else {
            if !unreferenced.classes.is_empty() {
                println!(
                    "{}",
                    format!("{} unreferenced class(es):", unreferenced.classes.len()).yellow()
                );
                for class in &unreferenced.classes {
                    println!("  {class}");
                }
            }
            if !unreferenced.archives.is_empty() {
                println!(
                    "{}",
                    format!("{} unreferenced archive(s):", unreferenced.archives.len()).yellow()
                );
                for archive in &unreferenced.archives {
                    println!("  {archive}");
                }
            }
        }
    }

    if !summary.skipped_containers.is_empty() {
        println!();
        println!(
            "{}",
            format!(
                "{} container(s) could not be read:",
                summary.skipped_containers.len()
            )
            .red()
        );
        for skipped in &summary.skipped_containers {
            println!("  {skipped}");
        }
    }

    Ok(())
}
