use clap::Parser;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::info;

use classknot::analysis::{
    edge_density, transitive_density, CancelToken, CycleFinder, ReferenceChecker,
};
use classknot::classpath::Classpath;
use classknot::config::Config;
use classknot::error::AnalysisError;
use classknot::graph::VisibleGraph;
use classknot::report::{AnalysisSummary, CycleReport, ReportFormat, Reporter};
use classknot::tree::ProjectScanner;

/// ClassKnot - dependency graph analysis for JVM classpaths
#[derive(Parser, Debug)]
#[command(name = "classknot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Classpath to analyze, or a .txt file containing it
    classpath: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project name used in the report
    #[arg(long)]
    name: Option<String>,

    /// Additional entry classes (can be specified multiple times)
    #[arg(short, long)]
    entry: Vec<String>,

    /// Archives known to be needed, by display name or regular expression
    #[arg(long)]
    known_needed: Vec<String>,

    /// Class name patterns to ignore (can be specified multiple times)
    #[arg(long)]
    ignore_class: Vec<String>,

    /// Container name patterns not to open
    #[arg(long)]
    ignore_source: Vec<String>,

    /// Node name patterns treated as part of the project
    #[arg(long)]
    focus: Vec<String>,

    /// Show dependencies at package granularity
    #[arg(long)]
    collapse_packages: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Terminal,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => ReportFormat::Terminal,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(report) => {
            eprintln!("{report:?}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    info!("classknot v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli)?;
    let filter = config.build_filter()?;

    let Some(argument) = cli.classpath.clone().or_else(|| config.classpath.clone()) else {
        eprintln!("{}", "No classpath given.".red());
        return Ok(2);
    };
    let (classpath, derived_name) = match Classpath::resolve(&argument) {
        Ok(resolved) => resolved,
        Err(error) => {
            eprintln!("{}", format!("Invalid classpath {argument}: {error}").red());
            return Ok(2);
        }
    };
    if classpath.is_empty() {
        eprintln!("{}", format!("Empty classpath: {argument}").red());
        return Ok(2);
    }

    let project = cli
        .name
        .clone()
        .or_else(|| config.project_name.clone())
        .or(derived_name)
        .unwrap_or_else(|| argument.clone());

    let scanner = ProjectScanner::new(&filter);
    let scanned = scanner.scan(&classpath).into_diagnostic()?;
    let mut tree = scanned.tree;
    if cli.collapse_packages || config.report.collapse_packages {
        tree.collapse_leafs();
    }

    let cancel = CancelToken::new();
    let graph = VisibleGraph::new(&tree);

    let finder = match CycleFinder::analyze(&graph, &cancel) {
        Ok(finder) => finder,
        Err(error @ AnalysisError::Cancelled) => return Ok(error.exit_code()),
        Err(error) => return Err(error).into_diagnostic(),
    };
    let cycles: Vec<CycleReport> = finder
        .cycle_components()
        .map(|component| CycleReport {
            size: component.len(),
            members: component
                .iter()
                .map(|&index| tree.display_name(graph.node_id(index)))
                .collect(),
        })
        .collect();

    let (density, transitive) = match edge_density(&graph) {
        Ok(density) => match transitive_density(&graph, &cancel) {
            Ok(transitive) => (Some(density), Some(transitive)),
            Err(error @ AnalysisError::Cancelled) => return Ok(error.exit_code()),
            Err(error) => return Err(error).into_diagnostic(),
        },
        Err(AnalysisError::EmptyGraphDensity { .. }) => (None, None),
        Err(error) => return Err(error).into_diagnostic(),
    };

    let unreferenced = if config.report.show_unreferenced {
        let mut checker = ReferenceChecker::new(&tree, &filter);
        let mut entries = config.entry_points.clone();
        entries.extend(cli.entry.iter().cloned());
        checker.add_known_needed_classes(&entries);
        let mut archives = config.known_needed_archives.clone();
        archives.extend(cli.known_needed.iter().cloned());
        checker
            .add_known_needed_archives(&archives)
            .into_diagnostic()?;
        Some(checker.report())
    } else {
        None
    };

    let summary = AnalysisSummary {
        project,
        container_count: tree.containers().len(),
        class_count: tree.class_count(),
        node_count: graph.node_count(),
        arc_count: graph.arc_count(),
        edge_density: density,
        transitive_density: transitive,
        cycles,
        unreferenced,
        skipped_containers: scanned
            .skipped
            .iter()
            .map(|skipped| format!("{}: {}", skipped.path.display(), skipped.reason))
            .collect(),
    };

    let format = cli
        .format
        .map(ReportFormat::from)
        .unwrap_or_else(|| match config.report.format.as_str() {
            "json" => ReportFormat::Json,
            _ => ReportFormat::Terminal,
        });
    let reporter = Reporter::new(format, cli.output.clone());
    reporter.report(&summary)?;

    Ok(if scanned.skipped.is_empty() { 0 } else { 3 })
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        let working_directory = std::env::current_dir().into_diagnostic()?;
        Config::from_default_locations(&working_directory)?
    };

    // Override with CLI arguments
    config.ignored_class_names.extend(cli.ignore_class.clone());
    config.ignored_sources.extend(cli.ignore_source.clone());
    config.focus.extend(cli.focus.clone());

    Ok(config)
}
