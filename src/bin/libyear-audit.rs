//! CLI tool for measuring dependency staleness in libyears

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use libyear_audit::{
    check_dependencies, load_graph, report_dependencies, format::parse_duration, LibyearConfig,
    ValidatorKind,
};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "libyear-audit")]
#[command(about = "Measure how stale a project's resolved dependencies are, in libyears", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the resolved dependency graph exported by the build tool
    #[arg(short = 'g', long, default_value = "dependency-graph.json")]
    graph: PathBuf,

    /// Path to configuration file (TOML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Modules to skip (wildcard patterns, can be repeated)
    #[arg(long = "exclude")]
    exclude_modules: Vec<String>,

    /// Modules to audit (wildcard patterns, can be repeated; default: all)
    #[arg(long = "include")]
    include_modules: Vec<String>,

    /// Do not recurse past direct dependencies
    #[arg(long)]
    ignore_transitive: bool,

    /// Maximum transitive depth to recurse into
    #[arg(long)]
    max_depth: Option<usize>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check dependency ages against the configured threshold (exit code based)
    Check {
        /// Age threshold, e.g. "10 years" or "18 months"
        #[arg(long)]
        max_age: Option<String>,

        /// Validation policy: "cumulative" or "single-age"
        #[arg(long)]
        validator: Option<ValidatorKind>,

        /// Tolerate lookup errors instead of aborting
        #[arg(long)]
        keep_going: bool,
    },

    /// Collect update lag for every dependency and render a report
    Report {
        /// Write the structured JSON report to this file
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => match LibyearConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{} Failed to load config: {}", "Error:".red().bold(), e);
                process::exit(1);
            }
        },
        None => LibyearConfig::default(),
    };

    apply_overrides(&mut config, &cli);

    let graph = match load_graph(&cli.graph) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("{} Failed to load graph: {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message("Querying dependency ages...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    match cli.command {
        Commands::Check { .. } => {
            let result = check_dependencies(&graph, &config);
            spinner.finish_and_clear();

            let outcome = match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                    process::exit(1);
                }
            };

            match outcome.failure_summary() {
                None => {
                    println!(
                        "{} All dependency ages within the threshold.",
                        "Success:".green().bold()
                    );
                }
                Some(summary) => {
                    eprintln!("{summary}");
                    eprintln!("{} Dependency set is too stale.", "Failed:".red().bold());
                    process::exit(1);
                }
            }
        }

        Commands::Report { output } => {
            let result = report_dependencies(&graph, &config);
            spinner.finish_and_clear();

            let outcome = match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                    process::exit(1);
                }
            };

            print!("{}", outcome.summary);

            if let Some(output_path) = output {
                match outcome.report.save(&output_path) {
                    Ok(()) => println!("Report written to: {}", output_path.display()),
                    Err(e) => {
                        eprintln!("{} Failed to write report: {}", "Error:".red().bold(), e);
                        process::exit(1);
                    }
                }
            }
        }
    }
}

fn apply_overrides(config: &mut LibyearConfig, cli: &Cli) {
    config
        .include_modules
        .extend(cli.include_modules.iter().cloned());
    config
        .exclude_modules
        .extend(cli.exclude_modules.iter().cloned());
    if cli.ignore_transitive {
        config.ignore_transitive = true;
    }
    if let Some(max_depth) = cli.max_depth {
        config.max_transitive_depth = Some(max_depth);
    }

    if let Commands::Check {
        max_age,
        validator,
        keep_going,
    } = &cli.command
    {
        if let Some(max_age) = max_age {
            match parse_duration(max_age) {
                Ok(duration) => config.validator.max_age = duration,
                Err(e) => {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                    process::exit(1);
                }
            }
        }
        if let Some(kind) = validator {
            config.validator.kind = *kind;
        }
        if *keep_going {
            config.fail_on_error = false;
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
