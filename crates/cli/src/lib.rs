//! CLI for srgraph.
//!
//! Runs the same load, validate and aggregate pipeline as the dashboard
//! against a local record directory and prints the result.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use clap::{Parser, Subcommand, ValueEnum};
use srgraph_core::{
    aggregate, report, validate, Aggregation, DirectoryStore, GraphRequest, MalformedPolicy,
    RecordSource,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// srgraph CLI.
#[derive(Parser, Debug)]
#[command(name = "srgraph")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the record files.
    #[arg(short, long, global = true, env = "SRGRAPH_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Leave out malformed record files instead of failing.
    #[arg(long, global = true)]
    pub skip_malformed: bool,

    /// Verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the versions, platforms, tests and network configs on record.
    Metadata,

    /// Aggregate records into date-aligned series for one test.
    ///
    /// Each filter takes a comma-separated list, e.g. `--versions 40.0a1,41.0a1`.
    Graph {
        /// Browser versions.
        #[arg(long, default_value = "")]
        versions: String,

        /// Platforms.
        #[arg(long, default_value = "")]
        platforms: String,

        /// Network configs.
        #[arg(long, default_value = "")]
        netconfigs: String,

        /// Test suite.
        #[arg(short, long)]
        test: Option<String>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

/// Output format for `graph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table.
    Table,
    /// JSON document.
    Json,
    /// Markdown table.
    Markdown,
}

/// Run the CLI with the process arguments.
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if loading or validation fails.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    print!("{}", execute(&cli)?);
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute a parsed command and return what it prints.
pub fn execute(cli: &Cli) -> Result<String, Box<dyn std::error::Error>> {
    let policy = if cli.skip_malformed {
        MalformedPolicy::Skip
    } else {
        MalformedPolicy::Fail
    };
    let store = DirectoryStore::new(&cli.data_dir).with_policy(policy);
    let set = store.load()?;
    tracing::debug!(
        data_dir = %cli.data_dir.display(),
        records = set.len(),
        "Records loaded"
    );

    match &cli.command {
        Commands::Metadata => {
            let metadata = &set.metadata;
            let line = |label: &str, values: &std::collections::BTreeSet<String>| {
                let values: Vec<&str> = values.iter().map(String::as_str).collect();
                format!("{:<12}{}\n", label, values.join(", "))
            };

            let mut output = format!("Records:    {}\n", set.len());
            output.push_str(&line("Versions:", &metadata.versions));
            output.push_str(&line("Platforms:", &metadata.platforms));
            output.push_str(&line("Tests:", &metadata.suites));
            output.push_str(&line("Netconfigs:", &metadata.netconfigs));
            Ok(output)
        }
        Commands::Graph {
            versions,
            platforms,
            netconfigs,
            test,
            format,
        } => {
            let request =
                GraphRequest::from_comma_separated(versions, platforms, netconfigs, test.as_deref());
            let validated = validate(&set.metadata, &request)?;
            let aggregation = aggregate(&set.records, &validated.selection);
            render(&validated.selection.suite, &aggregation, *format)
        }
    }
}

fn render(
    suite: &str,
    aggregation: &Aggregation,
    format: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        OutputFormat::Table => format!(
            "{}\n\n{}",
            report::chart_title(suite),
            report::generate_table(aggregation)
        ),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&serde_json::json!({
                "title": report::chart_title(suite),
                "x_labels": aggregation.dates.labels(),
                "dates": aggregation.dates,
                "series": aggregation.series,
            }))?;
            json.push('\n');
            json
        }
        OutputFormat::Markdown => report::generate_markdown(suite, aggregation),
    })
}
