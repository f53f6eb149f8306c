//! toil CLI
//!
//! Command-line interface for populating the toil vocabulary graph from
//! tabular exports:
//! - `populate occupations|skills|relations`: merge one CSV into the graph
//! - `stats`: load graph files and print statement counts

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use toil_ingest_csv::{run_populate, EntityMapping, PopulateConfig, RelationKind, RunReport};
use toil_rdf::store::load_graph;

#[derive(Parser)]
#[command(name = "toil")]
#[command(
    author,
    version,
    about = "Populate the toil vocabulary graph from tabular exports"
)]
struct Cli {
    /// Print results as JSON instead of a human summary.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge tabular records into the vocabulary graph.
    Populate {
        #[command(subcommand)]
        command: PopulateCommands,
    },
    /// Load one or more graph files and print statement counts.
    Stats {
        /// Graph files to load, in order.
        #[arg(required = true)]
        graphs: Vec<PathBuf>,
    },
}

/// File locations shared by every populate run.
#[derive(Args)]
struct GraphArgs {
    /// Vocabulary graph: loaded first, overwritten on success.
    #[arg(long, default_value = "ontology/toil.nt")]
    graph: PathBuf,
    /// Class/property definitions. Read, never written.
    #[arg(long, default_value = "data/model.nt")]
    schema: PathBuf,
    /// Delimited source file with a header row.
    #[arg(long)]
    csv: PathBuf,
}

#[derive(Subcommand)]
enum PopulateCommands {
    /// Import occupations as esco:MemberConcept individuals.
    Occupations {
        #[command(flatten)]
        paths: GraphArgs,
    },
    /// Import skills as esco:Skill individuals.
    Skills {
        #[command(flatten)]
        paths: GraphArgs,
    },
    /// Link occupations to the skills they require.
    Relations {
        #[command(flatten)]
        paths: GraphArgs,
        /// Which relevance predicate the imported edges use.
        #[arg(long, value_enum, default_value = "essential")]
        relation_kind: RelationKindArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RelationKindArg {
    Essential,
    Optional,
}

impl From<RelationKindArg> for RelationKind {
    fn from(kind: RelationKindArg) -> Self {
        match kind {
            RelationKindArg::Essential => Self::Essential,
            RelationKindArg::Optional => Self::Optional,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Populate { command } => {
            let (label, config) = match command {
                PopulateCommands::Occupations { paths } => {
                    ("occupations", populate_config(paths, EntityMapping::occupations()))
                }
                PopulateCommands::Skills { paths } => {
                    ("skills", populate_config(paths, EntityMapping::skills()))
                }
                PopulateCommands::Relations {
                    paths,
                    relation_kind,
                } => (
                    "relations",
                    populate_config(paths, EntityMapping::relations(relation_kind.into())),
                ),
            };
            cmd_populate(label, &config, cli.json)?;
        }
        Commands::Stats { graphs } => {
            cmd_stats(&graphs, cli.json)?;
        }
    }

    Ok(())
}

fn populate_config(paths: GraphArgs, mapping: EntityMapping) -> PopulateConfig {
    PopulateConfig {
        graph_path: paths.graph,
        schema_path: paths.schema,
        source_path: paths.csv,
        mapping,
    }
}

fn cmd_populate(label: &str, config: &PopulateConfig, json: bool) -> Result<()> {
    if !json {
        println!(
            "{} {} from {}",
            "Populating".green().bold(),
            label,
            config.source_path.display()
        );
    }

    let report = run_populate(config)?;
    print_report(&report, config, json)?;
    Ok(())
}

fn print_report(report: &RunReport, config: &PopulateConfig, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!(
        "  {} {} records processed",
        "→".cyan(),
        report.records_processed
    );
    println!(
        "  {} {} statements added ({} total)",
        "→".cyan(),
        report.statements_added,
        report.graph_statements
    );
    println!(
        "{} graph saved to {}",
        "Done".green().bold(),
        config.graph_path.display()
    );
    Ok(())
}

fn cmd_stats(graphs: &[PathBuf], json: bool) -> Result<()> {
    let mut files = Vec::new();
    for path in graphs {
        let graph = load_graph(std::slice::from_ref(path))?;
        files.push((path, graph.len()));
    }
    let union = load_graph(graphs)?;

    if json {
        let report = serde_json::json!({
            "files": files
                .iter()
                .map(|(path, count)| {
                    serde_json::json!({ "path": path.display().to_string(), "statements": count })
                })
                .collect::<Vec<_>>(),
            "union_statements": union.len(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for (path, count) in &files {
        println!("  {} {}: {} statements", "→".cyan(), path.display(), count);
    }
    println!(
        "{} union: {} statements",
        "Total".green().bold(),
        union.len()
    );
    Ok(())
}
