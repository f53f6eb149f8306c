//! The populate pipeline: load, read, map, merge, save.
//!
//! A run moves through a fixed sequence of states with no branching:
//! graph loaded → records read → statements merged → saved. Any failure
//! aborts the run before the save step, so the destination file is only
//! ever touched by a run that completed all in-memory work.

use crate::mapping::{map_record, EntityMapping};
use crate::records::{filter_eligible, read_records};
use crate::IngestError;
use serde::Serialize;
use std::path::PathBuf;
use toil_rdf::store::{load_graph, save_graph};

/// One pipeline run, fully described by its file locations and mapping.
#[derive(Debug, Clone)]
pub struct PopulateConfig {
    /// Vocabulary graph: loaded first, overwritten on success.
    pub graph_path: PathBuf,
    /// Class/property definitions. Read, never written.
    pub schema_path: PathBuf,
    /// Delimited source file with a header row.
    pub source_path: PathBuf,
    pub mapping: EntityMapping,
}

/// What a completed run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Eligible records mapped and merged.
    pub records_processed: usize,
    /// Statements in the final graph that were not in the loaded graph.
    pub statements_added: usize,
    /// Total statements persisted.
    pub graph_statements: usize,
}

const PROGRESS_INTERVAL: usize = 1000;

/// Run one populate pipeline to completion.
///
/// Loads the vocabulary graph and then the schema graph into one set,
/// streams eligible records through the configured mapping, and writes
/// the merged graph back over `graph_path`. A source yielding zero
/// eligible records is not an error; the unchanged graph is re-persisted.
pub fn run_populate(config: &PopulateConfig) -> Result<RunReport, IngestError> {
    let sources = [config.graph_path.clone(), config.schema_path.clone()];
    let mut graph = load_graph(&sources)?;
    let loaded = graph.len();
    tracing::info!(statements = loaded, "graph and schema loaded");

    let required = config.mapping.required_columns();
    let records = read_records(&config.source_path, &required)?;
    let total = records.len();
    let eligible = filter_eligible(records, &required);
    tracing::info!(
        source = %config.source_path.display(),
        eligible = eligible.len(),
        skipped = total - eligible.len(),
        "records read"
    );

    for (i, record) in eligible.iter().enumerate() {
        let statements = map_record(record, &config.mapping)?;
        graph.merge(statements);
        if (i + 1) % PROGRESS_INTERVAL == 0 {
            tracing::info!(processed = i + 1, "mapping records");
        }
    }

    save_graph(&graph, &config.graph_path)?;

    Ok(RunReport {
        records_processed: eligible.len(),
        statements_added: graph.len() - loaded,
        graph_statements: graph.len(),
    })
}
