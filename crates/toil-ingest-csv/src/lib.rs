//! Tabular vocabulary ingestion for the toil graph.
//!
//! Three pipeline instances populate the vocabulary graph from ESCO-style
//! tabular exports: occupations and skills become individuals with
//! attributes, occupation→skill relevance becomes edges between existing
//! individuals. All three share one procedure (load graph + schema, read
//! eligible records, map each record into statements, merge with set
//! semantics, save) and differ only in their [`EntityMapping`].
//!
//! Every error is fatal for the run. The save step is the only external
//! mutation and runs last, so a failed run leaves the destination file
//! untouched; the recovery action is fix-the-input-and-re-run, which the
//! pipeline's determinism makes safe.

pub mod mapping;
pub mod pipeline;
pub mod records;

pub use mapping::{map_record, AttributeRule, EntityMapping, RelationKind, ValueKind};
pub use pipeline::{run_populate, PopulateConfig, RunReport};
pub use records::{filter_eligible, read_records, Record};

use std::path::PathBuf;
use toil_rdf::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The tabular source is unreadable, not parseable as delimited text,
    /// or missing a required header column.
    #[error("failed to read tabular source {}: {message}", .source_path.display())]
    SourceFormat {
        source_path: PathBuf,
        message: String,
    },
    /// An eligible record could not be turned into statements.
    #[error("cannot map record at data row {row}: {message}")]
    Mapping { row: usize, message: String },
    /// Graph store failure: a malformed source on load or a write failure
    /// on save.
    #[error(transparent)]
    Store(#[from] StoreError),
}
