//! Entity mappings: the per-pipeline rules turning one record into
//! statements.
//!
//! A mapping is configuration chosen when the pipeline is set up, never
//! derived from record content. The mappers are pure: the same record
//! always yields the same statement set, which is what makes whole runs
//! idempotent.

use crate::records::Record;
use crate::IngestError;
use std::collections::BTreeSet;
use toil_rdf::Statement;

/// Well-known vocabulary IRIs used by the built-in mappings.
pub mod vocab {
    pub use toil_rdf::RDF_TYPE;

    pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    pub const DCT_DESCRIPTION: &str = "http://purl.org/dc/terms/description";
    pub const SKOS_NOTATION: &str = "http://www.w3.org/2004/02/skos/core#notation";

    pub const ESCO_MEMBER_CONCEPT: &str = "http://data.europa.eu/esco/model#MemberConcept";
    pub const ESCO_SKILL: &str = "http://data.europa.eu/esco/model#Skill";
    pub const ESCO_SKILL_TYPE: &str = "http://data.europa.eu/esco/model#skillType";
    pub const ESCO_HAS_ESSENTIAL_SKILL: &str =
        "http://data.europa.eu/esco/model#hasEssentialSkill";
    pub const ESCO_HAS_OPTIONAL_SKILL: &str = "http://data.europa.eu/esco/model#hasOptionalSkill";
}

/// Language tag carried by human-readable labels and descriptions.
const LABEL_LANG: &str = "en";

/// How a source value becomes a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    /// Human-readable text, emitted with the given language tag.
    Tagged(String),
    /// Code or notation, emitted without a tag.
    Plain,
}

/// One optional attribute: emitted only when its source column is non-null.
#[derive(Debug, Clone)]
pub struct AttributeRule {
    pub predicate: String,
    pub column: String,
    pub value: ValueKind,
}

impl AttributeRule {
    fn tagged(predicate: &str, column: &str) -> Self {
        Self {
            predicate: predicate.to_string(),
            column: column.to_string(),
            value: ValueKind::Tagged(LABEL_LANG.to_string()),
        }
    }

    fn plain(predicate: &str, column: &str) -> Self {
        Self {
            predicate: predicate.to_string(),
            column: column.to_string(),
            value: ValueKind::Plain,
        }
    }
}

/// Which relevance predicate a relations run emits.
///
/// The upstream export models richer relation typing in a column this
/// pipeline does not read; one fixed kind per run, essential by default,
/// matches the established import behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelationKind {
    #[default]
    Essential,
    Optional,
}

impl RelationKind {
    fn predicate(self) -> &'static str {
        match self {
            Self::Essential => vocab::ESCO_HAS_ESSENTIAL_SKILL,
            Self::Optional => vocab::ESCO_HAS_OPTIONAL_SKILL,
        }
    }
}

/// The mapping rule for one pipeline instance.
#[derive(Debug, Clone)]
pub enum EntityMapping {
    /// One individual per record: an unconditional type statement plus one
    /// statement per attribute rule whose column is non-null.
    Individual {
        subject_column: String,
        class_iri: String,
        attributes: Vec<AttributeRule>,
    },
    /// One edge per record between two already-described individuals.
    Relation {
        subject_column: String,
        object_column: String,
        predicate_iri: String,
    },
}

impl EntityMapping {
    /// Occupations: `esco:MemberConcept` individuals keyed by `conceptUri`.
    pub fn occupations() -> Self {
        Self::Individual {
            subject_column: "conceptUri".to_string(),
            class_iri: vocab::ESCO_MEMBER_CONCEPT.to_string(),
            attributes: vec![
                AttributeRule::tagged(vocab::RDFS_LABEL, "preferredLabel"),
                AttributeRule::tagged(vocab::DCT_DESCRIPTION, "description"),
                AttributeRule::plain(vocab::SKOS_NOTATION, "iscoGroup"),
            ],
        }
    }

    /// Skills: `esco:Skill` individuals keyed by `conceptUri`.
    pub fn skills() -> Self {
        Self::Individual {
            subject_column: "conceptUri".to_string(),
            class_iri: vocab::ESCO_SKILL.to_string(),
            attributes: vec![
                AttributeRule::tagged(vocab::RDFS_LABEL, "preferredLabel"),
                AttributeRule::tagged(vocab::DCT_DESCRIPTION, "description"),
                AttributeRule::plain(vocab::ESCO_SKILL_TYPE, "skillType"),
            ],
        }
    }

    /// Occupation→skill relevance edges.
    pub fn relations(kind: RelationKind) -> Self {
        Self::Relation {
            subject_column: "occupationUri".to_string(),
            object_column: "skillUri".to_string(),
            predicate_iri: kind.predicate().to_string(),
        }
    }

    /// Columns a record must have non-null to be eligible for this mapping.
    pub fn required_columns(&self) -> Vec<&str> {
        match self {
            Self::Individual { subject_column, .. } => vec![subject_column.as_str()],
            Self::Relation {
                subject_column,
                object_column,
                ..
            } => vec![subject_column.as_str(), object_column.as_str()],
        }
    }
}

/// Map one eligible record into its statement set.
///
/// The set is never empty for an eligible record: the individual variant
/// always emits the type statement, the relation variant always emits its
/// single edge.
pub fn map_record(
    record: &Record,
    mapping: &EntityMapping,
) -> Result<BTreeSet<Statement>, IngestError> {
    match mapping {
        EntityMapping::Individual {
            subject_column,
            class_iri,
            attributes,
        } => map_individual(record, subject_column, class_iri, attributes),
        EntityMapping::Relation {
            subject_column,
            object_column,
            predicate_iri,
        } => map_relation(record, subject_column, object_column, predicate_iri),
    }
}

fn map_individual(
    record: &Record,
    subject_column: &str,
    class_iri: &str,
    attributes: &[AttributeRule],
) -> Result<BTreeSet<Statement>, IngestError> {
    let subject = column_iri(record, subject_column)?;

    let mut statements = BTreeSet::new();
    statements.insert(Statement::resource(&subject, vocab::RDF_TYPE, class_iri));

    for rule in attributes {
        let Some(value) = record.get(&rule.column) else {
            continue;
        };
        let statement = match &rule.value {
            ValueKind::Tagged(lang) => Statement::tagged(&subject, &rule.predicate, value, lang),
            ValueKind::Plain => Statement::plain(&subject, &rule.predicate, value),
        };
        statements.insert(statement);
    }
    Ok(statements)
}

fn map_relation(
    record: &Record,
    subject_column: &str,
    object_column: &str,
    predicate_iri: &str,
) -> Result<BTreeSet<Statement>, IngestError> {
    let subject = column_iri(record, subject_column)?;
    let object = column_iri(record, object_column)?;

    let mut statements = BTreeSet::new();
    statements.insert(Statement::resource(&subject, predicate_iri, &object));
    Ok(statements)
}

fn column_iri(record: &Record, column: &str) -> Result<String, IngestError> {
    let value = record.get(column).ok_or_else(|| IngestError::Mapping {
        row: record.row(),
        message: format!("required column `{column}` is empty"),
    })?;
    check_iri(value).map_err(|message| IngestError::Mapping {
        row: record.row(),
        message,
    })?;
    Ok(value.to_string())
}

// Light well-formedness check: an absolute IRI reference with no
// characters that would corrupt a serialized statement.
fn check_iri(value: &str) -> Result<(), String> {
    let scheme_ok = value
        .split_once(':')
        .map(|(scheme, _)| {
            !scheme.is_empty()
                && scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        })
        .unwrap_or(false);
    if !scheme_ok {
        return Err(format!("`{value}` is not an absolute IRI"));
    }
    if value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`'))
    {
        return Err(format!("`{value}` contains characters not allowed in an IRI"));
    }
    Ok(())
}
