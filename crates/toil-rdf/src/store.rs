//! Load, merge, save for serialized graphs.
//!
//! Loading parses one or more sources with Sophia and unions them into a
//! single [`Graph`]; any unreadable or malformed source aborts the whole
//! load. Saving writes canonical N-Triples (statements in set order, one
//! per line) and overwrites the destination wholesale. Callers that want
//! to preserve the destination's existing content must load it first and
//! merge into the loaded graph.
//!
//! Format is chosen by file extension. Sophia handles N-Triples, Turtle
//! and RDF/XML on the way in; the canonical persisted form is N-Triples.

use crate::{Graph, Literal, Node, Statement, Term};
use sophia::api::prelude::*;
use std::io;
use std::path::{Path, PathBuf};

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Serialization formats the store can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    NTriples,
    Turtle,
    RdfXml,
}

impl GraphFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, StoreError> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "nt" | "ntriples" => Ok(Self::NTriples),
            "ttl" | "turtle" => Ok(Self::Turtle),
            "rdf" | "owl" | "xml" => Ok(Self::RdfXml),
            other => Err(StoreError::Parse {
                source_path: path.to_path_buf(),
                message: format!("unsupported graph format: .{other}"),
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A graph source was unreadable or malformed. Nothing partial is kept.
    #[error("failed to parse graph source {}: {message}", .source_path.display())]
    Parse {
        source_path: PathBuf,
        message: String,
    },
    /// The destination could not be written.
    #[error("failed to write graph: {0}")]
    Io(#[from] io::Error),
}

// Error type threaded through the Sophia sink closures; `try_for_each_triple`
// needs a `std::error::Error` on the sink side.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
struct TermError {
    message: String,
}

impl TermError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Parse each source in order and union the results into one graph.
///
/// Fails on the first unreadable or malformed source; no partial graph is
/// returned.
pub fn load_graph(sources: &[PathBuf]) -> Result<Graph, StoreError> {
    let mut graph = Graph::new();
    for path in sources {
        let format = GraphFormat::from_path(path)?;
        let bytes = std::fs::read(path).map_err(|e| StoreError::Parse {
            source_path: path.clone(),
            message: e.to_string(),
        })?;
        let statements = parse_statements(&bytes, format).map_err(|e| StoreError::Parse {
            source_path: path.clone(),
            message: e.message,
        })?;
        let parsed = statements.len();
        graph.merge(statements);
        tracing::info!(
            path = %path.display(),
            parsed,
            total = graph.len(),
            "loaded graph source"
        );
    }
    Ok(graph)
}

fn parse_statements(bytes: &[u8], format: GraphFormat) -> Result<Vec<Statement>, TermError> {
    let reader = io::BufReader::new(io::Cursor::new(bytes));
    let mut out = Vec::new();
    match format {
        GraphFormat::NTriples => {
            collect_triples(sophia::turtle::parser::nt::parse_bufread(reader), &mut out)?;
        }
        GraphFormat::Turtle => {
            collect_triples(
                sophia::turtle::parser::turtle::parse_bufread(reader),
                &mut out,
            )?;
        }
        GraphFormat::RdfXml => {
            collect_triples(sophia::xml::parser::parse_bufread(reader), &mut out)?;
        }
    }
    Ok(out)
}

// Render a Sophia term into its canonical N-Triples form (`<iri>`, `_:label`,
// `"text"@en`, `"5"^^<dt>`). The generic term loop yields opaque borrowed
// terms whose concrete `Display` is not nameable here, so use Sophia's own
// N-Triples term writer, which emits the same lexical form.
fn term_to_nt<T>(term: T) -> String
where
    T: sophia::api::term::Term,
{
    let mut buf: Vec<u8> = Vec::new();
    // Writing to an in-memory buffer is infallible; a formatting failure would
    // still surface downstream when the empty string fails to parse.
    let _ = sophia::turtle::serializer::nt::write_term(&mut buf, term);
    String::from_utf8_lossy(&buf).into_owned()
}

fn collect_triples<S>(mut source: S, out: &mut Vec<Statement>) -> Result<(), TermError>
where
    S: sophia::api::source::TripleSource,
{
    source
        .try_for_each_triple(|t| -> Result<(), TermError> {
            let subject = parse_node(&term_to_nt(t.s()))?;
            // Generalized RDF allows non-IRI predicates; skip them.
            let Node::Iri(predicate) = parse_node(&term_to_nt(t.p()))? else {
                return Ok(());
            };
            let object = parse_term(&term_to_nt(t.o()))?;
            out.push(Statement {
                subject,
                predicate,
                object,
            });
            Ok(())
        })
        .map_err(|e| TermError::new(e.to_string()))
}

// ============================================================================
// Term display parsing
//
// Sophia terms render in their N-Triples form (`<iri>`, `_:label`,
// `"text"@en`, `"5"^^<dt>`); parse that back into the statement model.
// ============================================================================

fn parse_node(term: &str) -> Result<Node, TermError> {
    match parse_term(term)? {
        Term::Node(node) => Ok(node),
        Term::Literal(_) => Err(TermError::new(format!(
            "expected IRI or blank node, got literal: {term}"
        ))),
    }
}

fn parse_term(term: &str) -> Result<Term, TermError> {
    let s = term.trim();

    if let Some(iri) = s.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Ok(Term::Node(Node::Iri(iri.to_string())));
    }

    if let Some(label) = s.strip_prefix("_:") {
        return Ok(Term::Node(Node::Blank(label.to_string())));
    }

    if s.starts_with('"') {
        let Some(end) = closing_quote(s) else {
            return Err(TermError::new(format!(
                "invalid literal (missing closing quote): {s}"
            )));
        };

        let lexical = unescape(&s[1..end]);
        let rest = s[end + 1..].trim();

        let mut language = None;
        let mut datatype = None;
        if let Some(lang) = rest.strip_prefix('@') {
            language = Some(lang.to_string());
        } else if let Some(dt) = rest.strip_prefix("^^") {
            let dt = dt.trim();
            let dt = dt
                .strip_prefix('<')
                .and_then(|t| t.strip_suffix('>'))
                .unwrap_or(dt);
            // RDF 1.1: a simple literal and an explicit xsd:string literal
            // are the same term. Normalize so set semantics see them equal.
            if !dt.is_empty() && dt != XSD_STRING {
                datatype = Some(dt.to_string());
            }
        }

        return Ok(Term::Literal(Literal {
            lexical,
            language,
            datatype,
        }));
    }

    Err(TermError::new(format!("unsupported RDF term form: {s}")))
}

fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, ch) in s.char_indices().skip(1) {
        match ch {
            '"' if !escaped => return Some(i),
            '\\' => escaped = !escaped,
            _ => escaped = false,
        }
    }
    None
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

// ============================================================================
// Saving
// ============================================================================

/// Serialize the full graph to the destination as canonical N-Triples,
/// replacing whatever was there.
pub fn save_graph(graph: &Graph, destination: &Path) -> Result<(), StoreError> {
    let mut out = String::new();
    for statement in graph.iter() {
        write_statement(&mut out, statement);
    }
    std::fs::write(destination, out)?;
    tracing::info!(
        path = %destination.display(),
        statements = graph.len(),
        "saved graph"
    );
    Ok(())
}

fn write_statement(out: &mut String, statement: &Statement) {
    write_node(out, &statement.subject);
    out.push(' ');
    out.push('<');
    out.push_str(&statement.predicate);
    out.push('>');
    out.push(' ');
    match &statement.object {
        Term::Node(node) => write_node(out, node),
        Term::Literal(literal) => write_literal(out, literal),
    }
    out.push_str(" .\n");
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Iri(iri) => {
            out.push('<');
            out.push_str(iri);
            out.push('>');
        }
        Node::Blank(label) => {
            out.push_str("_:");
            out.push_str(label);
        }
    }
}

fn write_literal(out: &mut String, literal: &Literal) {
    out.push('"');
    out.push_str(&escape(&literal.lexical));
    out.push('"');
    if let Some(lang) = &literal.language {
        out.push('@');
        out.push_str(lang);
    } else if let Some(datatype) = &literal.datatype {
        out.push_str("^^<");
        out.push_str(datatype);
        out.push('>');
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}
