//! RDF statement model and graph store for the toil vocabulary graph.
//!
//! The graph is a plain, deduplicated set of statements: inserting a
//! statement that is already present is a no-op, and the union of two
//! graphs is idempotent and commutative. Statements carry a total order,
//! so a graph always serializes in the same byte sequence; re-saving an
//! unchanged graph reproduces the file exactly.
//!
//! Loading and saving live in [`store`]. Everything here is pure data.

pub mod store;

use std::collections::BTreeSet;

/// `rdf:type`, the one predicate the model itself knows about.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Subject-position term: an IRI or a blank node label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    Iri(String),
    Blank(String),
}

/// A literal value: lexical form plus optional language tag plus optional
/// datatype IRI.
///
/// All three fields participate in identity, so `"chef"@en` and `"chef"@fr`
/// are distinct statements about the same subject. Simple literals carry
/// neither tag nor datatype; `xsd:string` is normalized away on load so the
/// two spellings of a plain string compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    pub lexical: String,
    pub language: Option<String>,
    pub datatype: Option<String>,
}

/// Object-position term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Node(Node),
    Literal(Literal),
}

/// One (subject, predicate, object) fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Statement {
    pub subject: Node,
    pub predicate: String,
    pub object: Term,
}

impl Statement {
    /// Edge between two resources.
    pub fn resource(subject: &str, predicate: &str, object: &str) -> Self {
        Self {
            subject: Node::Iri(subject.to_string()),
            predicate: predicate.to_string(),
            object: Term::Node(Node::Iri(object.to_string())),
        }
    }

    /// Language-tagged string attribute.
    pub fn tagged(subject: &str, predicate: &str, text: &str, lang: &str) -> Self {
        Self {
            subject: Node::Iri(subject.to_string()),
            predicate: predicate.to_string(),
            object: Term::Literal(Literal {
                lexical: text.to_string(),
                language: Some(lang.to_string()),
                datatype: None,
            }),
        }
    }

    /// Plain literal attribute: no language tag, no datatype.
    pub fn plain(subject: &str, predicate: &str, text: &str) -> Self {
        Self {
            subject: Node::Iri(subject.to_string()),
            predicate: predicate.to_string(),
            object: Term::Literal(Literal {
                lexical: text.to_string(),
                language: None,
                datatype: None,
            }),
        }
    }
}

/// A deduplicated set of statements, the unit of load/merge/save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    statements: BTreeSet<Statement>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn contains(&self, statement: &Statement) -> bool {
        self.statements.contains(statement)
    }

    /// Insert one statement. Returns `false` if it was already present.
    pub fn insert(&mut self, statement: Statement) -> bool {
        self.statements.insert(statement)
    }

    /// Set union: adds every statement not already present, never removes.
    pub fn merge<I>(&mut self, statements: I)
    where
        I: IntoIterator<Item = Statement>,
    {
        self.statements.extend(statements);
    }

    /// Statements in their serialization order.
    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }
}

impl FromIterator<Statement> for Graph {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self {
            statements: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Graph {
    type Item = Statement;
    type IntoIter = std::collections::btree_set::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Vec<Statement> {
        vec![
            Statement::resource("http://example.org/a", RDF_TYPE, "http://example.org/T"),
            Statement::tagged("http://example.org/a", "http://example.org/label", "alpha", "en"),
            Statement::plain("http://example.org/a", "http://example.org/code", "A1"),
        ]
    }

    #[test]
    fn inserting_present_statement_is_noop() {
        let mut graph: Graph = sample().into_iter().collect();
        assert_eq!(graph.len(), 3);
        assert!(!graph.insert(sample().remove(0)));
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn language_tag_distinguishes_statements() {
        let mut graph = Graph::new();
        graph.insert(Statement::tagged("http://example.org/a", "http://example.org/label", "chef", "en"));
        graph.insert(Statement::tagged("http://example.org/a", "http://example.org/label", "chef", "fr"));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut graph: Graph = sample().into_iter().collect();
        graph.merge(sample());
        assert_eq!(graph.len(), 3);
    }

    proptest! {
        // Union of the same statements in any order yields the same graph.
        #[test]
        fn merge_is_order_independent(indices in prop::collection::vec(0usize..20, 0..40)) {
            let pool: Vec<Statement> = (0..20)
                .map(|i| Statement::plain(
                    &format!("http://example.org/s{}", i % 5),
                    &format!("http://example.org/p{}", i % 3),
                    &format!("v{i}"),
                ))
                .collect();

            let picked: Vec<Statement> = indices.iter().map(|&i| pool[i].clone()).collect();
            let mut reversed = picked.clone();
            reversed.reverse();

            let forward: Graph = picked.into_iter().collect();
            let backward: Graph = reversed.into_iter().collect();
            prop_assert_eq!(forward, backward);
        }
    }
}
