//! Equality filters over stored documents.
//!
//! The adapter contract only requires simple equality and reference filters;
//! a clause addresses a field by dotted path (`patient.referenceid`) and all
//! clauses of a filter must match (conjunction).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single equality clause over a dotted field path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    pub path: String,
    pub value: String,
}

impl FilterClause {
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Checks whether a document satisfies this clause.
    ///
    /// Strings compare directly; numbers and booleans compare by their
    /// canonical string form. Missing paths never match.
    pub fn matches(&self, document: &Value) -> bool {
        match lookup_path(document, &self.path) {
            Some(Value::String(s)) => s == &self.value,
            Some(Value::Number(n)) => n.to_string() == self.value,
            Some(Value::Bool(b)) => b.to_string() == self.value,
            _ => false,
        }
    }
}

fn lookup_path<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = document;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// A conjunction of equality clauses. An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub clauses: Vec<FilterClause>,
}

impl Filter {
    /// A filter that matches every document (unfiltered scan).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A filter that matches the document with the given id.
    #[must_use]
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::empty().with_clause("id", id)
    }

    /// Adds an equality clause.
    #[must_use]
    pub fn with_clause(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.clauses.push(FilterClause::new(path, value));
        self
    }

    /// Returns true if this filter has no clauses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Checks whether a document satisfies every clause.
    pub fn matches(&self, document: &Value) -> bool {
        self.clauses.iter().all(|c| c.matches(document))
    }
}
