//! Conversion of search results and errors into the caller-facing shape.

use crate::errors::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use trix_core::Triple;

/// One matching triple as handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripleRecord {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl From<Triple> for TripleRecord {
    fn from(t: Triple) -> Self {
        Self { subject: t.subject, predicate: t.predicate, object: t.object }
    }
}

impl TripleRecord {
    pub fn new(subject: &str, predicate: &str, object: &str) -> Self {
        Self {
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            object: object.to_string(),
        }
    }
}

/// Consumes the materialized triples, keeping encounter order.
pub fn records(triples: Vec<Triple>) -> Vec<TripleRecord> {
    triples.into_iter().map(TripleRecord::from).collect()
}

pub fn records_to_json(records: &[TripleRecord]) -> Result<Value> {
    Ok(serde_json::to_value(records)?)
}

pub fn error_to_json(err: &BridgeError) -> Value {
    json!({ "message": err.to_string() })
}

/// Error-first envelope: `{"error": {...}}` on failure,
/// `{"error": null, "triples": [...]}` on success.
pub fn search_outcome_to_json(outcome: &Result<Vec<TripleRecord>>) -> Result<Value> {
    Ok(match outcome {
        Ok(records) => json!({ "error": Value::Null, "triples": records_to_json(records)? }),
        Err(err) => json!({ "error": error_to_json(err) }),
    })
}
