//! End-of-test verification that every expectation was consumed.

use crate::expectation::Kind;
use crate::queue::ExpectationQueue;
use common::pretty::{TableStyleKind, render_string_table};
use common::{DbError, DbResult};
use std::fmt;

/// Read-only view of an expectation still waiting for its call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingExpectation {
    pub index: usize,
    pub kind: Kind,
    pub sql: Option<String>,
    description: String,
}

impl fmt::Display for PendingExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

pub(crate) fn snapshot(queue: &ExpectationQueue) -> Vec<PendingExpectation> {
    queue
        .remaining()
        .map(|e| PendingExpectation {
            index: e.index,
            kind: e.kind,
            sql: e.sql.as_ref().map(|m| m.as_str().to_string()),
            description: e.to_string(),
        })
        .collect()
}

pub(crate) fn check(queue: &ExpectationQueue) -> DbResult<()> {
    let pending = snapshot(queue);
    if pending.is_empty() {
        return Ok(());
    }
    tracing::warn!(
        unmet = pending.len(),
        "unfulfilled expectations:\n{}",
        render(&pending)
    );
    Err(DbError::UnmetExpectations(
        pending.into_iter().map(|p| p.description).collect(),
    ))
}

/// Tabular listing of pending expectations for logs and failure output.
pub fn render(pending: &[PendingExpectation]) -> String {
    let rows = pending
        .iter()
        .map(|p| {
            vec![
                p.index.to_string(),
                p.kind.to_string(),
                p.sql.clone().unwrap_or_default(),
            ]
        })
        .collect();
    render_string_table(&["#", "kind", "sql"], rows, TableStyleKind::Ascii)
}
