//! Ordered store of expectations and the matching rules that consume them.

use crate::expectation::{Call, Expectation, Outcome};
use common::{DbError, DbResult};
use std::time::Duration;

/// An expectation that was just consumed by a call.
#[derive(Debug)]
pub(crate) struct Fulfilled {
    pub index: usize,
    pub outcome: Outcome,
    pub delay: Option<Duration>,
}

#[derive(Debug)]
pub(crate) struct ExpectationQueue {
    entries: Vec<Expectation>,
    ordered: bool,
}

impl ExpectationQueue {
    pub fn new(ordered: bool) -> Self {
        Self {
            entries: Vec::new(),
            ordered,
        }
    }

    pub fn set_ordered(&mut self, ordered: bool) {
        self.ordered = ordered;
    }

    /// Append with the next sequence index (1-based, in declared order).
    pub fn declare(&mut self, mut expectation: Expectation, closed: bool) -> DbResult<usize> {
        if closed {
            return Err(DbError::Configuration(format!(
                "cannot declare {} expectation after the connection was closed",
                expectation.kind
            )));
        }
        expectation.index = self.entries.len() + 1;
        tracing::debug!(expectation = %expectation, "declared expectation");
        self.entries.push(expectation);
        Ok(self.entries.len())
    }

    /// Find, consume, and return the expectation `call` is allowed to match.
    ///
    /// Test and set happen under the caller's lock, so two concurrent calls
    /// can never consume the same entry.
    pub fn take(&mut self, call: &Call<'_>) -> DbResult<Fulfilled> {
        let pos = if self.ordered {
            self.find_ordered(call)?
        } else {
            self.find_unordered(call)?
        };
        let entry = &mut self.entries[pos];
        entry.fulfilled = true;
        let outcome = entry.outcome.take().unwrap_or(Outcome::Done);
        tracing::debug!(expectation = %entry, "matched expectation");
        Ok(Fulfilled {
            index: entry.index,
            outcome,
            delay: entry.delay,
        })
    }

    /// Unfulfilled expectations in declared order.
    pub fn remaining(&self) -> impl Iterator<Item = &Expectation> + '_ {
        self.entries.iter().filter(|e| !e.fulfilled)
    }

    fn find_ordered(&self, call: &Call<'_>) -> DbResult<usize> {
        // The head is the first pending entry not marked any-order; nothing
        // declared after it may match unless it is itself any-order.
        let mut head: Option<&Expectation> = None;
        for (pos, entry) in self.entries.iter().enumerate() {
            if entry.fulfilled {
                continue;
            }
            if entry.any_order {
                if entry.matches(call) {
                    return Ok(pos);
                }
                continue;
            }
            if head.is_none() {
                if entry.matches(call) {
                    return Ok(pos);
                }
                head = Some(entry);
            }
        }
        match head {
            Some(next) => {
                tracing::warn!(call = %call, next = %next, "call out of declared order");
                Err(DbError::OrderViolation {
                    call: call.to_string(),
                    next: next.to_string(),
                })
            }
            None => Err(self.unexpected(call)),
        }
    }

    fn find_unordered(&self, call: &Call<'_>) -> DbResult<usize> {
        self.entries
            .iter()
            .position(|e| !e.fulfilled && e.matches(call))
            .ok_or_else(|| self.unexpected(call))
    }

    fn unexpected(&self, call: &Call<'_>) -> DbError {
        tracing::warn!(call = %call, "no expectation matches call");
        if self.remaining().next().is_none() {
            DbError::UnexpectedCall(format!(
                "all expectations were already fulfilled, call to {call} was not expected"
            ))
        } else {
            DbError::UnexpectedCall(format!(
                "call to {call} does not match any remaining expectation"
            ))
        }
    }
}
