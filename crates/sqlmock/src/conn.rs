//! The mock connection handed to code under test, and the `Mock` handle
//! tests use to declare and verify expectations against it.

use crate::driver::Driver;
use crate::expectation::{Call, ExecResult, ExpectationBuilder, Kind, Outcome};
use crate::matcher::normalize;
use crate::queue::{ExpectationQueue, Fulfilled};
use crate::rows::Rows;
use crate::verify::{self, PendingExpectation};
use common::{Config, DbError, DbResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use types::Value;

/// Everything a connection mutates, guarded by one lock.
#[derive(Debug)]
pub(crate) struct State {
    pub queue: ExpectationQueue,
    pub config: Config,
    pub in_tx: bool,
    pub closed: bool,
}

type Shared = Arc<Mutex<State>>;

/// Create a connection and its declaration handle with default settings:
/// ordered matching and regex SQL patterns.
pub fn new() -> (MockConnection, Mock) {
    new_with(Config::default())
}

pub fn new_with(config: Config) -> (MockConnection, Mock) {
    let state = State {
        queue: ExpectationQueue::new(config.ordered),
        config,
        in_tx: false,
        closed: false,
    };
    let shared: Shared = Arc::new(Mutex::new(state));
    (
        MockConnection {
            shared: Arc::clone(&shared),
        },
        Mock { shared },
    )
}

/// Declaration and verification side of a mock connection.
#[derive(Clone, Debug)]
pub struct Mock {
    shared: Shared,
}

impl Mock {
    pub fn expect_begin(&self) -> ExpectationBuilder<'_> {
        ExpectationBuilder::new(self, Kind::Begin, None)
    }

    pub fn expect_exec(&self, sql: impl Into<String>) -> ExpectationBuilder<'_> {
        ExpectationBuilder::new(self, Kind::Exec, Some(sql.into()))
    }

    pub fn expect_query(&self, sql: impl Into<String>) -> ExpectationBuilder<'_> {
        ExpectationBuilder::new(self, Kind::Query, Some(sql.into()))
    }

    pub fn expect_commit(&self) -> ExpectationBuilder<'_> {
        ExpectationBuilder::new(self, Kind::Commit, None)
    }

    pub fn expect_rollback(&self) -> ExpectationBuilder<'_> {
        ExpectationBuilder::new(self, Kind::Rollback, None)
    }

    /// Only declarable when the connection was built with
    /// `close_expectations` enabled.
    pub fn expect_close(&self) -> ExpectationBuilder<'_> {
        ExpectationBuilder::new(self, Kind::Close, None)
    }

    /// Switch between strict and relaxed ordering for subsequent calls.
    pub fn match_expectations_in_order(&self, ordered: bool) {
        self.with_state(|state| {
            state.config.ordered = ordered;
            state.queue.set_ordered(ordered);
        });
    }

    /// `Ok` only when every declared expectation was consumed.
    pub fn expectations_were_met(&self) -> DbResult<()> {
        self.with_state(|state| verify::check(&state.queue))
    }

    /// Snapshot of the expectations still waiting for a call.
    pub fn remaining(&self) -> Vec<PendingExpectation> {
        self.with_state(|state| verify::snapshot(&state.queue))
    }

    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.shared.lock())
    }
}

/// Driver-shaped connection backed by declared expectations.
///
/// Clones share the same queue and transaction state, so the handle can be
/// passed to several threads the way a pooled connection would be.
#[derive(Clone, Debug)]
pub struct MockConnection {
    shared: Shared,
}

impl MockConnection {
    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    pub fn in_transaction(&self) -> bool {
        self.shared.lock().in_tx
    }

    fn dispatch(&self, kind: Kind, sql: Option<&str>, args: &[Value]) -> DbResult<Outcome> {
        let normalized = sql.map(normalize);
        let (fulfilled, timeout) = {
            let mut state = self.shared.lock();
            if state.closed {
                return Err(DbError::ClosedConnection);
            }
            match kind {
                Kind::Begin if state.in_tx => {
                    return Err(DbError::IllegalState(
                        "begin called while a transaction is already open".into(),
                    ));
                }
                Kind::Commit | Kind::Rollback if !state.in_tx => {
                    return Err(DbError::IllegalState(format!(
                        "{kind} called without an open transaction"
                    )));
                }
                _ => {}
            }
            let call = Call {
                kind,
                sql: normalized.as_deref(),
                args,
                in_tx: state.in_tx,
            };
            let fulfilled = state.queue.take(&call)?;
            // Transaction state moves with the match, before any delay. A
            // begin canceled by `call_timeout` has still opened the
            // transaction.
            match kind {
                Kind::Begin if !matches!(fulfilled.outcome, Outcome::Error(_)) => {
                    state.in_tx = true;
                }
                Kind::Commit | Kind::Rollback => state.in_tx = false,
                _ => {}
            }
            (fulfilled, state.config.call_timeout)
        };
        settle(kind, fulfilled, timeout)
    }
}

/// Apply the simulated latency outside the lock and unwrap the outcome.
fn settle(kind: Kind, fulfilled: Fulfilled, timeout: Option<Duration>) -> DbResult<Outcome> {
    let Fulfilled {
        index,
        outcome,
        delay,
    } = fulfilled;
    if let Some(delay) = delay {
        match timeout {
            Some(limit) if delay > limit => {
                std::thread::sleep(limit);
                tracing::debug!(index, ?delay, ?limit, "call timed out during delay");
                return Err(DbError::Canceled(format!("{kind} expectation #{index}")));
            }
            _ => std::thread::sleep(delay),
        }
    }
    match outcome {
        Outcome::Error(err) => Err(err),
        other => Ok(other),
    }
}

fn mismatched(kind: Kind, outcome: &Outcome) -> DbError {
    DbError::Configuration(format!("{kind} expectation produced {outcome:?}"))
}

impl Driver for MockConnection {
    fn begin(&self) -> DbResult<()> {
        self.dispatch(Kind::Begin, None, &[]).map(drop)
    }

    fn exec(&self, sql: &str, args: &[Value]) -> DbResult<ExecResult> {
        match self.dispatch(Kind::Exec, Some(sql), args)? {
            Outcome::Result(result) => Ok(result),
            other => Err(mismatched(Kind::Exec, &other)),
        }
    }

    fn query(&self, sql: &str, args: &[Value]) -> DbResult<Rows> {
        match self.dispatch(Kind::Query, Some(sql), args)? {
            Outcome::Rows(rows) => Ok(rows.into_cursor()),
            other => Err(mismatched(Kind::Query, &other)),
        }
    }

    fn commit(&self) -> DbResult<()> {
        self.dispatch(Kind::Commit, None, &[]).map(drop)
    }

    fn rollback(&self) -> DbResult<()> {
        self.dispatch(Kind::Rollback, None, &[]).map(drop)
    }

    /// Idempotent: only the first call changes state or consults the queue.
    fn close(&self) -> DbResult<()> {
        let (fulfilled, timeout) = {
            let mut state = self.shared.lock();
            if state.closed {
                return Ok(());
            }
            state.closed = true;
            if state.in_tx {
                tracing::warn!("closing mock connection with an open transaction");
            }
            if !state.config.close_expectations {
                return Ok(());
            }
            let call = Call {
                kind: Kind::Close,
                sql: None,
                args: &[],
                in_tx: state.in_tx,
            };
            (state.queue.take(&call)?, state.config.call_timeout)
        };
        settle(Kind::Close, fulfilled, timeout).map(drop)
    }
}
