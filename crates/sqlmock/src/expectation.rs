//! Declared expectations and the builder that queues them.

use crate::conn::Mock;
use crate::matcher::{Arg, ArgMatcher, SqlMatcher, render_args};
use crate::rows::RowSet;
use common::{DbError, DbResult, MatchMode};
use std::fmt;
use std::time::Duration;
use types::Value;

/// The driver operation an expectation stands in for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Begin,
    Exec,
    Query,
    Commit,
    Rollback,
    Close,
}

impl Kind {
    /// Exec and query carry SQL and arguments; the rest are bare boundaries.
    pub fn is_statement(self) -> bool {
        matches!(self, Kind::Exec | Kind::Query)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Outcome of a statement that returns no rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecResult {
    last_insert_id: i64,
    rows_affected: u64,
}

impl ExecResult {
    pub fn new(last_insert_id: i64, rows_affected: u64) -> Self {
        Self {
            last_insert_id,
            rows_affected,
        }
    }

    pub fn last_insert_id(&self) -> i64 {
        self.last_insert_id
    }

    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }
}

/// What a matched expectation hands back to the caller.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// Plain success for transaction boundaries and close.
    Done,
    Result(ExecResult),
    Rows(RowSet),
    Error(DbError),
}

/// A call as seen by the queue, with its SQL already normalized.
#[derive(Debug)]
pub(crate) struct Call<'a> {
    pub kind: Kind,
    pub sql: Option<&'a str>,
    pub args: &'a [Value],
    pub in_tx: bool,
}

impl fmt::Display for Call<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(sql) = self.sql {
            write!(f, " {sql:?}")?;
        }
        if self.kind.is_statement() && !self.args.is_empty() {
            write!(f, " with args {}", render_args(self.args))?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct Expectation {
    pub index: usize,
    pub kind: Kind,
    pub sql: Option<SqlMatcher>,
    pub args: Option<ArgMatcher>,
    pub any_order: bool,
    pub within_tx: bool,
    pub delay: Option<Duration>,
    pub fulfilled: bool,
    /// Taken exactly once, when the expectation is fulfilled.
    pub outcome: Option<Outcome>,
}

impl Expectation {
    pub fn matches(&self, call: &Call<'_>) -> bool {
        if self.kind != call.kind || (self.within_tx && !call.in_tx) {
            return false;
        }
        let sql_ok = match (&self.sql, call.sql) {
            (Some(matcher), Some(sql)) => matcher.matches(sql),
            (None, _) => true,
            (Some(_), None) => false,
        };
        sql_ok && self.args.as_ref().is_none_or(|m| m.matches(call.args))
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.index, self.kind)?;
        if let Some(sql) = &self.sql {
            write!(f, " {:?}", sql.as_str())?;
        }
        if let Some(args) = &self.args {
            write!(f, " with args {args}")?;
        }
        Ok(())
    }
}

/// Chained configuration for one expectation, returned by the `expect_*`
/// methods on [`Mock`].
///
/// Misconfiguration is remembered and reported by [`declare`], which is
/// also the only point at which the expectation joins the queue.
///
/// [`declare`]: ExpectationBuilder::declare
#[must_use = "an expectation is only queued once `declare` is called"]
pub struct ExpectationBuilder<'m> {
    mock: &'m Mock,
    kind: Kind,
    sql: Option<String>,
    mode: Option<MatchMode>,
    args: Option<Vec<Arg>>,
    outcome: Option<Outcome>,
    delay: Option<Duration>,
    any_order: bool,
    within_tx: bool,
    error: Option<DbError>,
}

impl<'m> ExpectationBuilder<'m> {
    pub(crate) fn new(mock: &'m Mock, kind: Kind, sql: Option<String>) -> Self {
        Self {
            mock,
            kind,
            sql,
            mode: None,
            args: None,
            outcome: None,
            delay: None,
            any_order: false,
            within_tx: false,
            error: None,
        }
    }

    /// Positional arguments the call must bind; see [`args!`](crate::args).
    pub fn with_args(mut self, args: Vec<Arg>) -> Self {
        if !self.kind.is_statement() {
            self.reject(format!("{} expectations do not take arguments", self.kind));
        }
        self.args = Some(args);
        self
    }

    pub fn will_return_result(mut self, last_insert_id: i64, rows_affected: u64) -> Self {
        if self.kind != Kind::Exec {
            self.reject(format!("{} expectations cannot return an exec result", self.kind));
        }
        self.set_outcome(Outcome::Result(ExecResult::new(last_insert_id, rows_affected)));
        self
    }

    pub fn will_return_rows(mut self, rows: RowSet) -> Self {
        if self.kind != Kind::Query {
            self.reject(format!("{} expectations cannot return rows", self.kind));
        }
        if let Err(err) = rows.validate() {
            self.error.get_or_insert(err);
        }
        self.set_outcome(Outcome::Rows(rows));
        self
    }

    /// Hand `err` back as the call's result instead of a success.
    pub fn will_return_error(mut self, err: DbError) -> Self {
        self.set_outcome(Outcome::Error(err));
        self
    }

    /// Hold the caller for `delay` after the expectation has been consumed.
    pub fn will_delay_for(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Let this expectation match even while earlier ones are pending.
    pub fn any_order(mut self) -> Self {
        self.any_order = true;
        self
    }

    /// Only match calls made while a transaction is open.
    pub fn within_transaction(mut self) -> Self {
        if !self.kind.is_statement() {
            self.reject(format!(
                "{} expectations cannot require a transaction",
                self.kind
            ));
        }
        self.within_tx = true;
        self
    }

    pub fn match_exact(mut self) -> Self {
        self.mode = Some(MatchMode::Exact);
        self
    }

    pub fn match_pattern(mut self) -> Self {
        self.mode = Some(MatchMode::Pattern);
        self
    }

    /// Validate the configuration and append it to the queue, returning its
    /// sequence index.
    pub fn declare(self) -> DbResult<usize> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let mock = self.mock;
        let kind = self.kind;
        let outcome = match self.outcome {
            Some(outcome) => outcome,
            None if kind.is_statement() => {
                return Err(DbError::Configuration(format!(
                    "{kind} {:?} needs a result, rows or an error before it can be declared",
                    self.sql.unwrap_or_default()
                )));
            }
            None => Outcome::Done,
        };
        let (sql, args) = (self.sql, self.args);
        let (any_order, within_tx, delay, mode) =
            (self.any_order, self.within_tx, self.delay, self.mode);

        mock.with_state(|state| {
            if kind == Kind::Close && !state.config.close_expectations {
                return Err(DbError::Configuration(
                    "close expectations are disabled for this connection".into(),
                ));
            }
            let mode = mode.unwrap_or(state.config.match_mode);
            let sql = sql
                .as_deref()
                .map(|sql| SqlMatcher::new(sql, mode))
                .transpose()?;
            let expectation = Expectation {
                index: 0,
                kind,
                sql,
                args: args.map(ArgMatcher::new),
                any_order,
                within_tx,
                delay,
                fulfilled: false,
                outcome: Some(outcome),
            };
            state.queue.declare(expectation, state.closed)
        })
    }

    fn set_outcome(&mut self, outcome: Outcome) {
        if self.outcome.is_some() {
            self.reject(format!("{} expectation already has an outcome", self.kind));
        }
        self.outcome = Some(outcome);
    }

    fn reject(&mut self, reason: String) {
        self.error
            .get_or_insert(DbError::Configuration(reason));
    }
}
