#[cfg(test)]
mod tests;

pub mod pretty;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use types::{FromValue, Value};

/// Positional row representation backed by `types::Value`.
/// Examples:
/// - `let row = Row::new(vec![Value::Int(1)]);`
/// - `let row = Row::new(vec![Value::Text("alice".into()), Value::Bool(true)]);`
/// - `let row = Row::new(vec![Value::Int(10), Value::Null]);`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Scan a single column into a typed destination.
    pub fn get<T: FromValue>(&self, idx: usize) -> DbResult<T> {
        let value = self.values.get(idx).ok_or_else(|| {
            DbError::Scan(format!(
                "column index {idx} out of range for row of {} values",
                self.values.len()
            ))
        })?;
        T::from_value(value).ok_or_else(|| {
            DbError::Scan(format!(
                "cannot scan {} value {value} at column {idx} into {}",
                value.type_name(),
                std::any::type_name::<T>()
            ))
        })
    }

    /// Scan the whole row into a tuple of typed destinations.
    ///
    /// ```
    /// use common::Row;
    /// use types::values;
    ///
    /// let row = Row::new(values![1, "Foobar", true]);
    /// let (id, name, searchable): (i64, String, bool) = row.scan().unwrap();
    /// assert_eq!((id, name.as_str(), searchable), (1, "Foobar", true));
    /// ```
    pub fn scan<T: FromRow>(&self) -> DbResult<T> {
        T::from_row(self)
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row::new(values)
    }
}

/// Conversion from a whole row into a Rust value, typically a tuple.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> DbResult<Self>;
}

macro_rules! tuple_from_row {
    ($len:expr; $($t:ident => $idx:tt),+) => {
        impl<$($t: FromValue),+> FromRow for ($($t,)+) {
            fn from_row(row: &Row) -> DbResult<Self> {
                if row.len() != $len {
                    return Err(DbError::Scan(format!(
                        "expected {} destination arguments in scan, row has {} columns",
                        $len,
                        row.len()
                    )));
                }
                Ok(($(row.get::<$t>($idx)?,)+))
            }
        }
    };
}

tuple_from_row!(1; A => 0);
tuple_from_row!(2; A => 0, B => 1);
tuple_from_row!(3; A => 0, B => 1, C => 2);
tuple_from_row!(4; A => 0, B => 1, C => 2, D => 3);
tuple_from_row!(5; A => 0, B => 1, C => 2, D => 3, E => 4);
tuple_from_row!(6; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);

/// Rectangular result set carrying column labels and rows.
/// Examples:
/// - `let rb = RecordBatch { columns: vec!["id".into()], rows: vec![Row::new(vec![Value::Int(1)])] };`
/// - `let rb = RecordBatch { columns: vec!["count".into()], rows: vec![] };`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordBatch {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Canonical error type returned by every mock driver operation.
///
/// `Injected` is not an engine failure: it is the outcome a test configured
/// for a call, handed back so the caller's error path runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    #[error("configuration: {0}")]
    Configuration(String),
    #[error("unexpected call: {0}")]
    UnexpectedCall(String),
    #[error("order violation: call to {call} was not expected, next expectation is {next}")]
    OrderViolation { call: String, next: String },
    #[error("illegal state: {0}")]
    IllegalState(String),
    #[error("connection is closed")]
    ClosedConnection,
    #[error("rows are closed")]
    ClosedRowSet,
    #[error("scan: {0}")]
    Scan(String),
    #[error("no rows in result set")]
    NoRows,
    #[error("canceled while waiting for {0}")]
    Canceled(String),
    #[error("there are {} unfulfilled expectations:\n{}", .0.len(), .0.join("\n"))]
    UnmetExpectations(Vec<String>),
    #[error("{0}")]
    Injected(String),
}

impl DbError {
    /// Build an error a test wants a call to return.
    pub fn injected(message: impl Into<String>) -> Self {
        DbError::Injected(message.into())
    }

    pub fn is_injected(&self) -> bool {
        matches!(self, DbError::Injected(_))
    }

    pub fn is_unexpected_call(&self) -> bool {
        matches!(self, DbError::UnexpectedCall(_))
    }

    pub fn is_order_violation(&self) -> bool {
        matches!(self, DbError::OrderViolation { .. })
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, DbError::Configuration(_))
    }

    /// Descriptions of unfulfilled expectations, if this is a verification failure.
    pub fn unmet(&self) -> Option<&[String]> {
        match self {
            DbError::UnmetExpectations(pending) => Some(pending),
            _ => None,
        }
    }
}

/// Result alias that carries a `DbError`.
pub type DbResult<T> = Result<T, DbError>;

/// How declared SQL is compared against the SQL a caller issues.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    /// Declared SQL is a regular expression searched in the normalized call text.
    #[default]
    Pattern,
    /// Declared SQL must equal the call text after whitespace normalization.
    Exact,
}

/// Runtime configuration for a mock connection.
///
/// # Example
/// ```
/// use common::{Config, MatchMode};
/// use std::time::Duration;
///
/// let config = Config::builder()
///     .ordered(false)
///     .match_mode(MatchMode::Exact)
///     .call_timeout(Duration::from_millis(50))
///     .build();
/// assert!(!config.ordered);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, bon::Builder)]
pub struct Config {
    /// Expectations must be consumed in declared order.
    #[builder(default = true)]
    pub ordered: bool,
    /// Default SQL comparison for exec and query expectations.
    #[builder(default)]
    pub match_mode: MatchMode,
    /// Whether `close()` consumes declared close expectations.
    #[builder(default = false)]
    pub close_expectations: bool,
    /// Upper bound a caller is willing to wait on a delayed outcome.
    pub call_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ordered: true,
            match_mode: MatchMode::Pattern,
            close_expectations: false,
            call_timeout: None,
        }
    }
}

/// Convenient re-exports for downstream crates.
pub mod prelude {
    pub use crate::{Config, DbError, DbResult, FromRow, MatchMode, RecordBatch, Row};
    pub use types::{FromValue, SqlType, Value, values};
}
