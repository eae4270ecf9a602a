//! SQL text and bound-argument matching.
//!
//! Both matchers are pure: they never touch queue state and can be evaluated
//! any number of times against the same call.

use common::{DbError, DbResult, MatchMode, pretty};
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use types::Value;

/// Collapse every run of whitespace into a single space and trim the ends.
///
/// ```
/// assert_eq!(
///     sqlmock::normalize("\n  SELECT id\n\tFROM user  "),
///     "SELECT id FROM user"
/// );
/// ```
pub fn normalize(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compares invocation SQL against the text an expectation declared.
#[derive(Clone, Debug)]
pub enum SqlMatcher {
    /// Normalized text that the normalized call must equal.
    Exact(String),
    /// Regular expression searched for in the normalized call.
    Pattern(Regex),
}

impl SqlMatcher {
    /// Build a matcher, compiling the pattern up front so a malformed
    /// expression fails the declaration rather than a later call.
    pub fn new(sql: &str, mode: MatchMode) -> DbResult<Self> {
        match mode {
            MatchMode::Exact => Ok(SqlMatcher::Exact(normalize(sql))),
            MatchMode::Pattern => Regex::new(sql).map(SqlMatcher::Pattern).map_err(|e| {
                DbError::Configuration(format!("could not compile SQL pattern {sql:?}: {e}"))
            }),
        }
    }

    /// `normalized` must already have gone through [`normalize`].
    pub fn matches(&self, normalized: &str) -> bool {
        match self {
            SqlMatcher::Exact(expected) => expected == normalized,
            SqlMatcher::Pattern(re) => re.is_match(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SqlMatcher::Exact(expected) => expected,
            SqlMatcher::Pattern(re) => re.as_str(),
        }
    }
}

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// One expected positional argument.
#[derive(Clone)]
pub enum Arg {
    Literal(Value),
    Predicate(Predicate),
}

impl Arg {
    /// Accept whatever value is bound at this position.
    pub fn any() -> Self {
        Arg::predicate(|_| true)
    }

    /// Accept values for which `f` returns true.
    ///
    /// Predicates run while the connection's state is locked, so they must
    /// not call back into the [`Mock`](crate::Mock) or the connection.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Arg::Predicate(Arc::new(f))
    }

    pub fn matches(&self, actual: &Value) -> bool {
        match self {
            Arg::Literal(expected) => expected == actual,
            Arg::Predicate(f) => f(actual),
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Arg::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Literal(v) => write!(f, "{v}"),
            Arg::Predicate(_) => f.write_str("<predicate>"),
        }
    }
}

macro_rules! arg_from {
    ($($t:ty),+) => {
        $(
            impl From<$t> for Arg {
                fn from(v: $t) -> Self {
                    Arg::Literal(Value::from(v))
                }
            }
        )+
    };
}

arg_from!(i8, i16, i32, i64, u8, u16, u32, bool, &str, String);

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Literal(v)
    }
}

/// Positional matcher over every bound argument of a call.
#[derive(Clone, Debug, Default)]
pub struct ArgMatcher {
    expected: Vec<Arg>,
}

impl ArgMatcher {
    pub fn new(expected: Vec<Arg>) -> Self {
        Self { expected }
    }

    pub fn matches(&self, actual: &[Value]) -> bool {
        self.expected.len() == actual.len()
            && self
                .expected
                .iter()
                .zip(actual)
                .all(|(arg, value)| arg.matches(value))
    }
}

impl fmt::Display for ArgMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.expected.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", rendered.join(", "))
    }
}

/// Render bound call arguments the same way expected arguments print.
pub(crate) fn render_args(actual: &[Value]) -> String {
    format!("[{}]", pretty::format_values(actual))
}

/// Build a `Vec<Arg>` from heterogeneous literals and predicates.
///
/// ```
/// use sqlmock::{args, Arg};
///
/// let expected = args![2, "Foobar", Arg::any()];
/// assert_eq!(expected.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => { ::std::vec::Vec::<$crate::Arg>::new() };
    ($($a:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::from($a)),+]
    };
}
