//! Property-based test generators using proptest.
//!
//! Provides strategies for values, rows, statement text and whitespace
//! layouts used to exercise the matchers and the ordering rules.

use common::Row;
use proptest::prelude::*;
use types::{SqlType, Value};

/// Strategy for generating random `Value` instances.
///
/// Generates a mix of Int, Text, Bool, and Null values.
pub fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        "[a-z]{1,20}".prop_map(Value::Text),
        any::<bool>().prop_map(Value::Bool),
        Just(Value::Null),
    ]
}

/// Strategy for generating random `Row` instances with a fixed number of columns.
///
/// # Example
///
/// ```
/// use proptest::prelude::*;
/// use testsupport::proptest_generators::arb_row_with_len;
///
/// proptest! {
///     #[test]
///     fn test_fixed_row(row in arb_row_with_len(3)) {
///         assert_eq!(row.values.len(), 3);
///     }
/// }
/// ```
pub fn arb_row_with_len(len: usize) -> impl Strategy<Value = Row> {
    prop::collection::vec(arb_value(), len).prop_map(Row::new)
}

/// Strategy for generating random `SqlType` instances.
pub fn arb_sql_type() -> impl Strategy<Value = SqlType> {
    prop_oneof![Just(SqlType::Int), Just(SqlType::Text), Just(SqlType::Bool),]
}

/// Distinct statement texts, one per requested slot.
pub fn arb_statements(count: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{3,10}", count).prop_map(|tables| {
        tables
            .into_iter()
            .enumerate()
            .map(|(i, table)| format!("UPDATE {table}_{i} SET n = n + 1"))
            .collect()
    })
}

/// Re-layout `sql` with random runs of spaces, tabs and newlines between
/// its words, plus random leading and trailing whitespace.
pub fn arb_whitespace_layout(sql: String) -> impl Strategy<Value = String> {
    let words: Vec<String> = sql.split_whitespace().map(str::to_string).collect();
    let gaps = words.len() + 1;
    prop::collection::vec("[ \t\n]{1,4}", gaps).prop_map(move |seps| {
        let mut out = seps[0].clone();
        for (word, sep) in words.iter().zip(&seps[1..]) {
            out.push_str(word);
            out.push_str(sep);
        }
        out
    })
}
