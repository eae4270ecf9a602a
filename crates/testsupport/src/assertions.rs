//! Custom assertion helpers for testing.
//!
//! Provides specialized assertion functions for driver errors, row cursors,
//! and expectation verification.

use common::{DbError, DbResult, Row};
use sqlmock::{Mock, Rows};
use types::Value;

/// Assert that a cursor returns a specific row next.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let (conn, mock) = sqlmock::new();
/// mock.expect_query("SELECT").will_return_rows(RowSet::new(["id"]).add_row(values![1])).declare().unwrap();
/// let mut rows = conn.query("SELECT id FROM t", &[]).unwrap();
/// assert_next_row(&mut rows, &[Value::Int(1)]);
/// assert_exhausted(&mut rows);
/// ```
pub fn assert_next_row(rows: &mut Rows, expected: &[Value]) {
    let row = rows
        .next()
        .expect("rows next failed")
        .expect("expected row but got None");
    assert_eq!(
        &row.values, expected,
        "Row mismatch: expected {:?}, got {:?}",
        expected, row.values
    );
}

/// Assert that a cursor is exhausted (returns None).
pub fn assert_exhausted(rows: &mut Rows) {
    let result = rows.next().expect("rows next failed");
    assert!(
        result.is_none(),
        "Expected rows to be exhausted, but got row: {:?}",
        result
    );
}

/// Assert that an operation returns an error containing a specific substring.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let result: DbResult<()> = Err(DbError::injected("some error"));
/// assert_error_contains(result, "some error");
/// ```
pub fn assert_error_contains<T>(result: DbResult<T>, expected_msg: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}', but got Ok", expected_msg),
        Err(e) => {
            let error_string = e.to_string();
            assert!(
                error_string.contains(expected_msg),
                "Expected error to contain '{}', but got: {}",
                expected_msg,
                error_string
            );
        }
    }
}

/// Assert that a call was rejected because nothing matched it.
pub fn assert_unexpected_call<T>(result: DbResult<T>) {
    match result {
        Ok(_) => panic!("Expected unexpected-call error, but got Ok"),
        Err(DbError::UnexpectedCall(_)) => {}
        Err(other) => panic!("Expected unexpected-call error, but got: {}", other),
    }
}

/// Assert that a call was rejected for arriving out of declared order.
pub fn assert_order_violation<T>(result: DbResult<T>) {
    match result {
        Ok(_) => panic!("Expected order violation, but got Ok"),
        Err(DbError::OrderViolation { .. }) => {}
        Err(other) => panic!("Expected order violation, but got: {}", other),
    }
}

/// Assert that verification fails listing exactly `expected`, in order.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let (_conn, mock) = sqlmock::new();
/// mock.expect_begin().declare().unwrap();
/// assert_unmet(&mock, &["#1 Begin"]);
/// ```
pub fn assert_unmet(mock: &Mock, expected: &[&str]) {
    match mock.expectations_were_met() {
        Ok(()) => panic!("Expected unmet expectations {:?}, but all were met", expected),
        Err(err) => {
            let pending = err
                .unmet()
                .unwrap_or_else(|| panic!("Expected unmet expectations, but got: {}", err));
            pretty_assertions::assert_eq!(pending, expected);
        }
    }
}

/// Assert that two vectors of rows are equal.
///
/// This compares both length and contents of the row vectors.
pub fn assert_row_sets_equal(actual: &[Row], expected: &[Row]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Row count mismatch: expected {} rows, got {}",
        expected.len(),
        actual.len()
    );

    for (i, (actual_row, expected_row)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(
            actual_row.values, expected_row.values,
            "Row {} mismatch:\nExpected: {:?}\nActual:   {:?}",
            i, expected_row.values, actual_row.values
        );
    }
}
