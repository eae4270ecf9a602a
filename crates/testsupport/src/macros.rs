//! Test setup macros for reducing boilerplate in mock-driven tests.
//!
//! This module provides declarative macros that simplify common patterns:
//! - Creating a mock connection and declaration handle in one line
//! - Declaring the begin/statements/commit shape of a transaction

/// Creates a mock connection and its declaration handle.
///
/// # Syntax
///
/// ```text
/// mock_db!(conn_var, mock_var)
/// mock_db!(conn_var, mock_var, unordered)
/// mock_db!(conn_var, mock_var, config: expr)
/// ```
///
/// # Examples
///
/// ```
/// use testsupport::mock_db;
/// use sqlmock::Driver;
///
/// mock_db!(conn, mock);
/// mock.expect_begin().declare().unwrap();
/// conn.begin().unwrap();
/// mock.expectations_were_met().unwrap();
/// ```
///
/// ```
/// use testsupport::mock_db;
///
/// mock_db!(conn, mock, unordered);
/// // any pending expectation may match the next call
/// ```
#[macro_export]
macro_rules! mock_db {
    ($conn:ident, $mock:ident) => {
        let ($conn, $mock) = ::sqlmock::new();
    };

    ($conn:ident, $mock:ident, unordered) => {
        let ($conn, $mock) =
            ::sqlmock::new_with(::common::Config::builder().ordered(false).build());
    };

    ($conn:ident, $mock:ident, config: $config:expr) => {
        let ($conn, $mock) = ::sqlmock::new_with($config);
    };
}

/// Declares a begin, one exec per `(pattern => (last_insert_id, rows_affected))`
/// entry, and a commit.
///
/// # Examples
///
/// ```
/// use testsupport::{expect_tx, mock_db};
/// use testsupport::fixtures::record_stats;
///
/// mock_db!(conn, mock);
/// expect_tx!(mock, [
///     "UPDATE products" => (1, 1),
///     "INSERT INTO product_viewers" => (1, 1),
/// ]);
/// record_stats(&conn, 2, 3).unwrap();
/// mock.expectations_were_met().unwrap();
/// ```
#[macro_export]
macro_rules! expect_tx {
    ($mock:expr, [$($sql:expr => ($id:expr, $affected:expr)),* $(,)?]) => {
        $mock.expect_begin().declare().unwrap();
        $(
            $mock
                .expect_exec($sql)
                .will_return_result($id, $affected)
                .declare()
                .unwrap();
        )*
        $mock.expect_commit().declare().unwrap();
    };
}
