//! Deterministic SQL driver stub for testing database-facing code.
//!
//! Tests declare the operations they expect the code under test to perform,
//! hand it a [`MockConnection`], and verify afterwards that every
//! expectation was consumed. Calls that match nothing fail immediately with
//! the same error type a real driver call would return.
//!
//! # Architecture
//!
//! ```text
//! Mock::expect_*() ─► ExpectationBuilder ─► declare() ─► ExpectationQueue
//!                                                            ▲
//! MockConnection::{begin, exec, query, commit, rollback} ────┘ take()
//!                                                            │
//! Mock::expectations_were_met() ◄──── remaining() ───────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use sqlmock::{Driver, args};
//! use types::values;
//!
//! # fn main() -> common::DbResult<()> {
//! let (conn, mock) = sqlmock::new();
//! mock.expect_begin().declare()?;
//! mock.expect_exec("UPDATE products").will_return_result(1, 1).declare()?;
//! mock.expect_exec("INSERT INTO product_viewers")
//!     .with_args(args![2, 3])
//!     .will_return_result(1, 1)
//!     .declare()?;
//! mock.expect_commit().declare()?;
//!
//! let tx = conn.transaction()?;
//! tx.exec("UPDATE products SET views = views + 1", &[])?;
//! tx.exec(
//!     "INSERT INTO product_viewers (user_id, product_id) VALUES (?, ?)",
//!     &values![2, 3],
//! )?;
//! tx.commit()?;
//!
//! mock.expectations_were_met()?;
//! # Ok(())
//! # }
//! ```

mod conn;
mod driver;
mod expectation;
mod matcher;
mod queue;
mod registry;
mod rows;
pub mod verify;

pub use conn::{Mock, MockConnection, new, new_with};
pub use driver::{Driver, Transaction};
pub use expectation::{ExecResult, ExpectationBuilder, Kind};
pub use matcher::{Arg, ArgMatcher, SqlMatcher, normalize};
pub use registry::Registry;
pub use rows::{Column, RowSet, Rows};
pub use verify::PendingExpectation;

/// Convenient re-exports for tests.
pub mod prelude {
    pub use crate::{Arg, Driver, ExecResult, Mock, MockConnection, RowSet, Rows, args};
    pub use common::prelude::*;
}
