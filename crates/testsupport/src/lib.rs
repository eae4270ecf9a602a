//! Test support utilities for code written against the `sqlmock` driver.
//!
//! This crate provides:
//! - A ready-made mock context bundling a connection with its declarations
//! - Example application routines (the code a mock typically stands in under)
//! - Assertion helpers for driver errors, rows, and verification
//! - Property-based generators for values, rows, and SQL layouts
//! - Setup macros
//!
//! # Example Usage
//!
//! ```
//! use testsupport::prelude::*;
//!
//! let ctx = MockContext::new();
//! ctx.mock().expect_begin().declare().unwrap();
//! ctx.mock().expect_exec("UPDATE products").will_return_result(1, 1).declare().unwrap();
//! ctx.mock()
//!     .expect_exec("INSERT INTO product_viewers")
//!     .with_args(args![2, 3])
//!     .will_return_result(1, 1)
//!     .declare()
//!     .unwrap();
//! ctx.mock().expect_commit().declare().unwrap();
//!
//! record_stats(ctx.conn(), 2, 3).unwrap();
//! ctx.assert_met();
//! ```

pub mod assertions;
pub mod context;
pub mod fixtures;
pub mod macros;
pub mod proptest_generators;

/// Convenient re-exports for common testing patterns.
pub mod prelude {
    pub use crate::assertions::*;
    pub use crate::context::*;
    pub use crate::fixtures::*;
    pub use sqlmock::prelude::*;
}
