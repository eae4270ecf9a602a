//! Mock execution context.
//!
//! Bundles a mock connection with its declaration handle so a test can
//! declare, run the code under test, and verify through one value.

use common::{Config, DbResult};
use sqlmock::{Mock, MockConnection};

/// A connection plus the handle that declares and verifies its expectations.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let ctx = MockContext::unordered();
/// ctx.mock().expect_exec("DELETE").will_return_result(0, 2).declare().unwrap();
/// ctx.conn().exec("DELETE FROM sessions", &[]).unwrap();
/// ctx.assert_met();
/// ```
pub struct MockContext {
    conn: MockConnection,
    mock: Mock,
}

impl MockContext {
    /// Ordered matching with regex SQL patterns.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Relaxed ordering: any pending expectation may match.
    pub fn unordered() -> Self {
        Self::with_config(Config::builder().ordered(false).build())
    }

    pub fn with_config(config: Config) -> Self {
        let (conn, mock) = sqlmock::new_with(config);
        Self { conn, mock }
    }

    pub fn conn(&self) -> &MockConnection {
        &self.conn
    }

    pub fn mock(&self) -> &Mock {
        &self.mock
    }

    pub fn verify(&self) -> DbResult<()> {
        self.mock.expectations_were_met()
    }

    /// Panic with the pending listing unless every expectation was consumed.
    pub fn assert_met(&self) {
        if let Err(err) = self.verify() {
            panic!("{err}\n{}", sqlmock::verify::render(&self.mock.remaining()));
        }
    }
}

impl Default for MockContext {
    fn default() -> Self {
        Self::new()
    }
}
