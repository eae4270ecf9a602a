//! The driver contract code under test is written against.

use crate::expectation::ExecResult;
use crate::rows::Rows;
use common::{DbError, DbResult, Row};
use types::Value;

/// Connection-level operations of a SQL driver.
///
/// Application code that takes `&impl Driver` can be exercised against a
/// [`MockConnection`](crate::MockConnection) in tests.
pub trait Driver {
    fn begin(&self) -> DbResult<()>;
    fn exec(&self, sql: &str, args: &[Value]) -> DbResult<ExecResult>;
    fn query(&self, sql: &str, args: &[Value]) -> DbResult<Rows>;
    fn commit(&self) -> DbResult<()>;
    fn rollback(&self) -> DbResult<()>;
    fn close(&self) -> DbResult<()>;

    /// First row of a query; `NoRows` when the set is empty.
    fn query_row(&self, sql: &str, args: &[Value]) -> DbResult<Row> {
        let mut rows = self.query(sql, args)?;
        let row = rows.next()?;
        rows.close()?;
        row.ok_or(DbError::NoRows)
    }

    /// Begin a transaction and return a guard scoped to it.
    fn transaction(&self) -> DbResult<Transaction<'_, Self>>
    where
        Self: Sized,
    {
        self.begin()?;
        Ok(Transaction {
            driver: self,
            finished: false,
        })
    }
}

/// An open transaction on a [`Driver`].
///
/// Dropping it without `commit` or `rollback` leaves the transaction open on
/// the connection.
#[must_use = "a transaction must be committed or rolled back"]
pub struct Transaction<'c, D: Driver> {
    driver: &'c D,
    finished: bool,
}

impl<D: Driver> Transaction<'_, D> {
    pub fn exec(&self, sql: &str, args: &[Value]) -> DbResult<ExecResult> {
        self.driver.exec(sql, args)
    }

    pub fn query(&self, sql: &str, args: &[Value]) -> DbResult<Rows> {
        self.driver.query(sql, args)
    }

    pub fn query_row(&self, sql: &str, args: &[Value]) -> DbResult<Row> {
        self.driver.query_row(sql, args)
    }

    pub fn commit(mut self) -> DbResult<()> {
        self.finished = true;
        self.driver.commit()
    }

    pub fn rollback(mut self) -> DbResult<()> {
        self.finished = true;
        self.driver.rollback()
    }
}

impl<D: Driver> Drop for Transaction<'_, D> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!("transaction dropped without commit or rollback");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Driver, RowSet, new};
    use common::DbError;
    use types::values;

    #[test]
    fn transaction_guard_commits() {
        let (conn, mock) = new();
        mock.expect_begin().declare().unwrap();
        mock.expect_exec("DELETE FROM carts").will_return_result(0, 4).declare().unwrap();
        mock.expect_commit().declare().unwrap();

        let tx = conn.transaction().unwrap();
        assert!(conn.in_transaction());
        assert_eq!(tx.exec("DELETE FROM carts", &[]).unwrap().rows_affected(), 4);
        tx.commit().unwrap();
        assert!(!conn.in_transaction());
        mock.expectations_were_met().unwrap();
    }

    #[test]
    fn query_row_on_empty_set_is_no_rows() {
        let (conn, mock) = new();
        mock.expect_query("SELECT")
            .will_return_rows(RowSet::new(["id"]))
            .declare()
            .unwrap();
        assert_eq!(conn.query_row("SELECT id FROM t", &[]).unwrap_err(), DbError::NoRows);
    }

    #[test]
    fn query_row_surfaces_close_error() {
        let (conn, mock) = new();
        mock.expect_query("SELECT")
            .will_return_rows(
                RowSet::new(["id"])
                    .add_row(values![1])
                    .close_error(DbError::injected("close failed")),
            )
            .declare()
            .unwrap();
        let err = conn.query_row("SELECT id FROM t", &[]).unwrap_err();
        assert_eq!(err.to_string(), "close failed");
    }
}
