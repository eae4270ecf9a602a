//! Example application code and canned data.
//!
//! The routines here are written purely against [`Driver`], the way
//! production code would be, so tests can run them on a mock connection.

use common::{DbError, DbResult, Row};
use sqlmock::{Driver, RowSet};
use types::{SqlType, Value, values};

/// Record that `user_id` viewed `product_id`: bump the product's view
/// counter and log the viewer inside one transaction.
///
/// Any statement failure rolls the transaction back and is returned to the
/// caller. A failed rollback is only logged.
pub fn record_stats<D: Driver>(db: &D, user_id: i64, product_id: i64) -> DbResult<()> {
    let tx = db.transaction()?;

    let result = tx
        .exec(
            "UPDATE products SET views = views + 1 WHERE id = ?",
            &values![product_id],
        )
        .and_then(|_| {
            tx.exec(
                "INSERT INTO product_viewers (user_id, product_id) VALUES (?, ?)",
                &values![user_id, product_id],
            )
        });

    match result {
        Ok(_) => tx.commit(),
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                tracing::warn!(%rollback_err, %err, "rollback after failed statement also failed");
            }
            Err(err)
        }
    }
}

/// A provider as the lookup query returns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Provider {
    pub id: i64,
    pub name: String,
    pub searchable: bool,
}

/// Look up a provider by name with a single-row query.
pub fn get_provider_by_name<D: Driver>(db: &D, name: &str) -> DbResult<Provider> {
    let row = db.query_row(
        r#"
		SELECT id, name, searchable
		FROM user
		WHERE
			name LIKE $1
	"#,
        &values![name],
    )?;
    let (id, name, searchable): (i64, String, bool) = row.scan()?;
    Ok(Provider {
        id,
        name,
        searchable,
    })
}

/// Row set with the provider columns and one row per provider.
pub fn provider_rows(providers: &[Provider]) -> RowSet {
    providers.iter().fold(
        RowSet::typed([
            ("id", SqlType::Int),
            ("name", SqlType::Text),
            ("searchable", SqlType::Bool),
        ]),
        |set, p| set.add_row(values![p.id, p.name.as_str(), p.searchable]),
    )
}

/// Build a row with integer values.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let row = int_row(&[1, 2, 3]);
/// assert_eq!(row.values.len(), 3);
/// ```
pub fn int_row(values: &[i64]) -> Row {
    Row::new(values.iter().map(|&v| Value::Int(v)).collect())
}

/// Build a row with text values.
pub fn text_row(values: &[&str]) -> Row {
    Row::new(values.iter().map(|&v| Value::from(v)).collect())
}

/// The error the rollback scenario injects into the second statement.
pub fn some_error() -> DbError {
    DbError::injected("some error")
}
