//! DSN-keyed lookup for frameworks that open connections by name.
//!
//! A registry is an ordinary value owned by the test; dropping it forgets
//! every connection it handed out names for.

use crate::conn::{Mock, MockConnection, new_with};
use common::{Config, DbError, DbResult};
use hashbrown::HashMap;
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct Registry {
    conns: Mutex<HashMap<String, MockConnection>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock connection under `dsn` and return its declaration handle.
    pub fn register(&self, dsn: impl Into<String>, config: Config) -> DbResult<Mock> {
        let dsn = dsn.into();
        let mut conns = self.conns.lock();
        if conns.contains_key(&dsn) {
            return Err(DbError::Configuration(format!(
                "a mock connection is already registered as {dsn:?}"
            )));
        }
        let (conn, mock) = new_with(config);
        tracing::debug!(%dsn, "registered mock connection");
        conns.insert(dsn, conn);
        Ok(mock)
    }

    /// Look up the connection registered as `dsn`.
    pub fn open(&self, dsn: &str) -> DbResult<MockConnection> {
        self.conns
            .lock()
            .get(dsn)
            .cloned()
            .ok_or_else(|| DbError::Configuration(format!("no mock connection registered as {dsn:?}")))
    }

    pub fn deregister(&self, dsn: &str) -> Option<MockConnection> {
        self.conns.lock().remove(dsn)
    }

    pub fn len(&self) -> usize {
        self.conns.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
