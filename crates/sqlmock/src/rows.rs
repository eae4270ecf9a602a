//! Declared row sets and the forward-only cursor handed to callers.

use common::pretty::{self, TableStyleKind};
use common::{DbError, DbResult, RecordBatch, Row};
use std::collections::BTreeMap;
use std::fmt;
use types::{SqlType, Value};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Semantic type values are decoded into when read; `None` keeps the
    /// stored representation.
    pub ty: Option<SqlType>,
}

/// Rows a query expectation returns, built fluently during test setup.
///
/// Width problems are recorded rather than panicking and surface as a
/// configuration error when the set is bound to an expectation.
///
/// ```
/// use sqlmock::RowSet;
/// use types::values;
///
/// let rows = RowSet::new(["id", "name", "searchable"])
///     .add_row(values![1, "Foobar", true]);
/// assert_eq!(rows.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct RowSet {
    columns: Vec<Column>,
    rows: Vec<Row>,
    row_errors: BTreeMap<usize, DbError>,
    close_error: Option<DbError>,
    invalid: Option<String>,
}

impl RowSet {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<Column> = columns
            .into_iter()
            .map(|name| Column {
                name: name.into(),
                ty: None,
            })
            .collect();
        let mut set = Self {
            columns,
            rows: Vec::new(),
            row_errors: BTreeMap::new(),
            close_error: None,
            invalid: None,
        };
        set.check_unique_columns();
        set
    }

    /// Declare columns together with the type each is decoded as.
    pub fn typed<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, SqlType)>,
        S: Into<String>,
    {
        let (names, types): (Vec<String>, Vec<SqlType>) = columns
            .into_iter()
            .map(|(name, ty)| (name.into(), ty))
            .unzip();
        Self::new(names).column_types(types)
    }

    /// Assign semantic types positionally to the declared columns.
    pub fn column_types<I>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = SqlType>,
    {
        let types: Vec<SqlType> = types.into_iter().collect();
        if types.len() != self.columns.len() {
            self.invalidate(format!(
                "{} column types given for {} columns",
                types.len(),
                self.columns.len()
            ));
            return self;
        }
        for (column, ty) in self.columns.iter_mut().zip(types) {
            column.ty = Some(ty);
        }
        self
    }

    pub fn add_row(mut self, values: Vec<Value>) -> Self {
        if values.len() != self.columns.len() {
            self.invalidate(format!(
                "row {} has {} values but {} columns were declared",
                self.rows.len(),
                values.len(),
                self.columns.len()
            ));
            return self;
        }
        self.rows.push(Row::new(values));
        self
    }

    pub fn add_rows<I>(self, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        rows.into_iter().fold(self, RowSet::add_row)
    }

    /// Make the cursor fail with `err` when it reaches row `index`.
    pub fn row_error(mut self, index: usize, err: DbError) -> Self {
        self.row_errors.insert(index, err);
        self
    }

    /// Make the first `close()` of the cursor return `err`.
    pub fn close_error(mut self, err: DbError) -> Self {
        self.close_error = Some(err);
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn validate(&self) -> DbResult<()> {
        match &self.invalid {
            Some(reason) => Err(DbError::Configuration(format!("invalid row set: {reason}"))),
            None => Ok(()),
        }
    }

    pub(crate) fn into_cursor(self) -> Rows {
        Rows {
            columns: self.columns,
            rows: self.rows.into_iter(),
            pos: 0,
            row_errors: self.row_errors,
            close_error: self.close_error,
            exhausted: false,
            closed: false,
        }
    }

    fn check_unique_columns(&mut self) {
        let duplicate = self
            .columns
            .iter()
            .enumerate()
            .find(|(i, column)| self.columns[..*i].iter().any(|c| c.name == column.name))
            .map(|(_, column)| column.name.clone());
        if let Some(name) = duplicate {
            self.invalidate(format!("duplicate column name {name:?}"));
        }
    }

    fn invalidate(&mut self, reason: String) {
        // first problem wins
        self.invalid.get_or_insert(reason);
    }
}

impl From<&RowSet> for RecordBatch {
    fn from(set: &RowSet) -> Self {
        RecordBatch {
            columns: set.columns.iter().map(|c| c.name.clone()).collect(),
            rows: set.rows.clone(),
        }
    }
}

impl fmt::Display for RowSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let batch = RecordBatch::from(self);
        f.write_str(&pretty::render_record_batch(&batch, TableStyleKind::Ascii))
    }
}

/// Forward-only cursor over the rows of a matched query expectation.
///
/// Not shareable between threads for advancement; every read takes
/// `&mut self`.
#[derive(Debug)]
pub struct Rows {
    columns: Vec<Column>,
    rows: std::vec::IntoIter<Row>,
    pos: usize,
    row_errors: BTreeMap<usize, DbError>,
    close_error: Option<DbError>,
    exhausted: bool,
    closed: bool,
}

impl Rows {
    pub fn columns(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Advance to the next row, decoding each value into its column type.
    ///
    /// Returns `Ok(None)` once the set is exhausted. An injected row error
    /// ends iteration after it is returned.
    pub fn next(&mut self) -> DbResult<Option<Row>> {
        if self.closed {
            return Err(DbError::ClosedRowSet);
        }
        if self.exhausted {
            return Ok(None);
        }
        if let Some(err) = self.row_errors.remove(&self.pos) {
            self.exhausted = true;
            return Err(err);
        }
        let Some(row) = self.rows.next() else {
            self.exhausted = true;
            return Ok(None);
        };
        tracing::trace!(pos = self.pos, "advancing mock rows");
        self.pos += 1;
        self.decode(row).map(Some)
    }

    /// Release the cursor. Only the first call can return an injected
    /// close error.
    pub fn close(&mut self) -> DbResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.close_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Drain the remaining rows and close the cursor.
    pub fn collect_rows(mut self) -> DbResult<Vec<Row>> {
        let mut out = Vec::new();
        while let Some(row) = self.next()? {
            out.push(row);
        }
        self.close()?;
        Ok(out)
    }

    /// Value of `name` in `row`, scanned into `T`.
    pub fn get_by_name<T: types::FromValue>(&self, row: &Row, name: &str) -> DbResult<T> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| DbError::Scan(format!("no column named {name:?}")))?;
        row.get(idx)
    }

    fn decode(&self, row: Row) -> DbResult<Row> {
        let values = row
            .into_values()
            .into_iter()
            .zip(&self.columns)
            .map(|(value, column)| match column.ty {
                None => Ok(value),
                Some(ty) => value.coerce_to(ty).ok_or_else(|| {
                    DbError::Scan(format!(
                        "cannot decode {value} in column {:?} as {ty}",
                        column.name
                    ))
                }),
            })
            .collect::<DbResult<Vec<_>>>()?;
        Ok(Row::new(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use types::values;

    #[test]
    fn cursor_yields_rows_then_end() {
        let mut rows = RowSet::new(["id"])
            .add_rows([values![1], values![2]])
            .into_cursor();
        assert_eq!(rows.next().unwrap(), Some(Row::new(values![1])));
        assert_eq!(rows.next().unwrap(), Some(Row::new(values![2])));
        assert_eq!(rows.next().unwrap(), None);
        assert_eq!(rows.next().unwrap(), None);
    }

    #[test]
    fn next_after_close_fails() {
        let mut rows = RowSet::new(["id"]).add_row(values![1]).into_cursor();
        rows.close().unwrap();
        rows.close().unwrap();
        assert_eq!(rows.next().unwrap_err(), DbError::ClosedRowSet);
    }

    #[test]
    fn typed_columns_decode_stored_text() {
        let mut rows = RowSet::typed([("id", SqlType::Int), ("searchable", SqlType::Bool)])
            .add_row(values!["7", "true"])
            .into_cursor();
        let (id, searchable): (i64, bool) = rows.next().unwrap().unwrap().scan().unwrap();
        assert_eq!((id, searchable), (7, true));
    }

    #[test]
    fn undecodable_value_is_a_scan_error() {
        let mut rows = RowSet::typed([("flag", SqlType::Bool)])
            .add_row(values!["maybe"])
            .into_cursor();
        assert!(matches!(rows.next(), Err(DbError::Scan(_))));
    }

    #[test]
    fn width_mismatch_invalidates_the_set() {
        let set = RowSet::new(["id", "name"]).add_row(values![1]);
        assert!(set.validate().unwrap_err().is_configuration());
        assert!(set.is_empty());
    }

    #[test]
    fn duplicate_columns_invalidate_the_set() {
        let set = RowSet::new(["id", "id"]);
        assert!(set.validate().is_err());
    }

    #[test]
    fn row_error_stops_iteration() {
        let mut rows = RowSet::new(["id"])
            .add_rows([values![1], values![2]])
            .row_error(1, DbError::injected("row fail"))
            .into_cursor();
        assert!(rows.next().unwrap().is_some());
        assert_eq!(rows.next().unwrap_err(), DbError::injected("row fail"));
        assert_eq!(rows.next().unwrap(), None);
    }

    #[test]
    fn close_error_is_returned_once() {
        let mut rows = RowSet::new(["id"])
            .close_error(DbError::injected("close fail"))
            .into_cursor();
        assert!(rows.close().is_err());
        assert!(rows.close().is_ok());
    }

    #[test]
    fn lookup_by_column_name() {
        let mut rows = RowSet::new(["id", "name"])
            .add_row(values![1, "Ada"])
            .into_cursor();
        let row = rows.next().unwrap().unwrap();
        let name: String = rows.get_by_name(&row, "name").unwrap();
        assert_eq!(name, "Ada");
        assert!(rows.get_by_name::<String>(&row, "missing").is_err());
    }

    #[test]
    fn display_renders_a_table() {
        let set = RowSet::new(["id", "name"]).add_row(values![1, "Ada"]);
        let rendered = set.to_string();
        assert!(rendered.contains("name"));
        assert!(rendered.contains("'Ada'"));
    }
}
