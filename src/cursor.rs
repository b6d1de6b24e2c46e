use std::ops::Index;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::statement::{State, Statement};
use crate::value::Value;

/// A forward-only cursor over the rows of a query.
///
/// A cursor is a view of its statement: closing it leaves the statement
/// prepared and ready to be executed again.
pub struct Cursor<'s, 'c> {
    statement: &'s mut Statement<'c>,
    columns: Arc<[String]>,
    state: Option<State>,
    error: Option<Error>,
}

/// A row.
#[derive(Debug)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

/// A type suitable for indexing columns in a row.
pub trait RowIndex: std::fmt::Debug {
    /// Identify the ordinal position.
    fn index(self, row: &Row) -> Option<usize>;
}

impl<'s, 'c> Cursor<'s, 'c> {
    /// Return column names.
    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Advance to the next row and decode every column into a slot.
    ///
    /// The destination must be as wide as the result. Once the rows are
    /// exhausted, `State::Done` is returned on every further call without
    /// touching the statement.
    pub fn advance(&mut self, row: &mut [Value]) -> Result<State> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        if let Some(State::Done) = self.state {
            return Ok(State::Done);
        }
        if row.len() != self.columns.len() {
            return Err(Error::Width {
                expected: self.columns.len(),
                given: row.len(),
            });
        }
        let state = self.step()?;
        if state == State::Row {
            for (column, value) in row.iter_mut().enumerate() {
                let result = self.statement.read(column);
                *value = self.record(result)?;
            }
        }
        Ok(state)
    }

    /// Release the statement.
    ///
    /// The error that ended the iteration is returned again, even if it was
    /// already returned by `advance`. Iterator adapters that drop errors,
    /// such as `flatten`, therefore cannot hide a failed iteration.
    pub fn close(self) -> Result<()> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn step(&mut self) -> Result<State> {
        let result = self.statement.step();
        let state = self.record(result)?;
        self.state = Some(state);
        Ok(state)
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(error) = &result {
            self.error = Some(error.clone());
        }
        result
    }
}

impl<'s, 'c> Iterator for Cursor<'s, 'c> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.error.is_some() {
            return None;
        }
        let mut values = vec![Value::Null; self.columns.len()];
        match self.advance(&mut values) {
            Ok(State::Row) => Some(Ok(Row {
                columns: self.columns.clone(),
                values,
            })),
            Ok(State::Done) => None,
            Err(error) => Some(Err(error)),
        }
    }
}

impl Row {
    /// Read the value in a column.
    ///
    /// # Panics
    ///
    /// Panics if the column could not be read.
    #[inline]
    #[track_caller]
    pub fn read<'l, T, U>(&'l self, column: U) -> T
    where
        T: TryFrom<&'l Value, Error = Error>,
        U: RowIndex,
    {
        self.try_read(column).unwrap()
    }

    /// Try to read the value in a column.
    pub fn try_read<'l, T, U>(&'l self, column: U) -> Result<T>
    where
        T: TryFrom<&'l Value, Error = Error>,
        U: RowIndex,
    {
        let description = format!("{:?}", column);
        match column.index(self) {
            Some(index) => T::try_from(&self.values[index]),
            None => Err(Error::UnknownColumn(description)),
        }
    }

    /// Return column names.
    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl From<Row> for Vec<Value> {
    #[inline]
    fn from(row: Row) -> Self {
        row.values
    }
}

impl<T> Index<T> for Row
where
    T: RowIndex,
{
    type Output = Value;

    #[track_caller]
    fn index(&self, index: T) -> &Value {
        let description = format!("{:?}", index);
        match index.index(self) {
            Some(index) => &self.values[index],
            None => panic!("unknown column {}", description),
        }
    }
}

impl RowIndex for &str {
    #[inline]
    fn index(self, row: &Row) -> Option<usize> {
        row.columns.iter().position(|column| column == self)
    }
}

impl RowIndex for usize {
    #[inline]
    fn index(self, row: &Row) -> Option<usize> {
        if self < row.values.len() {
            Some(self)
        } else {
            None
        }
    }
}

pub(crate) fn new<'s, 'c>(statement: &'s mut Statement<'c>, columns: Arc<[String]>) -> Cursor<'s, 'c> {
    Cursor {
        statement,
        columns,
        state: None,
        error: None,
    }
}
