use libc::{c_double, c_int};
use std::cell::OnceCell;
use std::ptr;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{ErrorKind, Status};
use crate::{Connection, Cursor, Error, Result, Value};

/// A prepared statement.
///
/// A statement borrows the connection it was prepared on, so it cannot
/// outlive it.
pub struct Statement<'c> {
    raw: *mut ffi::sqlite3_stmt,
    connection: &'c Connection,
    query: String,
    columns: OnceCell<Arc<[String]>>,
}

/// A state of a prepared statement.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    /// There is a row available for reading.
    Row,
    /// The statement has been entirely evaluated.
    Done,
}

/// The outcome of executing a statement for its effect.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Outcome {
    /// The number of rows inserted, updated, or deleted.
    pub rows_affected: i64,
    /// The row identifier of the most recent successful insert on the
    /// connection.
    pub last_insert_id: i64,
}

impl<'c> Statement<'c> {
    /// Return the number of placeholders.
    #[inline]
    pub fn parameter_count(&self) -> usize {
        unsafe { ffi::sqlite3_bind_parameter_count(self.raw) as usize }
    }

    /// Return the number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        unsafe { ffi::sqlite3_column_count(self.raw) as usize }
    }

    /// Return column names.
    ///
    /// The names are read once and cached. A name SQLite cannot determine is
    /// returned as an empty string.
    pub fn column_names(&self) -> &[String] {
        self.columns()
    }

    /// Return the query the statement was prepared from.
    #[inline]
    pub fn query_text(&self) -> &str {
        &self.query
    }

    /// Bind values and execute the statement for its effect.
    ///
    /// The statement is stepped once; a produced row is discarded. The
    /// affected-row count and the last insert identifier are read from the
    /// connection right after the step.
    pub fn exec(&mut self, values: &[Value]) -> Result<Outcome> {
        self.bind(values)?;
        match unsafe { ffi::sqlite3_step(self.raw) } {
            ffi::SQLITE_DONE | ffi::SQLITE_ROW => {}
            code => {
                return Err(Error::Exec {
                    query: self.query.clone(),
                    status: self.status(code),
                })
            }
        }
        let outcome = Outcome {
            rows_affected: self.connection.change_count() as i64,
            last_insert_id: self.connection.last_insert_id(),
        };
        self.reset();
        Ok(outcome)
    }

    /// Bind values and start a query.
    ///
    /// Nothing is stepped until the cursor is advanced.
    pub fn query(&mut self, values: &[Value]) -> Result<Cursor<'_, 'c>> {
        self.bind(values)?;
        let columns = self.columns().clone();
        Ok(crate::cursor::new(self, columns))
    }

    /// Finalize the statement.
    pub fn close(mut self) -> Result<()> {
        let raw = std::mem::replace(&mut self.raw, ptr::null_mut());
        let code = unsafe { ffi::sqlite3_finalize(raw) };
        if code != ffi::SQLITE_OK {
            return Err(Error::CloseStatement {
                query: self.query.clone(),
                status: self.status(code),
            });
        }
        Ok(())
    }

    /// Take a step.
    pub(crate) fn step(&mut self) -> Result<State> {
        match unsafe { ffi::sqlite3_step(self.raw) } {
            ffi::SQLITE_ROW => Ok(State::Row),
            ffi::SQLITE_DONE => Ok(State::Done),
            code => Err(Error::Row {
                query: self.query.clone(),
                status: self.status(code),
            }),
        }
    }

    /// Read the value of a column of the current row.
    ///
    /// Text and binary data are copied out, as SQLite only keeps them until
    /// the next step.
    pub(crate) fn read(&self, column: usize) -> Result<Value> {
        let index = column as c_int;
        unsafe {
            match ffi::sqlite3_column_type(self.raw, index) {
                ffi::SQLITE_INTEGER => Ok(Value::Integer(
                    ffi::sqlite3_column_int64(self.raw, index) as i64,
                )),
                ffi::SQLITE_FLOAT => Ok(Value::Float(
                    ffi::sqlite3_column_double(self.raw, index) as f64,
                )),
                ffi::SQLITE_TEXT => Ok(match String::from_utf8(self.read_bytes(index)) {
                    Ok(value) => Value::String(value),
                    Err(error) => Value::Binary(error.into_bytes()),
                }),
                ffi::SQLITE_BLOB => Ok(Value::Binary(self.read_bytes(index))),
                ffi::SQLITE_NULL => Ok(Value::Null),
                code => Err(Error::Decode {
                    query: self.query.clone(),
                    column,
                    code: code as i32,
                }),
            }
        }
    }

    unsafe fn read_bytes(&self, index: c_int) -> Vec<u8> {
        let pointer = ffi::sqlite3_column_blob(self.raw, index) as *const u8;
        let count = ffi::sqlite3_column_bytes(self.raw, index);
        if pointer.is_null() || count <= 0 {
            return Vec::new();
        }
        std::slice::from_raw_parts(pointer, count as usize).to_vec()
    }

    fn columns(&self) -> &Arc<[String]> {
        self.columns.get_or_init(|| {
            (0..self.column_count())
                .map(|column| unsafe {
                    let name = ffi::sqlite3_column_name(self.raw, column as c_int);
                    if name.is_null() {
                        String::new()
                    } else {
                        c_str_to_string!(name)
                    }
                })
                .collect()
        })
    }

    // Values are checked against the placeholders before anything is bound,
    // so a mismatch leaves the previous bindings untouched.
    fn bind(&mut self, values: &[Value]) -> Result<()> {
        self.reset();
        let expected = self.parameter_count();
        if values.len() != expected {
            return Err(Error::ArgumentCount {
                query: self.query.clone(),
                expected,
                given: values.len(),
                position: values.len().min(expected),
            });
        }
        for (position, value) in values.iter().enumerate() {
            let index = (position + 1) as c_int;
            let code = unsafe {
                match *value {
                    Value::Null => ffi::sqlite3_bind_null(self.raw, index),
                    Value::Boolean(value) => {
                        ffi::sqlite3_bind_int64(self.raw, index, value as ffi::sqlite3_int64)
                    }
                    Value::Integer(value) => {
                        ffi::sqlite3_bind_int64(self.raw, index, value as ffi::sqlite3_int64)
                    }
                    Value::Float(value) => {
                        ffi::sqlite3_bind_double(self.raw, index, value as c_double)
                    }
                    Value::Binary(ref value) => match c_int::try_from(value.len()) {
                        Ok(length) => ffi::sqlite3_bind_blob(
                            self.raw,
                            index,
                            value.as_ptr() as *const _,
                            length,
                            transient!(),
                        ),
                        Err(_) => ffi::SQLITE_TOOBIG,
                    },
                    Value::String(ref value) => match c_int::try_from(value.len()) {
                        Ok(length) => ffi::sqlite3_bind_text(
                            self.raw,
                            index,
                            value.as_ptr() as *const _,
                            length,
                            transient!(),
                        ),
                        Err(_) => ffi::SQLITE_TOOBIG,
                    },
                }
            };
            if code != ffi::SQLITE_OK {
                return Err(Error::Bind {
                    query: self.query.clone(),
                    position,
                    kind: value.kind(),
                    status: self.status(code),
                });
            }
        }
        Ok(())
    }

    // A failed evaluation makes the following reset report the same failure,
    // which has already been returned to the caller.
    fn reset(&mut self) {
        let code = unsafe { ffi::sqlite3_reset(self.raw) };
        if code != ffi::SQLITE_OK {
            let status = self.status(code);
            self.connection.config().log(|| {
                debug!(query = %self.query, %status, "reset after failed evaluation")
            });
        }
    }

    fn status(&self, code: c_int) -> Status {
        Status::last(self.connection.as_raw(), code)
    }
}

impl<'c> Drop for Statement<'c> {
    #[inline]
    fn drop(&mut self) {
        if !self.raw.is_null() {
            unsafe { ffi::sqlite3_finalize(self.raw) };
        }
    }
}

pub(crate) fn new<'c>(connection: &'c Connection, query: &str) -> Result<Statement<'c>> {
    let mut raw = ptr::null_mut();
    let code = unsafe {
        ffi::sqlite3_prepare_v2(
            connection.as_raw(),
            str_to_cstr!(query).as_ptr(),
            -1,
            &mut raw,
            ptr::null_mut(),
        )
    };
    if code != ffi::SQLITE_OK {
        return Err(Error::Prepare {
            query: query.into(),
            status: Status::last(connection.as_raw(), code),
        });
    }
    if raw.is_null() {
        return Err(Error::Prepare {
            query: query.into(),
            status: Status {
                kind: ErrorKind::Misuse,
                code: ffi::SQLITE_MISUSE,
                message: String::from("query contains no statement"),
            },
        });
    }
    connection
        .config()
        .log(|| trace!(query, "prepared statement"));
    Ok(Statement {
        raw,
        connection,
        query: query.into(),
        columns: OnceCell::new(),
    })
}
