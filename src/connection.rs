use libc::c_int;
use std::marker::PhantomData;
use std::path::Path;
use std::ptr;

use tracing::{debug, warn};

use crate::error::Status;
use crate::{Config, Error, Result, State, Statement, Value};

// The serialized threading mode is the default of most builds, but it is
// requested explicitly: https://www.sqlite.org/threadsafe.html
const OPEN_FLAGS: c_int =
    ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_CREATE | ffi::SQLITE_OPEN_FULLMUTEX;

/// A database connection.
///
/// A connection is driven by one thread at a time. It can be moved to another
/// thread but not shared.
pub struct Connection {
    raw: *mut ffi::sqlite3,
    config: Config,
    phantom: PhantomData<ffi::sqlite3>,
}

unsafe impl Send for Connection {}

impl Connection {
    /// Open a read-write connection to a new or existing database with the
    /// default configuration.
    #[inline]
    pub fn open<T: AsRef<Path>>(path: T) -> Result<Connection> {
        Connection::open_with_config(path, Config::default())
    }

    /// Open a read-write connection and apply the policy of a configuration.
    ///
    /// The busy timeout, the journaling mode, and foreign-key enforcement are
    /// set in that order. If any of them fails, the connection is closed and
    /// [`Error::Policy`] is returned.
    pub fn open_with_config<T: AsRef<Path>>(path: T, config: Config) -> Result<Connection> {
        let path = path.as_ref();
        let mut raw = ptr::null_mut();
        let code = unsafe {
            ffi::sqlite3_open_v2(
                path_to_cstr!(path).as_ptr(),
                &mut raw,
                OPEN_FLAGS,
                ptr::null(),
            )
        };
        if code != ffi::SQLITE_OK {
            let status = Status::last(raw, code);
            if !raw.is_null() {
                let code = unsafe { ffi::sqlite3_close_v2(raw) };
                if code != ffi::SQLITE_OK {
                    config.log(|| warn!(code, "failed to release a connection that did not open"));
                }
            }
            return Err(Error::Open {
                path: path.display().to_string(),
                status,
            });
        }
        config.log(|| debug!(path = %path.display(), driver = config.name(), "opened connection"));
        let connection = Connection {
            raw,
            config,
            phantom: PhantomData,
        };
        connection.apply_policy()?;
        Ok(connection)
    }

    /// Create a prepared statement.
    #[inline]
    pub fn prepare<T: AsRef<str>>(&self, query: T) -> Result<Statement<'_>> {
        crate::statement::new(self, query.as_ref())
    }

    /// Close the connection.
    ///
    /// If SQLite refuses, the error is returned and the handle is released
    /// when the connection is dropped.
    pub fn close(mut self) -> Result<()> {
        let raw = std::mem::replace(&mut self.raw, ptr::null_mut());
        let code = unsafe { ffi::sqlite3_close_v2(raw) };
        if code != ffi::SQLITE_OK {
            let status = Status::last(raw, code);
            self.raw = raw;
            return Err(Error::CloseConnection { status });
        }
        self.config.log(|| debug!(driver = self.config.name(), "closed connection"));
        Ok(())
    }

    /// Return the row identifier of the most recent successful insert.
    #[inline]
    pub fn last_insert_id(&self) -> i64 {
        unsafe { ffi::sqlite3_last_insert_rowid(self.raw) as i64 }
    }

    /// Return the number of rows inserted, updated, or deleted by the most
    /// recent statement.
    #[inline]
    pub fn change_count(&self) -> usize {
        unsafe { ffi::sqlite3_changes(self.raw) as usize }
    }

    /// Return the total number of rows inserted, updated, and deleted by all
    /// statements since the connection was opened.
    #[inline]
    pub fn total_change_count(&self) -> usize {
        unsafe { ffi::sqlite3_total_changes(self.raw) as usize }
    }

    /// Return the configuration the connection was opened with.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Return the raw pointer.
    #[inline]
    pub fn as_raw(&self) -> *mut ffi::sqlite3 {
        self.raw
    }

    /// Execute a statement directly, without binding or reading rows.
    pub(crate) fn execute(&self, query: &str) -> Result<()> {
        let code = unsafe {
            ffi::sqlite3_exec(
                self.raw,
                str_to_cstr!(query).as_ptr(),
                None,
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        if code != ffi::SQLITE_OK {
            return Err(Error::Exec {
                query: query.into(),
                status: Status::last(self.raw, code),
            });
        }
        Ok(())
    }

    // Pragmas do not accept bound parameters, so values are interpolated.
    fn apply_policy(&self) -> Result<()> {
        for (pragma, value) in self.config.pragmas() {
            self.config.log(|| debug!(pragma, value = %value, "setting pragma"));
            let query = format!("PRAGMA {} = {}", pragma, value);
            let result = match pragma {
                "journal_mode" => self.apply_journal_mode(&query, &value),
                _ => self.execute(&query),
            };
            result.map_err(|error| Error::Policy {
                pragma,
                source: Box::new(error),
            })?;
        }
        Ok(())
    }

    // SQLite answers with the mode it ended up in, which differs from the
    // requested one for in-memory databases, for instance.
    fn apply_journal_mode(&self, query: &str, requested: &str) -> Result<()> {
        let mut statement = self.prepare(query)?;
        let mut cursor = statement.query(&[])?;
        let mut row = [Value::Null];
        if cursor.advance(&mut row)? == State::Row {
            if let Value::String(applied) = &row[0] {
                if !applied.eq_ignore_ascii_case(requested) {
                    self.config.log(|| {
                        warn!(requested, applied = %applied, "journal mode not applied")
                    });
                }
            }
        }
        cursor.close()
    }
}

impl Drop for Connection {
    #[inline]
    fn drop(&mut self) {
        if self.raw.is_null() {
            return;
        }
        let code = unsafe { ffi::sqlite3_close_v2(self.raw) };
        if code != ffi::SQLITE_OK {
            self.config.log(|| warn!(code, "failed to close connection on drop"));
        }
    }
}
