//! Driver adapting a dynamically typed SQL interface to [SQLite][1].
//!
//! ## Example
//!
//! Register a driver, open a connection through it, and create a table:
//!
//! ```
//! use sqlite_driver::{Options, Value};
//!
//! sqlite_driver::register(Options::new().with_name("example"));
//! let connection = sqlite_driver::open("example", ":memory:").unwrap();
//!
//! let mut statement = connection
//!     .prepare("CREATE TABLE users (name TEXT, age INTEGER)")
//!     .unwrap();
//! statement.exec(&[]).unwrap();
//! ```
//!
//! Insert a few rows with a prepared statement:
//!
//! ```
//! # use sqlite_driver::{Connection, Value};
//! # let connection = Connection::open(":memory:").unwrap();
//! # let mut statement = connection
//! #     .prepare("CREATE TABLE users (name TEXT, age INTEGER)")
//! #     .unwrap();
//! # statement.exec(&[]).unwrap();
//! let mut statement = connection
//!     .prepare("INSERT INTO users VALUES (?, ?)")
//!     .unwrap();
//! let outcome = statement.exec(&["Alice".into(), 42.into()]).unwrap();
//! assert_eq!(outcome.rows_affected, 1);
//! assert_eq!(outcome.last_insert_id, 1);
//! statement.exec(&["Bob".into(), 69.into()]).unwrap();
//! ```
//!
//! Select rows and process them one by one with a cursor:
//!
//! ```
//! use sqlite_driver::{Connection, State, Value};
//! # let connection = Connection::open(":memory:").unwrap();
//! # connection
//! #     .prepare("CREATE TABLE users (name TEXT, age INTEGER)")
//! #     .unwrap()
//! #     .exec(&[])
//! #     .unwrap();
//! # connection
//! #     .prepare("INSERT INTO users VALUES ('Alice', 42), ('Bob', 69)")
//! #     .unwrap()
//! #     .exec(&[])
//! #     .unwrap();
//!
//! let mut statement = connection
//!     .prepare("SELECT * FROM users WHERE age > ?")
//!     .unwrap();
//! let mut cursor = statement.query(&[50.into()]).unwrap();
//! let mut row = vec![Value::Null; cursor.columns().len()];
//! while let State::Row = cursor.advance(&mut row).unwrap() {
//!     assert_eq!(row[0], Value::String("Bob".into()));
//!     assert_eq!(row[1], Value::Integer(69));
//! }
//! cursor.close().unwrap();
//! ```
//!
//! [1]: https://www.sqlite.org

extern crate sqlite3_sys as ffi;

macro_rules! c_str_to_string(
    ($string:expr) => (
        String::from_utf8_lossy(std::ffi::CStr::from_ptr($string as *const _).to_bytes())
               .into_owned()
    );
);

macro_rules! path_to_cstr(
    ($path:expr) => (
        match $path.to_str() {
            Some(path) => {
                match std::ffi::CString::new(path) {
                    Ok(string) => string,
                    _ => raise!("failed to process a path"),
                }
            }
            _ => raise!("failed to process a path"),
        }
    );
);

macro_rules! str_to_cstr(
    ($string:expr) => (
        match std::ffi::CString::new($string) {
            Ok(string) => string,
            _ => raise!("failed to process a string"),
        }
    );
);

macro_rules! raise(
    ($message:expr) => (
        return Err(crate::Error::InvalidInput(String::from($message)))
    );
);

// Tells SQLite to copy a bound buffer before the bind call returns.
macro_rules! transient(
    () => (std::mem::transmute(!0 as *const libc::c_void))
);

#[cfg(test)]
macro_rules! ok(($result:expr) => ($result.unwrap()));

mod config;
mod connection;
mod cursor;
mod driver;
mod error;
mod statement;
mod value;

pub use config::{Config, JournalMode, Options, DEFAULT_BUSY_TIMEOUT, DEFAULT_NAME};
pub use connection::Connection;
pub use cursor::{Cursor, Row, RowIndex};
pub use driver::{lookup, register, Driver};
pub use error::{Error, ErrorKind, Result, Status};
pub use statement::{Outcome, State, Statement};
pub use value::{values_from_args, Argument, Type, Value};

/// Open a connection through the driver registered under a name.
///
/// Fails with [`Error::UnregisteredDriver`] if no driver has that name.
#[inline]
pub fn open<T: AsRef<std::path::Path>>(driver: &str, path: T) -> Result<Connection> {
    match lookup(driver) {
        Some(driver) => driver.open(path),
        None => Err(Error::UnregisteredDriver {
            name: driver.into(),
        }),
    }
}

/// Return the version number of SQLite.
///
/// For instance, the version `3.8.11.1` corresponds to the integer `3008011`.
#[inline]
pub fn version() -> usize {
    unsafe { ffi::sqlite3_libversion_number() as usize }
}
