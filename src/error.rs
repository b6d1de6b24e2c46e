use libc::c_int;
use std::fmt::{self, Display, Formatter};

use crate::ffi;
use crate::value::Type;

/// A result.
pub type Result<T> = std::result::Result<T, Error>;

/// An error.
///
/// Every variant that originates in SQLite carries the native [`Status`] as
/// its source, wrapped with the context of the call site.
#[derive(Clone, Debug, thiserror::Error)]
pub enum Error {
    /// Opening the database failed.
    #[error("error opening connection to {path:?}: {status}")]
    Open {
        path: String,
        #[source]
        status: Status,
    },

    /// Applying the connection policy failed after the database was opened.
    #[error("error setting pragma {pragma}: {source}")]
    Policy {
        pragma: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// Compiling a query failed.
    #[error("error preparing statement for query {query:?}: {status}")]
    Prepare {
        query: String,
        #[source]
        status: Status,
    },

    /// The number of values does not match the number of placeholders.
    #[error(
        "error binding args for query {query:?}: expected {expected}, got {given}, \
         first unmatched position is {position}"
    )]
    ArgumentCount {
        query: String,
        expected: usize,
        given: usize,
        position: usize,
    },

    /// Binding a value failed.
    #[error("error binding {kind} arg at position {position} for query {query:?}: {status}")]
    Bind {
        query: String,
        position: usize,
        kind: Type,
        #[source]
        status: Status,
    },

    /// An argument has a type outside of the closed set of values.
    #[error("unsupported arg type {type_name} at position {position}")]
    UnsupportedType {
        position: usize,
        type_name: &'static str,
    },

    /// Executing a statement failed.
    #[error("error executing query {query:?}: {status}")]
    Exec {
        query: String,
        #[source]
        status: Status,
    },

    /// Advancing to the next row failed.
    #[error("error getting next row for query {query:?}: {status}")]
    Row {
        query: String,
        #[source]
        status: Status,
    },

    /// A destination row is not as wide as the result.
    #[error("row destination has {given} slots but the result has {expected} columns")]
    Width { expected: usize, given: usize },

    /// SQLite reported a column type the driver does not know.
    #[error("unexpected column type {code} at column {column} for query {query:?}")]
    Decode {
        query: String,
        column: usize,
        code: i32,
    },

    /// Closing a connection failed.
    #[error("error closing connection: {status}")]
    CloseConnection {
        #[source]
        status: Status,
    },

    /// Finalizing a statement failed.
    #[error("error closing statement for query {query:?}: {status}")]
    CloseStatement {
        query: String,
        #[source]
        status: Status,
    },

    /// No driver has been registered under the name.
    #[error("unregistered driver {name:?}")]
    UnregisteredDriver { name: String },

    /// A row has no column with the name.
    #[error("unknown column {0:?}")]
    UnknownColumn(String),

    /// A value could not be converted into the requested type.
    #[error("failed to convert a value of type {from} into {into}")]
    Conversion { from: Type, into: &'static str },

    /// A path, query, or option could not be passed to SQLite.
    #[error("{0}")]
    InvalidInput(String),
}

/// A native status reported by SQLite.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct Status {
    /// The kind derived from the primary result code.
    pub kind: ErrorKind,
    /// The result code, possibly extended.
    pub code: i32,
    /// The message SQLite associates with the failure.
    pub message: String,
}

macro_rules! declare(
    ($($left:ident => $right:ident,)*) => (
        /// An error kind.
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub enum ErrorKind {
            $($left = ffi::$right as isize,)*
            Unknown,
        }

        pub fn kind_from_code(code: c_int) -> ErrorKind {
            match code & 0xff {
                $(ffi::$right => ErrorKind::$left,)*
                _ => ErrorKind::Unknown,
            }
        }
    );
);

declare!(
    Abort => SQLITE_ABORT,
    Authorization => SQLITE_AUTH,
    Busy => SQLITE_BUSY,
    CantOpen => SQLITE_CANTOPEN,
    Constraint => SQLITE_CONSTRAINT,
    Corruption => SQLITE_CORRUPT,
    Done => SQLITE_DONE,
    Empty => SQLITE_EMPTY,
    Error => SQLITE_ERROR,
    Format => SQLITE_FORMAT,
    Full => SQLITE_FULL,
    Internal => SQLITE_INTERNAL,
    Interruption => SQLITE_INTERRUPT,
    IOError => SQLITE_IOERR,
    Locked => SQLITE_LOCKED,
    Mismatch => SQLITE_MISMATCH,
    Misuse => SQLITE_MISUSE,
    NoLargeFileSupport => SQLITE_NOLFS,
    NoMemory => SQLITE_NOMEM,
    NotDatabase => SQLITE_NOTADB,
    NotFound => SQLITE_NOTFOUND,
    Notice => SQLITE_NOTICE,
    OK => SQLITE_OK,
    Permission => SQLITE_PERM,
    Protocol => SQLITE_PROTOCOL,
    Range => SQLITE_RANGE,
    ReadOnly => SQLITE_READONLY,
    Row => SQLITE_ROW,
    Schema => SQLITE_SCHEMA,
    TooBig => SQLITE_TOOBIG,
    Warning => SQLITE_WARNING,
);

impl Error {
    /// Return the native status if the error originates in SQLite.
    pub fn status(&self) -> Option<&Status> {
        match self {
            Error::Open { status, .. }
            | Error::Prepare { status, .. }
            | Error::Bind { status, .. }
            | Error::Exec { status, .. }
            | Error::Row { status, .. }
            | Error::CloseConnection { status }
            | Error::CloseStatement { status, .. } => Some(status),
            Error::Policy { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Return the kind of the native status if any.
    #[inline]
    pub fn kind(&self) -> Option<ErrorKind> {
        self.status().map(|status| status.kind)
    }
}

impl Status {
    /// Describe a result code with the generic English text SQLite has for it.
    pub fn from_code(code: c_int) -> Status {
        let message = unsafe {
            let message = ffi::sqlite3_errstr(code);
            if message.is_null() {
                String::new()
            } else {
                c_str_to_string!(message)
            }
        };
        Status {
            kind: kind_from_code(code),
            code: code as i32,
            message,
        }
    }

    /// Describe a result code with the message recorded on a connection.
    ///
    /// The connection message is used only when it refers to the same
    /// primary code; otherwise the generic text is returned.
    pub fn last(raw: *mut ffi::sqlite3, code: c_int) -> Status {
        if raw.is_null() {
            return Status::from_code(code);
        }
        unsafe {
            if ffi::sqlite3_errcode(raw) & 0xff != code & 0xff {
                return Status::from_code(code);
            }
            let message = ffi::sqlite3_errmsg(raw);
            if message.is_null() {
                return Status::from_code(code);
            }
            Status {
                kind: kind_from_code(code),
                code: code as i32,
                message: c_str_to_string!(message),
            }
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            ErrorKind::Unknown => write!(formatter, "an unknown SQLite result code"),
            _ => write!(formatter, "SQLite result code {}", *self as isize),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{kind_from_code, Error, ErrorKind, Status};
    use crate::ffi;

    #[test]
    fn fmt() {
        assert_eq!(
            format!("{}", ErrorKind::OK),
            String::from("SQLite result code 0")
        );
        assert_eq!(
            format!("{}", kind_from_code(255)),
            String::from("an unknown SQLite result code")
        );
    }

    #[test]
    fn kind_from_extended_code() {
        // SQLITE_CONSTRAINT_UNIQUE
        assert_eq!(kind_from_code(2067), ErrorKind::Constraint);
        assert_eq!(kind_from_code(ffi::SQLITE_BUSY), ErrorKind::Busy);
    }

    #[test]
    fn status() {
        let status = Status::from_code(ffi::SQLITE_NOTADB);
        assert_eq!(status.kind, ErrorKind::NotDatabase);
        assert_eq!(status.code, 26);
        assert_eq!(status.message, "file is not a database");
        assert_eq!(status.to_string(), "file is not a database (code 26)");

        let error = Error::Policy {
            pragma: "journal_mode",
            source: Box::new(Error::Exec {
                query: "PRAGMA journal_mode = wal".into(),
                status,
            }),
        };
        assert_eq!(error.kind(), Some(ErrorKind::NotDatabase));
        assert!(error.to_string().starts_with("error setting pragma journal_mode: "));
    }

    #[test]
    fn status_without_connection() {
        let status = Status::last(std::ptr::null_mut(), ffi::SQLITE_MISUSE);
        assert_eq!(status.kind, ErrorKind::Misuse);
        assert_eq!(status.message, "bad parameter or other API misuse");
    }
}
