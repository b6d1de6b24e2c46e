use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use tracing::Dispatch;

use crate::{Error, Result};

/// The name a driver registers under when none is given.
pub const DEFAULT_NAME: &str = "sqlite";

/// The busy timeout applied when none is given.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// SQLite keeps the busy timeout in a 32-bit integer of milliseconds.
const MAX_BUSY_TIMEOUT: Duration = Duration::from_millis(i32::MAX as u64);

/// A [journaling mode][1].
///
/// [1]: https://www.sqlite.org/pragma.html#pragma_journal_mode
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum JournalMode {
    /// Delete the rollback journal at the end of each transaction.
    Delete,
    /// Truncate the rollback journal to zero length instead of deleting it.
    Truncate,
    /// Keep the rollback journal and overwrite its header.
    Persist,
    /// Keep the rollback journal in memory.
    Memory,
    /// Use a write-ahead log.
    #[default]
    Wal,
    /// Disable the rollback journal.
    Off,
}

/// A set of connection options.
///
/// Fields left unset are filled in with defaults when the options are turned
/// into a [`Config`].
#[derive(Clone, Debug, Default)]
pub struct Options {
    /// The name to register the driver under.
    pub name: Option<String>,
    /// The journaling mode.
    pub journal_mode: Option<JournalMode>,
    /// How long SQLite retries when a lock is held by another connection.
    pub busy_timeout: Option<Duration>,
    /// Whether foreign-key constraints are enforced.
    pub foreign_keys: Option<bool>,
    /// Where connection events are logged.
    pub logger: Option<Dispatch>,
}

/// An immutable connection configuration.
#[derive(Clone, Debug)]
pub struct Config {
    name: String,
    journal_mode: JournalMode,
    busy_timeout: Duration,
    foreign_keys: bool,
    logger: Dispatch,
}

impl JournalMode {
    /// Return the spelling SQLite uses.
    pub fn as_str(&self) -> &'static str {
        match *self {
            JournalMode::Delete => "delete",
            JournalMode::Truncate => "truncate",
            JournalMode::Persist => "persist",
            JournalMode::Memory => "memory",
            JournalMode::Wal => "wal",
            JournalMode::Off => "off",
        }
    }
}

impl Display for JournalMode {
    #[inline]
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for JournalMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Ok(match value.to_ascii_lowercase().as_str() {
            "delete" => JournalMode::Delete,
            "truncate" => JournalMode::Truncate,
            "persist" => JournalMode::Persist,
            "memory" => JournalMode::Memory,
            "wal" => JournalMode::Wal,
            "off" => JournalMode::Off,
            _ => {
                return Err(Error::InvalidInput(format!(
                    "unknown journal mode {:?}",
                    value
                )))
            }
        })
    }
}

impl Options {
    /// Create a set of options with nothing set.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name to register the driver under.
    pub fn with_name<T: Into<String>>(mut self, name: T) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the journaling mode.
    pub fn with_journal_mode(mut self, journal_mode: JournalMode) -> Self {
        self.journal_mode = Some(journal_mode);
        self
    }

    /// Set the busy timeout.
    ///
    /// A timeout longer than SQLite can represent is capped at `i32::MAX`
    /// milliseconds.
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = Some(busy_timeout);
        self
    }

    /// Enable or disable foreign-key enforcement.
    pub fn with_foreign_keys(mut self, foreign_keys: bool) -> Self {
        self.foreign_keys = Some(foreign_keys);
        self
    }

    /// Set the sink for connection events.
    pub fn with_logger<T: Into<Dispatch>>(mut self, logger: T) -> Self {
        self.logger = Some(logger.into());
        self
    }
}

impl Config {
    /// Return the driver name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the journaling mode.
    #[inline]
    pub fn journal_mode(&self) -> JournalMode {
        self.journal_mode
    }

    /// Return the busy timeout.
    #[inline]
    pub fn busy_timeout(&self) -> Duration {
        self.busy_timeout
    }

    /// Check if foreign-key constraints are enforced.
    #[inline]
    pub fn foreign_keys(&self) -> bool {
        self.foreign_keys
    }

    /// Return the logging sink.
    #[inline]
    pub fn logger(&self) -> &Dispatch {
        &self.logger
    }

    /// Return the pragmas applied on open, in the order they are applied.
    ///
    /// The busy timeout goes first so that switching the journaling mode
    /// already waits for locks held by other connections.
    pub(crate) fn pragmas(&self) -> [(&'static str, String); 3] {
        [
            ("busy_timeout", self.busy_timeout.as_millis().to_string()),
            ("journal_mode", self.journal_mode.to_string()),
            ("foreign_keys", (self.foreign_keys as u8).to_string()),
        ]
    }

    /// Run a closure with the logging sink as the default dispatcher.
    #[inline]
    pub(crate) fn log<F: FnOnce()>(&self, event: F) {
        tracing::dispatcher::with_default(&self.logger, event)
    }
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Options::default().into()
    }
}

impl From<Options> for Config {
    fn from(options: Options) -> Self {
        Config {
            name: options.name.unwrap_or_else(|| DEFAULT_NAME.into()),
            journal_mode: options.journal_mode.unwrap_or_default(),
            busy_timeout: options
                .busy_timeout
                .unwrap_or(DEFAULT_BUSY_TIMEOUT)
                .min(MAX_BUSY_TIMEOUT),
            foreign_keys: options.foreign_keys.unwrap_or(true),
            logger: options.logger.unwrap_or_else(Dispatch::none),
        }
    }
}
