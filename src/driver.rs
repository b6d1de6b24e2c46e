use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use tracing::debug;

use crate::{Config, Connection, Options, Result};

static DRIVERS: LazyLock<RwLock<HashMap<String, Arc<Driver>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// A driver opening connections with one configuration.
#[derive(Clone, Debug)]
pub struct Driver {
    config: Config,
}

impl Driver {
    /// Create a driver without registering it.
    #[inline]
    pub fn new(options: Options) -> Driver {
        Driver {
            config: options.into(),
        }
    }

    /// Return the name of the driver.
    #[inline]
    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// Return the configuration applied to every connection.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open a connection.
    #[inline]
    pub fn open<T: AsRef<Path>>(&self, path: T) -> Result<Connection> {
        Connection::open_with_config(path, self.config.clone())
    }
}

/// Register a driver under the name given in the options.
///
/// A driver already registered under the same name is replaced.
pub fn register(options: Options) -> Arc<Driver> {
    let driver = Arc::new(Driver::new(options));
    let mut drivers = DRIVERS.write().unwrap_or_else(PoisonError::into_inner);
    if drivers
        .insert(driver.name().into(), driver.clone())
        .is_some()
    {
        driver
            .config
            .log(|| debug!(driver = driver.name(), "replaced registered driver"));
    }
    driver
}

/// Return the driver registered under a name.
pub fn lookup(name: &str) -> Option<Arc<Driver>> {
    DRIVERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
}
