//! This is the `ConfigFile` struct.
//!
//! This is for finding the right default locations for various configuration files for
//! `geofence`.  This is a configuration file/struct neutral loading engine, storing only the
//! base directory and with `load()` read the proper file or the default one.
//!
//! This encapsulates the configuration file, available with `.inner()` or `.into_inner()`.
//!

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use eyre::{eyre, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::makepath;

/// Config filename
const CONFIG: &str = "geowatch.hcl";

/// Main name for the directory base
const TAG: &str = "geofence";

/// Every configuration file carries a version number, checked on load.
///
pub trait Versioned {
    /// Version this code understands
    const VERSION: usize;

    /// Version found in the file
    fn version(&self) -> usize;
}

/// Configuration file wrapper, `T` is the actual on-disk structure.
///
#[derive(Debug)]
pub struct ConfigFile<T: Debug + DeserializeOwned + Versioned> {
    /// Tag is the project name.
    tag: String,
    /// This is the base directory for all files.
    basedir: PathBuf,
    inner: T,
}

/// Returns the base directory for all our files.
///
/// `$HOME/.config/geofence` on UNIX, `%LOCALAPPDATA%\geofence` on Windows.
///
#[tracing::instrument]
pub fn config_dir(tag: &str) -> Result<PathBuf> {
    let base = BaseDirs::new().ok_or_else(|| eyre!("No home directory, can not continue"))?;

    #[cfg(unix)]
    let base: PathBuf = makepath!(base.home_dir(), ".config", tag);

    #[cfg(windows)]
    let base: PathBuf = makepath!(base.data_local_dir(), tag);

    debug!("base = {base:?}");
    Ok(base)
}

impl<T> ConfigFile<T>
where
    T: Debug + DeserializeOwned + Versioned,
{
    /// Returns the path of the default config directory
    ///
    #[tracing::instrument(skip(self))]
    pub fn config_path(&self) -> PathBuf {
        self.basedir.clone()
    }

    /// Returns the path of the default config file
    ///
    #[tracing::instrument]
    pub fn default_file() -> Result<PathBuf> {
        let cfg = config_dir(TAG)?.join(CONFIG);
        debug!("default = {cfg:?}");
        Ok(cfg)
    }

    /// Load the file and return a struct T in the right format.
    ///
    /// Use the following search path:
    /// - file specified on CLI
    /// - default basedir (base on $HOME or $LOCALAPPDATA)
    ///
    #[tracing::instrument]
    pub fn load(fname: Option<&Path>) -> Result<ConfigFile<T>> {
        let basedir = config_dir(TAG)?;

        let fname = match fname {
            Some(fname) => PathBuf::from(fname),
            None => Self::default_file()?,
        };

        // Use a full path
        //
        let fname = if fname.exists() {
            fname.canonicalize()?
        } else {
            return Err(eyre!("Unknown config file {:?}", fname));
        };

        trace!("Loading config file {fname:?} from {basedir:?}");

        let data = fs::read_to_string(&fname)?;
        let inner = Self::parse(&data)?;

        Ok(ConfigFile {
            tag: String::from(TAG),
            basedir,
            inner,
        })
    }

    /// Parse and check the version of an HCL document.
    ///
    #[tracing::instrument(skip(data))]
    pub fn parse(data: &str) -> Result<T> {
        let data: T = hcl::from_str(data)?;
        debug!("struct data = {data:?}");

        if data.version() != T::VERSION {
            return Err(eyre!(
                "Bad config file version v{}, need v{}",
                data.version(),
                T::VERSION
            ));
        }
        Ok(data)
    }

    /// Project tag
    ///
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Return the inner configuration file
    ///
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Consume the wrapper
    ///
    pub fn into_inner(self) -> T {
        self.inner
    }
}
