//! Config directory resolution
//!
//! The directory holding the real configuration files can come from three
//! places. They are tried in priority order and the first one that yields a
//! value wins. A flag or key that is present but blank is an error:
//!
//! 1. an explicit override (the `--config-dir` flag),
//! 2. the `config.dir` key of `local.properties` in the project root,
//! 3. the `APP_CONFIG_DIR` environment variable.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};
use crate::properties::Properties;

/// Untracked properties file read from the project root
pub const PROPERTIES_FILE_NAME: &str = "local.properties";

/// Key looked up in [`PROPERTIES_FILE_NAME`]
pub const CONFIG_DIR_KEY: &str = "config.dir";

/// Environment variable consulted last
pub const CONFIG_DIR_ENV: &str = "APP_CONFIG_DIR";

/// Where the winning value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    Override,
    PropertiesFile,
    Environment,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::Override => write!(f, "--config-dir"),
            ConfigOrigin::PropertiesFile => {
                write!(f, "{} ({})", PROPERTIES_FILE_NAME, CONFIG_DIR_KEY)
            }
            ConfigOrigin::Environment => write!(f, "${}", CONFIG_DIR_ENV),
        }
    }
}

/// The resolved config directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDir {
    /// Absolute when the project root is absolute
    pub path: PathBuf,
    /// Value as it was written
    pub raw: String,
    pub origin: ConfigOrigin,
}

type Resolver<'a> = (ConfigOrigin, Box<dyn Fn() -> Result<Option<String>> + 'a>);

/// Resolve the config directory using the real process environment.
pub fn locate(project_root: &Path, override_dir: Option<&str>) -> Result<ConfigDir> {
    locate_with(project_root, override_dir, |key| std::env::var(key).ok())
}

/// Resolve the config directory with an injected environment lookup.
///
/// Relative values are resolved against `project_root`. The directory is not
/// required to exist; sources are checked one by one when mappings are parsed.
pub fn locate_with<E>(project_root: &Path, override_dir: Option<&str>, env: E) -> Result<ConfigDir>
where
    E: Fn(&str) -> Option<String>,
{
    let resolvers: [Resolver<'_>; 3] = [
        (
            ConfigOrigin::Override,
            Box::new(|| -> Result<Option<String>> { Ok(override_dir.map(str::to_string)) }),
        ),
        (
            ConfigOrigin::PropertiesFile,
            Box::new(|| read_properties_value(project_root)),
        ),
        (
            ConfigOrigin::Environment,
            Box::new(|| -> Result<Option<String>> { Ok(env(CONFIG_DIR_ENV)) }),
        ),
    ];

    for (origin, resolve) in &resolvers {
        let value = resolve()?;
        match value.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                tracing::debug!(%origin, value = %raw, "Resolved config directory");
                return Ok(ConfigDir {
                    path: project_root.join(raw),
                    raw: raw.to_string(),
                    origin: *origin,
                });
            }
            // An empty environment variable reads as unset; an empty flag or key is a mistake.
            Some(_) if *origin != ConfigOrigin::Environment => {
                return Err(SyncError::Config(format!(
                    "Config directory from {} is blank",
                    origin
                )));
            }
            _ => tracing::debug!(%origin, "No config directory from this source"),
        }
    }

    Err(SyncError::Config(format!(
        "No config directory configured: pass --config-dir, set the {} property in {}, \
         or set the {} environment variable",
        CONFIG_DIR_KEY, PROPERTIES_FILE_NAME, CONFIG_DIR_ENV
    )))
}

fn read_properties_value(project_root: &Path) -> Result<Option<String>> {
    let path = project_root.join(PROPERTIES_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }
    let properties = Properties::load(&path)?;
    Ok(properties.get(CONFIG_DIR_KEY).map(str::to_string))
}
