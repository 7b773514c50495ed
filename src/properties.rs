//! `.properties` file reading
//!
//! Thin wrapper over `java-properties`, which handles comments, the three
//! separator styles, line continuations and escapes. Files are decoded as
//! ISO-8859-1 like `java.util.Properties::load`; use `\uXXXX` for anything else.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Result, SyncError};

/// Parsed key/value pairs of a properties file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    /// Load and parse a properties file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(SyncError::io(path))?;
        Self::read(BufReader::new(file), path)
    }

    fn read<R: Read>(input: R, path: &Path) -> Result<Self> {
        let entries =
            java_properties::read(input).map_err(|e| SyncError::MalformedProperties {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}
