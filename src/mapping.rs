//! Mapping declaration parsing
//!
//! A declaration file holds one `source -> target` pair per line. Sources are
//! resolved against the config directory, targets against the project root.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, SyncError};

/// Default declaration file name (relative to the project root)
pub const MAPPING_FILE_NAME: &str = "file-mapping.txt";

/// Separator between source and target
pub const ARROW: &str = "->";

/// A source file and the place in the project tree that should link to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub source: PathBuf,
    pub target: PathBuf,
}

impl Mapping {
    /// Target path relative to `root`, always with forward slashes.
    ///
    /// Falls back to the full target path when it cannot be expressed
    /// relative to `root`.
    pub fn relative_target(&self, root: &Path) -> String {
        let relative =
            pathdiff::diff_paths(&self.target, root).unwrap_or_else(|| self.target.clone());
        to_slash(&relative)
    }
}

/// Read a declaration file and resolve every line into a [`Mapping`].
///
/// The whole file is read up front; lines are numbered from 1 in errors.
/// Order is preserved and duplicates are kept.
pub fn read_mapping_file(file: &Path, source_root: &Path, target_root: &Path) -> Result<Vec<Mapping>> {
    let content = fs::read_to_string(file).map_err(SyncError::io(file))?;
    parse_mappings(&content, source_root, target_root)
}

/// Parse declaration text. See [`read_mapping_file`].
pub fn parse_mappings(content: &str, source_root: &Path, target_root: &Path) -> Result<Vec<Mapping>> {
    let lines: Vec<&str> = content.lines().collect();
    let mut mappings = Vec::with_capacity(lines.len());

    for (index, line) in lines.iter().enumerate() {
        let segments: Vec<&str> = line
            .split(ARROW)
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect();

        let [source, target] = segments.as_slice() else {
            return Err(SyncError::Format {
                line: index + 1,
                content: (*line).to_string(),
            });
        };

        let source = source_root.join(source);
        let target = target_root.join(target);

        if !source.exists() {
            return Err(SyncError::MissingSource(absolute(&source)));
        }

        tracing::debug!(
            line = index + 1,
            source = %source.display(),
            target = %target.display(),
            "Parsed mapping"
        );
        mappings.push(Mapping { source, target });
    }

    Ok(mappings)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir => None,
            Component::RootDir => Some(String::new()),
            Component::Prefix(prefix) => Some(prefix.as_os_str().to_string_lossy().into_owned()),
        })
        .collect::<Vec<_>>()
        .join("/")
}
