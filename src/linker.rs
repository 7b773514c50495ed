//! Symbolic link reconciliation
//!
//! Brings a single target path in line with its mapping, changing as little
//! as possible. Each mapping is handled on its own; there is no rollback of
//! earlier mappings when a later one fails.

use colored::Colorize;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, SyncError};
use crate::mapping::Mapping;

/// Current state of a mapping's target on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// Nothing usable at the target (a dangling link counts as absent)
    Absent,
    /// Symlink pointing at the declared source
    Correct,
    /// Symlink pointing somewhere else; holds the current link value
    Elsewhere(PathBuf),
    /// A regular file or directory
    NotALink,
}

impl LinkState {
    pub fn inspect(mapping: &Mapping) -> Result<Self> {
        let target = &mapping.target;

        if !target.exists() {
            return Ok(LinkState::Absent);
        }

        let metadata = fs::symlink_metadata(target).map_err(SyncError::io(target))?;
        if !metadata.file_type().is_symlink() {
            return Ok(LinkState::NotALink);
        }

        let current = fs::read_link(target).map_err(SyncError::io(target))?;
        if link_resolves_to(target, &current, &mapping.source) {
            Ok(LinkState::Correct)
        } else {
            Ok(LinkState::Elsewhere(current))
        }
    }
}

/// Result of reconciling one mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Make `mapping.target` a symlink to `mapping.source`.
///
/// | target state        | action                          |
/// |---------------------|---------------------------------|
/// | absent              | create parents, link            |
/// | correct link        | nothing                         |
/// | link elsewhere      | delete link, relink             |
/// | file or directory   | [`SyncError::Conflict`]         |
///
/// With `dry_run` the decision is made and reported but nothing is changed.
pub fn reconcile(mapping: &Mapping, dry_run: bool) -> Result<LinkOutcome> {
    let source = &mapping.source;
    let target = &mapping.target;

    match LinkState::inspect(mapping)? {
        LinkState::Correct => {
            println!("  {} Already linked: {}", "○".dimmed(), target.display());
            Ok(LinkOutcome::Unchanged)
        }
        LinkState::NotALink => Err(SyncError::Conflict(target.clone())),
        LinkState::Elsewhere(current) => {
            if dry_run {
                println!(
                    "  {} Would update symlink: {} -> {} (was -> {})",
                    "→".cyan(),
                    target.display(),
                    source.display(),
                    current.display()
                );
                return Ok(LinkOutcome::Updated);
            }

            remove_link(target).map_err(SyncError::io(target))?;
            create_symlink(source, target)?;
            println!(
                "  {} Updated: {} -> {} (was -> {})",
                "↻".yellow(),
                target.display(),
                source.display(),
                current.display()
            );
            Ok(LinkOutcome::Updated)
        }
        LinkState::Absent => {
            if dry_run {
                println!(
                    "  {} Would link: {} -> {}",
                    "→".cyan(),
                    target.display(),
                    source.display()
                );
                return Ok(LinkOutcome::Created);
            }

            if let Some(parent) = target.parent()
                && !parent.exists()
            {
                fs::create_dir_all(parent).map_err(SyncError::io(parent))?;
                tracing::debug!(dir = %parent.display(), "Created parent directory");
            }

            // A dangling link is reported as absent but still occupies the path.
            match remove_link(target) {
                Ok(()) => tracing::debug!(target = %target.display(), "Removed dangling link"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(SyncError::io(target)(e)),
            }

            create_symlink(source, target)?;
            println!(
                "  {} Linked: {} -> {}",
                "✔".green(),
                target.display(),
                source.display()
            );
            Ok(LinkOutcome::Created)
        }
    }
}

fn create_symlink(source: &Path, target: &Path) -> Result<()> {
    #[cfg(unix)]
    std::os::unix::fs::symlink(source, target).map_err(SyncError::io(target))?;

    #[cfg(windows)]
    {
        if source.is_dir() {
            std::os::windows::fs::symlink_dir(source, target).map_err(SyncError::io(target))?;
        } else {
            std::os::windows::fs::symlink_file(source, target).map_err(SyncError::io(target))?;
        }
    }

    Ok(())
}

fn remove_link(path: &Path) -> io::Result<()> {
    // Directory symlinks on Windows must be removed as directories.
    #[cfg(windows)]
    if fs::metadata(path).is_ok_and(|m| m.is_dir()) {
        return fs::remove_dir(path);
    }

    fs::remove_file(path)
}

/// Whether the link at `link` with value `value` points at `source`.
///
/// Relative values are interpreted against the link's directory. Comparison
/// is lexical so a source that is itself a symlink is not chased.
fn link_resolves_to(link: &Path, value: &Path, source: &Path) -> bool {
    if value == source {
        return true;
    }

    let resolved = if value.is_relative() {
        link.parent().unwrap_or(Path::new("")).join(value)
    } else {
        value.to_path_buf()
    };

    normalize(&resolved) == normalize(source)
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
