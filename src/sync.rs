//! Sync orchestration
//!
//! Runs the whole pipeline for one project: locate the config directory,
//! parse the mapping file, patch the ignore file, then reconcile every link
//! in declaration order. The first error stops the run.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};
use crate::gitignore::{self, IGNORE_FILE_NAME, PatchOutcome};
use crate::linker::{self, LinkOutcome, LinkState};
use crate::locator::{self, ConfigDir};
use crate::mapping::{self, MAPPING_FILE_NAME, Mapping};

/// Inputs for loading a project
#[derive(Debug, Default, Clone)]
pub struct SyncOptions {
    /// Explicit config directory, overriding `local.properties` and the environment
    pub config_dir: Option<String>,
    /// Mapping file (relative to the project root); defaults to `file-mapping.txt`
    pub mapping_file: Option<PathBuf>,
    /// Ignore file (relative to the project root); defaults to `.gitignore`
    pub ignore_file: Option<PathBuf>,
}

/// Result of a sync operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub ignore_file: PatchOutcome,
}

impl SyncReport {
    /// True when the run changed (or in dry-run would change) nothing
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0 && !self.ignore_file.is_write()
    }
}

/// Link state of one target, as reported by `status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetState {
    Missing,
    Linked,
    WrongLink,
    NotASymlink,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    /// Target relative to the project root
    pub target: String,
    pub source: String,
    pub state: TargetState,
    pub points_to: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub config_dir: String,
    pub entries: Vec<StatusEntry>,
    pub ignore_file_current: bool,
}

impl StatusReport {
    pub fn problems(&self) -> usize {
        let bad_links = self
            .entries
            .iter()
            .filter(|e| e.state != TargetState::Linked)
            .count();
        bad_links + usize::from(!self.ignore_file_current)
    }
}

/// A loaded project: config located and mappings parsed and validated
#[derive(Debug)]
pub struct Synchronizer {
    project_root: PathBuf,
    config_dir: ConfigDir,
    ignore_file: PathBuf,
    mappings: Vec<Mapping>,
}

impl Synchronizer {
    /// Locate the config directory and parse the mapping file.
    pub fn load(project_root: &Path, options: &SyncOptions) -> Result<Self> {
        Self::load_with_env(project_root, options, |key| std::env::var(key).ok())
    }

    /// Same as [`Synchronizer::load`] with an injected environment lookup.
    pub fn load_with_env<E>(project_root: &Path, options: &SyncOptions, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let project_root = std::path::absolute(project_root).map_err(SyncError::io(project_root))?;

        let config_dir = locator::locate_with(&project_root, options.config_dir.as_deref(), env)?;
        tracing::info!(
            origin = %config_dir.origin,
            dir = %config_dir.path.display(),
            "Using config directory"
        );

        let mapping_file = project_root.join(
            options
                .mapping_file
                .as_deref()
                .unwrap_or(Path::new(MAPPING_FILE_NAME)),
        );
        let ignore_file = project_root.join(
            options
                .ignore_file
                .as_deref()
                .unwrap_or(Path::new(IGNORE_FILE_NAME)),
        );

        let mappings = mapping::read_mapping_file(&mapping_file, &config_dir.path, &project_root)?;
        tracing::debug!(count = mappings.len(), file = %mapping_file.display(), "Loaded mappings");

        Ok(Self {
            project_root,
            config_dir,
            ignore_file,
            mappings,
        })
    }

    /// Get the project root path
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config_dir(&self) -> &ConfigDir {
        &self.config_dir
    }

    pub fn ignore_file(&self) -> &Path {
        &self.ignore_file
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Targets as they appear in the ignore file, in declaration order
    pub fn ignore_entries(&self) -> Vec<String> {
        self.mappings
            .iter()
            .map(|m| m.relative_target(&self.project_root))
            .collect()
    }

    /// Patch the ignore file for all targets, then reconcile each link.
    ///
    /// The ignore file is written before any link is touched, so it may list
    /// a target whose link then fails.
    pub fn sync(&self, dry_run: bool) -> Result<SyncReport> {
        let mut report = SyncReport {
            ignore_file: gitignore::update_ignore_file(
                &self.ignore_file,
                &self.ignore_entries(),
                dry_run,
            )?,
            ..Default::default()
        };

        for mapping in &self.mappings {
            match linker::reconcile(mapping, dry_run)? {
                LinkOutcome::Created => report.created += 1,
                LinkOutcome::Updated => report.updated += 1,
                LinkOutcome::Unchanged => report.unchanged += 1,
            }
        }

        Ok(report)
    }

    /// Inspect every target and the ignore file without changing anything.
    pub fn status(&self) -> Result<StatusReport> {
        let mut entries = Vec::with_capacity(self.mappings.len());

        for mapping in &self.mappings {
            let (state, points_to) = match LinkState::inspect(mapping)? {
                LinkState::Absent => (TargetState::Missing, None),
                LinkState::Correct => (
                    TargetState::Linked,
                    Some(mapping.source.display().to_string()),
                ),
                LinkState::Elsewhere(current) => {
                    (TargetState::WrongLink, Some(current.display().to_string()))
                }
                LinkState::NotALink => (TargetState::NotASymlink, None),
            };

            entries.push(StatusEntry {
                target: mapping.relative_target(&self.project_root),
                source: mapping.source.display().to_string(),
                state,
                points_to,
            });
        }

        let text = fs::read_to_string(&self.ignore_file).map_err(SyncError::io(&self.ignore_file))?;
        let ignore_file_current = gitignore::render(&text, &self.ignore_entries()).1
            == PatchOutcome::Unchanged;

        Ok(StatusReport {
            config_dir: self.config_dir.path.display().to_string(),
            entries,
            ignore_file_current,
        })
    }
}
