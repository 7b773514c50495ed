//! Gitignore management
//!
//! Keeps an auto-generated block inside `.gitignore` listing every mapped
//! target, so linked secrets never end up in version control. Text outside
//! the block is never touched.

use colored::Colorize;
use std::fs;
use std::path::Path;

use crate::error::{Result, SyncError};

/// Default ignore file name (relative to the project root)
pub const IGNORE_FILE_NAME: &str = ".gitignore";

pub const BEGIN_MARKER: &str = "# === AUTO-GENERATED: DO NOT EDIT ===";
pub const END_MARKER: &str = "# === END AUTO-GENERATED ===";

/// What happened (or would happen) to the ignore file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatchOutcome {
    /// The managed block already listed exactly these entries
    #[default]
    Unchanged,
    /// An existing managed block was rewritten
    Replaced,
    /// No managed block existed; one was added at the end
    Appended,
}

impl PatchOutcome {
    pub fn is_write(self) -> bool {
        self != PatchOutcome::Unchanged
    }
}

/// Rewrite the managed block of `file` so it lists exactly `entries`.
///
/// The file must already exist. Nothing is written when the content would not
/// change, or when `dry_run` is set.
pub fn update_ignore_file(file: &Path, entries: &[String], dry_run: bool) -> Result<PatchOutcome> {
    let text = fs::read_to_string(file).map_err(SyncError::io(file))?;
    let (new_text, outcome) = render(&text, entries);

    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    match outcome {
        PatchOutcome::Unchanged => {
            println!(
                "  {} {} already lists {} managed entries",
                "○".dimmed(),
                name,
                entries.len()
            );
            return Ok(outcome);
        }
        _ if dry_run => {
            println!(
                "  {} Would update {} with {} managed entries",
                "→".cyan(),
                name,
                entries.len()
            );
            return Ok(outcome);
        }
        _ => {}
    }

    fs::write(file, new_text).map_err(SyncError::io(file))?;

    let verb = if outcome == PatchOutcome::Appended {
        "Added"
    } else {
        "Updated"
    };
    println!(
        "  {} {} {} managed entries in {}",
        "✔".green(),
        verb,
        entries.len(),
        name
    );
    tracing::debug!(file = %file.display(), ?outcome, "Ignore file written");

    Ok(outcome)
}

/// Compute the new file text without touching the disk.
pub fn render(text: &str, entries: &[String]) -> (String, PatchOutcome) {
    match find_managed_region(text) {
        Some(region) => {
            let mut new_text = String::with_capacity(text.len());
            new_text.push_str(&text[..region.start]);
            push_block(&mut new_text, region.begin, entries, region.end_marker);
            new_text.push_str(&text[region.end..]);

            if new_text == text {
                (new_text, PatchOutcome::Unchanged)
            } else {
                (new_text, PatchOutcome::Replaced)
            }
        }
        None => {
            let mut new_text = String::with_capacity(text.len() + 128);
            new_text.push_str(text);
            if !text.ends_with('\n') {
                new_text.push('\n');
            }
            push_block(&mut new_text, BEGIN_MARKER, entries, END_MARKER);
            (new_text, PatchOutcome::Appended)
        }
    }
}

/// Entries currently listed in the managed block, if there is one.
pub fn managed_entries(text: &str) -> Option<Vec<String>> {
    let region = find_managed_region(text)?;
    let inner = &text[region.start + region.begin.len()..region.end - region.end_marker.len()];
    Some(
        inner
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn push_block(out: &mut String, begin: &str, entries: &[String], end: &str) {
    out.push_str(begin);
    out.push('\n');
    for entry in entries {
        out.push_str(entry);
        out.push('\n');
    }
    out.push_str(end);
}

/// Byte span of the first begin marker through the next end marker.
///
/// The span covers the marker text only. Anything sharing a line with a
/// marker (indentation, text typed right after the end marker) stays outside.
#[derive(Debug)]
struct Region<'a> {
    start: usize,
    end: usize,
    begin: &'a str,
    end_marker: &'a str,
}

fn find_managed_region(text: &str) -> Option<Region<'_>> {
    let (start, begin_end) = find_marker(text, 0, BEGIN_MARKER)?;
    let (end_start, end) = find_marker(text, begin_end, END_MARKER)?;

    Some(Region {
        start,
        end,
        begin: &text[start..begin_end],
        end_marker: &text[end_start..end],
    })
}

/// Find `marker` in `text` at or after byte `from`.
///
/// Runs of whitespace inside the marker match any non-empty whitespace run,
/// so `#  ===  END AUTO-GENERATED ===` counts. Returns the matched byte range.
fn find_marker(text: &str, from: usize, marker: &str) -> Option<(usize, usize)> {
    let mut tokens = marker.split_whitespace();
    let first = tokens.next()?;
    let rest: Vec<&str> = tokens.collect();

    let mut search = from;
    while let Some(found) = text[search..].find(first) {
        let start = search + found;
        let after_first = start + first.len();
        if let Some(end) = match_tokens(text, after_first, &rest) {
            return Some((start, end));
        }
        search = after_first;
    }

    None
}

fn match_tokens(text: &str, mut pos: usize, tokens: &[&str]) -> Option<usize> {
    for token in tokens {
        let remaining = &text[pos..];
        let trimmed = remaining.trim_start();
        if trimmed.len() == remaining.len() || !trimmed.starts_with(token) {
            return None;
        }
        pos += remaining.len() - trimmed.len() + token.len();
    }
    Some(pos)
}
