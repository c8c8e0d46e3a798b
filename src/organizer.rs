// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 The c2md contributors

//! Grouping of parsed entries into an output directory layout.
//!
//! The organizer asks the [`UrlMapper`] where each entry belongs, groups
//! entries by directory, and numbers the files within each directory in
//! input order.
//!
//! # Example
//!
//! ```
//! use c2md::organizer::FileOrganizer;
//! use c2md::parser::parse_entries;
//! use c2md::url_mapper::UrlMapper;
//!
//! let entries = parse_entries(
//!     "TITLE: Auth\nSOURCE: https://x.com/docs/api/auth\n\
//!      ----------------------------------------\n\
//!      TITLE: Users\nSOURCE: https://x.com/docs/api/users\n",
//! );
//!
//! let mut organizer = FileOrganizer::new(UrlMapper::new(false));
//! let structure = organizer.organize(&entries);
//!
//! let api = &structure["api"];
//! assert_eq!(api[0].full_path(), "api/001-auth.md");
//! assert_eq!(api[1].full_path(), "api/002-users.md");
//! ```

use crate::parser::ParsedEntry;
use crate::url_mapper::UrlMapper;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;
use tracing::warn;

static RE_UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\-.]").unwrap());
static RE_DASH_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

/// Organized files keyed by directory path, `""` being the output root.
pub type OrganizedStructure = BTreeMap<String, Vec<OrganizedFile>>;

/// An entry with its assigned place in the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizedFile {
    /// The entry to render.
    pub entry: ParsedEntry,

    /// Directory relative to the output root; empty for the root itself.
    pub directory: String,

    /// Markdown filename within `directory`.
    pub filename: String,

    /// One-based position within `directory`.
    pub number: usize,
}

impl OrganizedFile {
    /// Path of the file relative to the output root, using `/` separators.
    #[must_use]
    pub fn full_path(&self) -> String {
        if self.directory.is_empty() {
            self.filename.clone()
        } else {
            format!("{}/{}", self.directory, self.filename)
        }
    }
}

/// Assigns directories and numbered filenames to parsed entries.
///
/// Numbering continues across calls to [`organize`](Self::organize) until
/// [`reset_counters`](Self::reset_counters) is called.
#[derive(Debug, Clone, Default)]
pub struct FileOrganizer {
    mapper: UrlMapper,
    counters: HashMap<String, usize>,
}

impl FileOrganizer {
    /// Creates an organizer that places entries using `mapper`.
    #[must_use]
    pub fn new(mapper: UrlMapper) -> Self {
        Self {
            mapper,
            counters: HashMap::new(),
        }
    }

    /// The mapper used to derive paths and filenames.
    #[must_use]
    pub const fn mapper(&self) -> &UrlMapper {
        &self.mapper
    }

    /// Groups `entries` by target directory and numbers them.
    ///
    /// Within a directory, files are numbered in `original_order`. Entries
    /// whose source cannot be mapped go to the root directory.
    pub fn organize(&mut self, entries: &[ParsedEntry]) -> OrganizedStructure {
        let mut grouped: BTreeMap<String, Vec<&ParsedEntry>> = BTreeMap::new();
        for entry in entries {
            grouped
                .entry(self.directory_for(entry))
                .or_default()
                .push(entry);
        }

        let mut structure = OrganizedStructure::new();
        for (directory, mut group) in grouped {
            group.sort_by_key(|entry| entry.original_order);

            let mut files = Vec::with_capacity(group.len());
            for entry in group {
                let counter = self.counters.entry(directory.clone()).or_default();
                *counter += 1;
                let number = *counter;
                files.push(OrganizedFile {
                    entry: entry.clone(),
                    directory: directory.clone(),
                    filename: self.filename_for(entry, number),
                    number,
                });
            }
            structure.insert(directory, files);
        }

        structure
    }

    /// Forgets all numbering so the next run starts again at 1.
    pub fn reset_counters(&mut self) {
        self.counters.clear();
    }

    /// Directory part of the entry's mapped path.
    fn directory_for(&self, entry: &ParsedEntry) -> String {
        if entry.source.is_empty() {
            return String::new();
        }

        match self.mapper.extract_file_path(&entry.source) {
            Ok((directory, _)) => directory,
            Err(err) => {
                warn!(source = %entry.source, error = %err, "could not map source URL, placing entry at root");
                String::new()
            }
        }
    }

    fn filename_for(&self, entry: &ParsedEntry, number: usize) -> String {
        if !entry.source.is_empty()
            && let Ok(name) = self.mapper.numbered_filename(&entry.source, number)
        {
            return name;
        }
        self.mapper.filename_for(&clean_filename(&entry.title), number)
    }
}

/// Turns a title into a filename slug.
///
/// Lowercases, turns spaces into dashes, drops anything but word characters,
/// dashes and dots, and collapses dash runs. Empty results become `untitled`.
#[must_use]
pub fn clean_filename(title: &str) -> String {
    let lowered = title.to_lowercase().replace(' ', "-");
    let safe = RE_UNSAFE_CHARS.replace_all(&lowered, "");
    let collapsed = RE_DASH_RUN.replace_all(&safe, "-");
    let trimmed = collapsed.trim_matches('-');

    if trimmed.is_empty() {
        "untitled".to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Flattens an organized structure into a single list, directory by directory.
#[must_use]
pub fn flatten(structure: &OrganizedStructure) -> Vec<OrganizedFile> {
    structure.values().flatten().cloned().collect()
}

/// Overview of an organized structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectorySummary {
    /// Number of organized files across all directories.
    pub total_files: usize,

    /// Number of directories, the root included.
    pub total_directories: usize,

    /// Per-directory listing; the root directory is named `root`.
    pub directories: BTreeMap<String, DirectoryListing>,
}

/// Files planned for one directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryListing {
    /// Number of files in the directory.
    pub file_count: usize,

    /// Filenames in numbering order.
    pub files: Vec<String>,
}

/// Summarizes `structure` for display or JSON output.
#[must_use]
pub fn summarize(structure: &OrganizedStructure) -> DirectorySummary {
    let directories = structure
        .iter()
        .map(|(directory, files)| {
            let name = if directory.is_empty() {
                "root".to_owned()
            } else {
                directory.clone()
            };
            let listing = DirectoryListing {
                file_count: files.len(),
                files: files.iter().map(|f| f.filename.clone()).collect(),
            };
            (name, listing)
        })
        .collect();

    DirectorySummary {
        total_files: structure.values().map(Vec::len).sum(),
        total_directories: structure.len(),
        directories,
    }
}
