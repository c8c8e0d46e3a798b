// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 The c2md contributors

//! Writing organized entries to markdown files on disk.
//!
//! Entries that resolve to the same relative path are combined into one
//! document (see [`crate::renderer::render_document`]).

use crate::organizer::OrganizedFile;
use crate::renderer::render_document;
use serde::Serialize;
use snafu::prelude::*;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

/// Error type for markdown output failures.
#[derive(Debug, Snafu)]
pub enum WriteError {
    /// A directory in the output tree could not be created.
    #[snafu(display("failed to create directory {}: {source}", path.display()))]
    CreateDir {
        /// The directory that was being created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A markdown file could not be written.
    #[snafu(display("failed to write markdown file {}: {source}", path.display()))]
    WriteFile {
        /// The file that was being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A relative path would leave the output directory.
    #[snafu(display("refusing to write outside the output directory: {path}"))]
    UnsafePath {
        /// The offending relative path.
        path: String,
    },
}

/// Writes rendered documents below an output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownWriter {
    output_dir: PathBuf,
}

impl MarkdownWriter {
    /// Creates a writer rooted at `output_dir`. Nothing is created until a write.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// The root of the output tree.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Creates the output directory and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_output_dir(&self) -> Result<(), WriteError> {
        std::fs::create_dir_all(&self.output_dir).context(CreateDirSnafu {
            path: &self.output_dir,
        })
    }

    /// Location of a `/`-separated path relative to the output root.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::UnsafePath`] unless every component is a plain
    /// name free of control characters.
    pub fn target_path(&self, relative: &str) -> Result<PathBuf, WriteError> {
        let path = Path::new(relative);
        ensure!(
            path.components().next().is_some()
                && path.components().all(|c| matches!(c, Component::Normal(_)))
                && !relative.chars().any(char::is_control),
            UnsafePathSnafu { path: relative }
        );
        Ok(self.output_dir.join(path))
    }

    /// Writes a single organized file as its own document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its directory cannot be written.
    pub fn write_file(&self, file: &OrganizedFile) -> Result<PathBuf, WriteError> {
        self.write_document(&file.full_path(), &[file])
    }

    /// Writes all files, combining those that share a path.
    ///
    /// Returns the written paths in the order their first entry appeared.
    ///
    /// # Errors
    ///
    /// Stops at the first file that cannot be written.
    pub fn write_files(&self, files: &[OrganizedFile]) -> Result<Vec<PathBuf>, WriteError> {
        group_by_path(files)
            .into_iter()
            .map(|(relative, group)| self.write_document(&relative, &group))
            .collect()
    }

    fn write_document(&self, relative: &str, group: &[&OrganizedFile]) -> Result<PathBuf, WriteError> {
        let path = self.target_path(relative)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context(CreateDirSnafu { path: parent })?;
        }
        std::fs::write(&path, render_document(group)).context(WriteFileSnafu { path: &path })?;
        Ok(path)
    }
}

/// Groups files by relative output path, keeping first-seen order.
#[must_use]
pub fn group_by_path(files: &[OrganizedFile]) -> Vec<(String, Vec<&OrganizedFile>)> {
    let mut groups: Vec<(String, Vec<&OrganizedFile>)> = Vec::new();
    for file in files {
        let path = file.full_path();
        match groups.iter_mut().find(|(p, _)| *p == path) {
            Some((_, group)) => group.push(file),
            None => groups.push((path, vec![file])),
        }
    }
    groups
}

/// What a write would produce, without touching the disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSummary {
    /// Number of distinct markdown files.
    pub total_files: usize,

    /// Number of entries across all files.
    pub total_entries: usize,

    /// Relative paths of the files, in write order.
    pub file_paths: Vec<String>,

    /// Distinct non-root directories that would hold files.
    pub directories: BTreeSet<String>,
}

/// Summarizes the output of [`MarkdownWriter::write_files`] for `files`.
#[must_use]
pub fn output_summary(files: &[OrganizedFile]) -> OutputSummary {
    let file_paths: Vec<String> = group_by_path(files).into_iter().map(|(path, _)| path).collect();
    let directories = file_paths
        .iter()
        .filter_map(|path| path.rsplit_once('/').map(|(dir, _)| dir.to_owned()))
        .collect();

    OutputSummary {
        total_files: file_paths.len(),
        total_entries: files.len(),
        file_paths,
        directories,
    }
}
