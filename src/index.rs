// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 The c2md contributors

//! Table of contents generation for the output tree.
//!
//! The index page links every markdown file below the output directory,
//! grouped by directory. Titles come from the first heading of each file
//! when it can be read, and are otherwise derived from the filename.

use crate::organizer::OrganizedFile;
use crate::renderer::{render_index, title_case};
use regex::Regex;
use serde::Serialize;
use snafu::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

static RE_NUMBER_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+-").unwrap());

/// Index filename used when numeric prefixes are enabled.
pub const INDEX_FILENAME: &str = "000-index.md";

/// Index filename used in no-prefix mode.
pub const INDEX_FILENAME_NO_PREFIX: &str = "index.md";

/// Error type for index generation.
#[derive(Debug, Snafu)]
pub enum IndexError {
    /// The directory holding the index could not be created.
    #[snafu(display("failed to create directory {}: {source}", path.display()))]
    CreateDir {
        /// The directory that was being created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The index file could not be written.
    #[snafu(display("failed to write index {}: {source}", path.display()))]
    WriteFile {
        /// The index path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The output directory could not be traversed.
    #[snafu(display("failed to scan {}: {source}", path.display()))]
    Scan {
        /// The directory being scanned.
        path: PathBuf,
        /// The underlying traversal error.
        source: walkdir::Error,
    },
}

/// One link on the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexItem {
    /// Filename without directory.
    pub filename: String,

    /// Path relative to the output root, `/`-separated.
    pub path: String,

    /// Link text.
    pub title: String,
}

/// Index items keyed by directory; root files live under `"."`.
pub type IndexLayout = BTreeMap<String, Vec<IndexItem>>;

/// Overview of what an index would contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    /// Number of markdown files linked.
    pub total_files: usize,

    /// Number of directories, the root (`.`) included.
    pub total_directories: usize,

    /// Filename of the index page.
    pub index_filename: String,

    /// File count per directory.
    pub directory_breakdown: BTreeMap<String, usize>,
}

/// Writes the index page for an output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexGenerator {
    output_dir: PathBuf,
    index_filename: &'static str,
}

impl IndexGenerator {
    /// Creates a generator for `output_dir`.
    ///
    /// In no-prefix mode the index is named `index.md` instead of `000-index.md`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, no_prefix: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            index_filename: if no_prefix {
                INDEX_FILENAME_NO_PREFIX
            } else {
                INDEX_FILENAME
            },
        }
    }

    /// The directory the index describes.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Filename of the index page.
    #[must_use]
    pub const fn index_filename(&self) -> &str {
        self.index_filename
    }

    /// Default location of the index page.
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.output_dir.join(self.index_filename)
    }

    /// Groups relative markdown paths by directory, resolving their titles.
    ///
    /// Non-markdown paths are ignored and backslashes are treated as
    /// separators. Items within a directory are sorted by filename.
    #[must_use]
    pub fn organize_paths<S: AsRef<str>>(&self, paths: &[S]) -> IndexLayout {
        let mut layout = IndexLayout::new();

        for path in paths {
            let path = path.as_ref().replace('\\', "/");
            if !path.ends_with(".md") {
                continue;
            }

            let (directory, filename) = match path.rsplit_once('/') {
                Some((dir, file)) if !dir.is_empty() => (dir.to_owned(), file.to_owned()),
                Some((_, file)) => (".".to_owned(), file.to_owned()),
                None => (".".to_owned(), path.clone()),
            };
            let title = title_from_markdown(&self.output_dir.join(&path))
                .unwrap_or_else(|| title_from_filename(&filename));

            layout.entry(directory).or_default().push(IndexItem {
                filename,
                path,
                title,
            });
        }

        for items in layout.values_mut() {
            items.sort_by(|a, b| a.filename.cmp(&b.filename));
        }
        layout
    }

    /// Writes an index for `paths`, to `output_path` or the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the index or its parent directory cannot be written.
    pub fn generate_index<S: AsRef<str>>(
        &self,
        paths: &[S],
        output_path: Option<&Path>,
    ) -> Result<PathBuf, IndexError> {
        let layout = self.organize_paths(paths);
        let target = output_path.map_or_else(|| self.index_path(), Path::to_path_buf);
        write_index(&layout, target)
    }

    /// Writes an index for organized files, using entry titles as link text.
    ///
    /// Files sharing an output path are listed once, under the title of the
    /// first one.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be written.
    pub fn generate_from_organized(&self, files: &[OrganizedFile]) -> Result<PathBuf, IndexError> {
        let mut layout = IndexLayout::new();

        for file in files {
            let path = file.full_path();
            let directory = if file.directory.is_empty() {
                ".".to_owned()
            } else {
                file.directory.clone()
            };
            let items = layout.entry(directory).or_default();
            if items.iter().any(|item| item.path == path) {
                continue;
            }

            let title = file.entry.title.trim();
            items.push(IndexItem {
                filename: file.filename.clone(),
                path,
                title: if title.is_empty() {
                    title_from_filename(&file.filename)
                } else {
                    title.to_owned()
                },
            });
        }

        for items in layout.values_mut() {
            items.sort_by(|a, b| a.filename.cmp(&b.filename));
        }
        write_index(&layout, self.index_path())
    }

    /// Writes an index covering every markdown file under the output directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be scanned or the index
    /// cannot be written.
    pub fn generate_from_directory(&self) -> Result<PathBuf, IndexError> {
        let paths = self.scan_markdown_files()?;
        self.generate_index(&paths, None)
    }

    /// Lists markdown files below the output directory, relative and sorted.
    ///
    /// The index page itself is left out.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be traversed.
    pub fn scan_markdown_files(&self) -> Result<Vec<String>, IndexError> {
        let mut paths = Vec::new();

        for entry in WalkDir::new(&self.output_dir).sort_by_file_name() {
            let entry = entry.context(ScanSnafu {
                path: &self.output_dir,
            })?;
            if !entry.file_type().is_file()
                || entry.path().extension().is_none_or(|ext| ext != "md")
            {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&self.output_dir) else {
                continue;
            };
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if relative != self.index_filename {
                paths.push(relative);
            }
        }

        Ok(paths)
    }

    /// Summarizes the index for `paths` without writing anything.
    #[must_use]
    pub fn summary<S: AsRef<str>>(&self, paths: &[S]) -> IndexSummary {
        let layout = self.organize_paths(paths);
        IndexSummary {
            total_files: layout.values().map(Vec::len).sum(),
            total_directories: layout.len(),
            index_filename: self.index_filename.to_owned(),
            directory_breakdown: layout
                .iter()
                .map(|(directory, items)| (directory.clone(), items.len()))
                .collect(),
        }
    }
}

fn write_index(layout: &IndexLayout, path: PathBuf) -> Result<PathBuf, IndexError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context(CreateDirSnafu { path: parent })?;
    }
    std::fs::write(&path, render_index(layout)).context(WriteFileSnafu { path: &path })?;
    Ok(path)
}

/// Derives a display title from a markdown filename.
///
/// `002-advanced-features.md` becomes `Advanced Features`; an empty name
/// becomes `Untitled`.
#[must_use]
pub fn title_from_filename(filename: &str) -> String {
    let stem = filename.strip_suffix(".md").unwrap_or(filename);
    let stem = RE_NUMBER_PREFIX.replace(stem, "");
    let words: Vec<&str> = stem.split(['-', '_', ' ']).filter(|w| !w.is_empty()).collect();

    if words.is_empty() {
        "Untitled".to_owned()
    } else {
        title_case(&words.join(" "))
    }
}

/// Returns the text of the first heading in the markdown file at `path`.
///
/// Yields `None` if the file cannot be read, has no heading, or the first
/// heading is empty.
#[must_use]
pub fn title_from_markdown(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let heading = content
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with('#'))?;
    let title = heading.trim_start_matches('#').trim();
    (!title.is_empty()).then(|| title.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParsedEntry;
    use tempfile::TempDir;

    fn sample_paths() -> Vec<&'static str> {
        vec![
            "examples/001-get-started.md",
            "examples/002-advanced-features.md",
            "guides/001-installation.md",
            "guides/002-configuration.md",
            "api/001-authentication.md",
            "reference.md",
        ]
    }

    fn setup() -> (TempDir, IndexGenerator) {
        let dir = tempfile::tempdir().unwrap();
        let generator = IndexGenerator::new(dir.path(), false);
        (dir, generator)
    }

    #[test]
    fn names_index_by_prefix_mode() {
        assert_eq!(IndexGenerator::new("out", false).index_filename(), "000-index.md");
        assert_eq!(IndexGenerator::new("out", true).index_filename(), "index.md");
        assert_eq!(
            IndexGenerator::new("out", false).index_path(),
            Path::new("out/000-index.md")
        );
    }

    #[test]
    fn organizes_paths_by_directory() {
        let (_dir, generator) = setup();
        let layout = generator.organize_paths(&sample_paths());

        let keys: Vec<_> = layout.keys().map(String::as_str).collect();
        assert_eq!(keys, [".", "api", "examples", "guides"]);
        assert_eq!(layout["examples"].len(), 2);
        assert_eq!(layout["."].len(), 1);

        let first = &layout["examples"][0];
        assert_eq!(first.filename, "001-get-started.md");
        assert_eq!(first.path, "examples/001-get-started.md");
        assert_eq!(first.title, "Get Started");
    }

    #[test]
    fn filters_non_markdown_and_sorts_by_filename() {
        let (_dir, generator) = setup();
        let layout = generator.organize_paths(&[
            "docs/003-third.md",
            "docs/image.png",
            "docs/001-first.md",
            "README.txt",
            "docs/002-second.md",
        ]);

        let names: Vec<_> = layout["docs"].iter().map(|i| i.filename.as_str()).collect();
        assert_eq!(names, ["001-first.md", "002-second.md", "003-third.md"]);
        assert!(!layout.contains_key("."));
    }

    #[test]
    fn normalizes_backslashes() {
        let (_dir, generator) = setup();
        let layout = generator.organize_paths(&["docs\\windows\\001-file.md", "docs/unix/001-file.md"]);

        assert!(layout.contains_key("docs/windows"));
        assert!(layout.contains_key("docs/unix"));
    }

    #[test]
    fn derives_titles_from_filenames() {
        let cases = [
            ("001-get-started.md", "Get Started"),
            ("002-advanced-features.md", "Advanced Features"),
            ("installation-guide.md", "Installation Guide"),
            ("api_reference.md", "Api Reference"),
            ("simple.md", "Simple"),
            ("123-complex-file-name.md", "Complex File Name"),
            ("no-extension", "No Extension"),
            ("", "Untitled"),
        ];
        for (filename, expected) in cases {
            assert_eq!(title_from_filename(filename), expected, "filename: {filename:?}");
        }
    }

    #[test]
    fn reads_titles_from_markdown_headings() {
        let (dir, _generator) = setup();
        let cases = [
            ("# Main Title\n\nSome content.\n\n## Subtitle\n", Some("Main Title")),
            ("Just text.\n\nNo headings here.\n", None),
            ("# ", None),
            ("##", None),
            ("#NoSpace", Some("NoSpace")),
            ("# Multiple # Hash # Marks", Some("Multiple # Hash # Marks")),
        ];
        for (i, (content, expected)) in cases.into_iter().enumerate() {
            let path = dir.path().join(format!("case-{i}.md"));
            std::fs::write(&path, content).unwrap();
            assert_eq!(title_from_markdown(&path).as_deref(), expected, "content: {content:?}");
        }
        assert!(title_from_markdown(&dir.path().join("missing.md")).is_none());
    }

    #[test]
    fn prefers_heading_on_disk_over_filename() {
        let (dir, generator) = setup();
        std::fs::create_dir_all(dir.path().join("api")).unwrap();
        std::fs::write(dir.path().join("api/001-auth.md"), "# Authenticating Requests\n").unwrap();

        let layout = generator.organize_paths(&["api/001-auth.md"]);
        assert_eq!(layout["api"][0].title, "Authenticating Requests");
    }

    #[test]
    fn writes_index_file() {
        let (dir, generator) = setup();
        let path = generator.generate_index(&sample_paths(), None).unwrap();

        assert_eq!(path, dir.path().join("000-index.md"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# Documentation Index"));
        assert!(content.contains("### examples/"));
        assert!(content.contains("- [Get Started](examples/001-get-started.md)"));
        assert!(content.contains("- [Reference](reference.md)"));
    }

    #[test]
    fn writes_index_to_custom_path() {
        let (dir, generator) = setup();
        let custom = dir.path().join("nested/custom-index.md");
        let path = generator.generate_index(&sample_paths(), Some(&custom)).unwrap();

        assert_eq!(path, custom);
        assert!(custom.exists());
    }

    #[test]
    fn writes_skeleton_for_empty_list() {
        let (_dir, generator) = setup();
        let path = generator.generate_index::<&str>(&[], None).unwrap();
        let content = std::fs::read_to_string(path).unwrap();

        assert!(content.contains("## Table of Contents"));
        assert!(content.contains("*Generated by Context7-to-Markdown CLI Tool*"));
    }

    #[test]
    fn uses_entry_titles_for_organized_files() {
        let (_dir, generator) = setup();
        let file = OrganizedFile {
            entry: ParsedEntry {
                title: "Test Documentation".into(),
                source: "https://example.com/docs/examples/test".into(),
                ..Default::default()
            },
            directory: "examples".into(),
            filename: "001-test-doc.md".into(),
            number: 1,
        };
        let mut duplicate = file.clone();
        duplicate.entry.title = "Second Title".into();

        let path = generator.generate_from_organized(&[file, duplicate]).unwrap();
        let content = std::fs::read_to_string(path).unwrap();

        assert!(content.contains("- [Test Documentation](examples/001-test-doc.md)"));
        assert!(!content.contains("Second Title"));
    }

    #[test]
    fn scans_output_directory_without_index() {
        let (dir, generator) = setup();
        std::fs::create_dir_all(dir.path().join("guides")).unwrap();
        std::fs::write(dir.path().join("guides/001-setup.md"), "# Setup\n").unwrap();
        std::fs::write(dir.path().join("001-intro.md"), "# Intro\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::write(dir.path().join("000-index.md"), "old index").unwrap();

        assert_eq!(
            generator.scan_markdown_files().unwrap(),
            ["001-intro.md", "guides/001-setup.md"]
        );

        let path = generator.generate_from_directory().unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("- [Intro](001-intro.md)"));
        assert!(content.contains("### guides/\n\n- [Setup](guides/001-setup.md)"));
    }

    #[test]
    fn scanning_missing_directory_fails() {
        let generator = IndexGenerator::new("/non/existent/output", false);
        assert!(matches!(
            generator.scan_markdown_files(),
            Err(IndexError::Scan { .. })
        ));
    }

    #[test]
    fn summarizes_without_writing() {
        let (dir, generator) = setup();
        let summary = generator.summary(&sample_paths());

        assert_eq!(summary.total_files, 6);
        assert_eq!(summary.total_directories, 4);
        assert_eq!(summary.index_filename, "000-index.md");
        assert_eq!(summary.directory_breakdown["examples"], 2);
        assert!(!dir.path().join("000-index.md").exists());

        let empty = generator.summary::<&str>(&[]);
        assert_eq!(empty.total_files, 0);
        assert!(empty.directory_breakdown.is_empty());
    }
}
