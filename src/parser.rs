// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 The c2md contributors

//! Parsing of Context7 documentation exports.
//!
//! A Context7 export is plain text made of entries separated by a line of
//! forty dashes. Each entry is a loose sequence of `KEYWORD: value` lines
//! followed by a `CODE:` marker and the code snippet itself.
//!
//! # Format Overview
//!
//! ```text
//! TITLE: Connect to the database
//! DESCRIPTION: Opens a pooled connection using
//! the URL from the environment.
//! SOURCE: https://example.com/docs/database/connect
//! LANGUAGE: python
//! CODE:
//! pool = connect(os.environ["DATABASE_URL"])
//! ----------------------------------------
//! TITLE: ...
//! ```
//!
//! Keywords are matched case-insensitively. Description lines that do not
//! start with a keyword are folded into a single space-separated run. Code is
//! taken verbatim up to the next delimiter.
//!
//! Entries without a title or without an absolute `http`/`https` source URL
//! are dropped. Every entry the parser attempts still consumes a slot in
//! [`ParsedEntry::original_order`], so the order numbers of kept entries may
//! have gaps.
//!
//! # Example
//!
//! ```
//! use c2md::parser::parse_entries;
//!
//! let text = "TITLE: A\nSOURCE: https://x.com/docs/a/b\nCODE:\nfoo\n";
//! let entries = parse_entries(text);
//!
//! assert_eq!(entries.len(), 1);
//! assert_eq!(entries[0].title, "A");
//! assert_eq!(entries[0].code, "foo");
//! ```

use crate::fetch::is_url;
use regex::Regex;
use snafu::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// The line separating two entries in an export.
pub const ENTRY_DELIMITER: &str = "----------------------------------------";

static RE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(title|description|source|language|code)\s*:(.*)$").unwrap()
});

/// Error type for reading an export from disk.
///
/// Malformed entries never produce an error; they are skipped.
#[derive(Debug, Snafu)]
pub enum ParseError {
    /// The input file does not exist.
    #[snafu(display("file not found: {}", path.display()))]
    NotFound {
        /// The path that was requested.
        path: PathBuf,
    },

    /// The input file exists but could not be read.
    #[snafu(display("error reading file {}: {source}", path.display()))]
    Read {
        /// The path that was requested.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// One documentation record extracted from an export.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedEntry {
    /// Entry title, never empty.
    pub title: String,

    /// Description with continuation lines joined by single spaces.
    pub description: String,

    /// Absolute `http`/`https` URL of the page the entry came from.
    pub source: String,

    /// Language tag of the code snippet, as written in the export.
    pub language: String,

    /// Code snippet with surrounding blank lines removed.
    pub code: String,

    /// Zero-based position among all entries the parser attempted.
    pub original_order: usize,
}

/// Which part of an entry the next plain line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingField,
    ReadingDescription,
    ReadingCode,
}

/// Fields collected for the entry currently being scanned.
#[derive(Debug, Default)]
struct Draft {
    title: String,
    description: Vec<String>,
    source: String,
    language: String,
    code: Vec<String>,
    has_content: bool,
}

impl Draft {
    /// Validates the draft and turns it into an entry stamped with `order`.
    fn finish(self, order: usize) -> Option<ParsedEntry> {
        if self.title.is_empty() {
            debug!(order, "dropping entry without title");
            return None;
        }
        if !is_url(&self.source) {
            debug!(order, title = %self.title, source = %self.source, "dropping entry with invalid source URL");
            return None;
        }

        Some(ParsedEntry {
            title: self.title,
            description: self.description.join(" "),
            source: self.source,
            language: self.language,
            code: trim_blank_lines(&self.code),
            original_order: order,
        })
    }
}

/// Scanner state for one parse call.
struct EntryScanner {
    state: State,
    draft: Draft,
    attempted: usize,
    entries: Vec<ParsedEntry>,
}

impl EntryScanner {
    fn new() -> Self {
        Self {
            state: State::AwaitingField,
            draft: Draft::default(),
            attempted: 0,
            entries: Vec::new(),
        }
    }

    fn feed(&mut self, line: &str) {
        if line.trim() == ENTRY_DELIMITER {
            self.flush();
            return;
        }

        if self.state == State::ReadingCode {
            self.draft.code.push(line.to_owned());
            return;
        }

        if let Some(caps) = RE_FIELD.captures(line) {
            let value = caps[2].trim().to_owned();
            self.draft.has_content = true;
            self.state = match caps[1].to_ascii_lowercase().as_str() {
                "title" => {
                    self.draft.title = value;
                    State::AwaitingField
                }
                "description" => {
                    self.draft.description.clear();
                    if !value.is_empty() {
                        self.draft.description.push(value);
                    }
                    State::ReadingDescription
                }
                "source" => {
                    self.draft.source = value;
                    State::AwaitingField
                }
                "language" => {
                    self.draft.language = value;
                    State::AwaitingField
                }
                _ => {
                    // Text after `CODE:` on the marker line is the first code line.
                    if !value.is_empty() {
                        self.draft.code.push(value);
                    }
                    State::ReadingCode
                }
            };
            return;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }
        self.draft.has_content = true;
        if self.state == State::ReadingDescription {
            self.draft.description.push(trimmed.to_owned());
        }
    }

    /// Ends the current entry. Blocks with no content at all are not attempts.
    fn flush(&mut self) {
        let draft = std::mem::take(&mut self.draft);
        self.state = State::AwaitingField;
        if !draft.has_content {
            return;
        }

        let order = self.attempted;
        self.attempted += 1;
        if let Some(entry) = draft.finish(order) {
            self.entries.push(entry);
        }
    }

    fn finish(mut self) -> Vec<ParsedEntry> {
        self.flush();
        debug!(
            attempted = self.attempted,
            kept = self.entries.len(),
            "parsed Context7 entries"
        );
        self.entries
    }
}

/// Parses Context7 text into its valid entries, in input order.
///
/// Each call starts its order counter at zero, so parsing the same text twice
/// yields identical results.
#[must_use]
pub fn parse_entries(text: &str) -> Vec<ParsedEntry> {
    let mut scanner = EntryScanner::new();
    for line in text.lines() {
        scanner.feed(line);
    }
    scanner.finish()
}

/// Reads and parses a Context7 export from `path`.
///
/// # Errors
///
/// Returns [`ParseError::NotFound`] if the file does not exist and
/// [`ParseError::Read`] for any other I/O failure.
pub fn parse_file(path: &Path) -> Result<Vec<ParsedEntry>, ParseError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return NotFoundSnafu { path }.fail();
        }
        Err(source) => return Err(source).context(ReadSnafu { path }),
    };
    Ok(parse_entries(&text))
}

/// Joins code lines, dropping blank lines at the start and trailing
/// whitespace at the end. Indentation of the first line is kept.
fn trim_blank_lines(lines: &[String]) -> String {
    let start = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len());
    lines[start..].join("\n").trim_end().to_owned()
}
