// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 The c2md contributors

//! Markdown rendering for organized entries and the index page.
//!
//! This module only builds strings; writing them to disk is the job of
//! [`crate::writer`] and [`crate::index`].
//!
//! # Output Format
//!
//! A document combines every entry that maps to the same file:
//! - A top-level `#` heading with the first entry's title
//! - A `##` section per entry with its description
//! - A `###` language heading followed by a fenced code block
//! - A closing `*Source: ...*` attribution
//!
//! # Example
//!
//! ```
//! use c2md::organizer::OrganizedFile;
//! use c2md::parser::ParsedEntry;
//! use c2md::renderer::render_document;
//!
//! let file = OrganizedFile {
//!     entry: ParsedEntry {
//!         title: "Connect".into(),
//!         source: "https://example.com/docs/db/connect".into(),
//!         language: "py".into(),
//!         code: "connect()".into(),
//!         ..Default::default()
//!     },
//!     directory: "db".into(),
//!     filename: "001-connect.md".into(),
//!     number: 1,
//! };
//!
//! let markdown = render_document(&[&file]);
//! assert!(markdown.starts_with("# Connect\n"));
//! assert!(markdown.contains("```python\nconnect()\n```"));
//! ```

use crate::index::IndexLayout;
use crate::organizer::OrganizedFile;
use std::fmt::Write;

const UNTITLED: &str = "Untitled";

/// Footer line closing every index page.
pub const INDEX_FOOTER: &str = "*Generated by Context7-to-Markdown CLI Tool*";

/// Renders the markdown document for files that share one output path.
///
/// Entries are emitted in numbering order. The source attribution of the
/// first entry closes the document. An empty slice renders as an empty string.
#[must_use]
pub fn render_document(files: &[&OrganizedFile]) -> String {
    let mut sorted = files.to_vec();
    sorted.sort_by_key(|file| file.number);

    let Some(first) = sorted.first() else {
        return String::new();
    };

    let mut parts = vec![format!("# {}\n", title_or_default(&first.entry.title))];

    for file in &sorted {
        let entry = &file.entry;
        parts.push(format!("## {}\n", title_or_default(&entry.title)));

        let description = entry.description.trim();
        if !description.is_empty() {
            parts.push(format!("{description}\n"));
        }

        let code = entry.code.trim();
        if !code.is_empty() {
            let language = clean_language(&entry.language);
            let heading = if language.is_empty() {
                "Code".to_owned()
            } else {
                title_case(&language)
            };
            parts.push(format!("### {heading}\n"));
            parts.push(fenced_code(code, &language));
        }
    }

    let source = first.entry.source.trim();
    if !source.is_empty() {
        parts.push("---\n".to_owned());
        parts.push(format!("*Source: {source}*\n"));
    }

    parts.join("\n")
}

/// Renders the table of contents for the output tree.
///
/// Root files come first without a heading, then one `###` section per
/// directory in alphabetical order. Directories without files are skipped.
#[must_use]
pub fn render_index(layout: &IndexLayout) -> String {
    let mut out = String::new();
    writeln!(out, "# Documentation Index\n").unwrap();
    writeln!(out, "## Table of Contents\n").unwrap();

    if let Some(root) = layout.get(".").filter(|items| !items.is_empty()) {
        for item in root {
            writeln!(out, "- [{}]({})", item.title, item.path).unwrap();
        }
        out.push('\n');
    }

    for (directory, items) in layout {
        if directory == "." || items.is_empty() {
            continue;
        }
        writeln!(out, "### {directory}/\n").unwrap();
        for item in items {
            writeln!(out, "- [{}]({})", item.title, item.path).unwrap();
        }
        out.push('\n');
    }

    writeln!(out, "---\n").unwrap();
    writeln!(out, "{INDEX_FOOTER}").unwrap();
    out
}

/// Normalizes a language tag for use after a code fence.
///
/// Lowercases and trims the tag, then maps common aliases (`js`, `py`,
/// `c++`, `sh`, ...) to their canonical names. Unknown tags pass through.
#[must_use]
pub fn clean_language(language: &str) -> String {
    let cleaned = language.trim().to_lowercase();
    let canonical = match cleaned.as_str() {
        "js" => "javascript",
        "ts" => "typescript",
        "py" => "python",
        "c++" => "cpp",
        "c#" => "csharp",
        "shell" | "sh" => "bash",
        "yml" => "yaml",
        "md" => "markdown",
        other => other,
    };
    canonical.to_owned()
}

/// Capitalizes the first letter of every alphabetic run, lowercasing the rest.
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

fn title_or_default(title: &str) -> &str {
    let trimmed = title.trim();
    if trimmed.is_empty() { UNTITLED } else { trimmed }
}

/// Wraps `code` in a backtick fence longer than any backtick run it contains.
fn fenced_code(code: &str, language: &str) -> String {
    let fence = "`".repeat(longest_backtick_run(code).max(2) + 1);
    format!("{fence}{language}\n{code}\n{fence}\n")
}

fn longest_backtick_run(s: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in s.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
