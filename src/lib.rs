// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 The c2md contributors

//! Convert Context7 documentation exports to a tree of Markdown files.
//!
//! Context7 publishes library documentation as a single `llms.txt` file of
//! delimited entries, each carrying a title, description, source URL,
//! language and code snippet. This crate splits such an export into one
//! Markdown file per source page, laid out like the documentation site.
//!
//! # Overview
//!
//! 1. [`parser`] extracts entries from the export text
//! 2. [`url_mapper`] derives a directory path and filename from each source URL
//! 3. [`organizer`] groups entries by directory and numbers them in input order
//! 4. [`writer`] renders and writes the documents, [`index`] writes a table of contents
//!
//! # Example
//!
//! ```no_run
//! use c2md::index::IndexGenerator;
//! use c2md::organizer::{FileOrganizer, flatten};
//! use c2md::parser;
//! use c2md::url_mapper::UrlMapper;
//! use c2md::writer::MarkdownWriter;
//!
//! let entries = parser::parse_file("llms.txt".as_ref()).unwrap();
//!
//! let mut organizer = FileOrganizer::new(UrlMapper::new(false));
//! let files = flatten(&organizer.organize(&entries));
//!
//! MarkdownWriter::new("output").write_files(&files).unwrap();
//! IndexGenerator::new("output", false).generate_from_directory().unwrap();
//! ```
//!
//! # Modules
//!
//! - [`parser`]: Context7 export parsing
//! - [`url_mapper`]: Source URL to output path mapping
//! - [`organizer`]: Directory grouping and file numbering
//! - [`renderer`]: Markdown generation for documents and the index
//! - [`writer`]: Writing documents to disk
//! - [`index`]: Table of contents generation
//! - [`fetch`]: Downloading exports from context7.com

#![deny(missing_docs)]

pub mod fetch;
pub mod index;
pub mod organizer;
pub mod parser;
pub mod renderer;
pub mod url_mapper;
pub mod writer;
