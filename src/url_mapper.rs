// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 The c2md contributors

//! Output path derivation from documentation source URLs.
//!
//! Every Context7 entry carries the URL of the page it was extracted from.
//! The [`UrlMapper`] turns that URL into a relative path inside the output
//! tree, so entries from `https://example.com/docs/api/auth` end up under
//! `api/auth`.
//!
//! # Anchor segments
//!
//! Most documentation sites keep their pages below a well-known segment such
//! as `docs` or `reference`. The mapper scans the URL path left to right and
//! cuts at the first segment that equals one of [`ANCHOR_SEGMENTS`] (ignoring
//! case). Only whole segments match, so `docset` is not an anchor. When no
//! anchor is present the whole path is kept.
//!
//! # Example
//!
//! ```
//! use c2md::url_mapper::UrlMapper;
//!
//! let mapper = UrlMapper::new(false);
//! let path = mapper.extract_path("https://neon.com/docs/data-api/get-started").unwrap();
//! assert_eq!(path, "data-api/get-started");
//!
//! let name = mapper.numbered_filename("https://neon.com/docs/data-api/get-started", 7).unwrap();
//! assert_eq!(name, "007-get-started.md");
//! ```

use percent_encoding::percent_decode_str;
use snafu::prelude::*;
use url::Url;

/// Path segments that mark the root of a documentation tree.
///
/// Scanned in URL order; the first segment equal to any of these wins, even
/// if a later segment is also an anchor.
pub const ANCHOR_SEGMENTS: [&str; 6] = [
    "docs",
    "documentation",
    "guide",
    "guides",
    "api",
    "reference",
];

/// Slug used when a URL yields no path segment to name a file after.
pub const FALLBACK_SLUG: &str = "index";

/// Error type for URLs that cannot be mapped to an output path.
#[derive(Debug, Snafu)]
pub enum UrlMapperError {
    /// The URL was empty or only whitespace.
    #[snafu(display("URL is empty"))]
    Empty,

    /// The URL could not be parsed at all.
    #[snafu(display("invalid URL {url:?}: {source}"))]
    Invalid {
        /// The rejected input.
        url: String,
        /// The underlying URL parsing error.
        source: url::ParseError,
    },

    /// The URL uses a scheme other than `http` or `https`.
    #[snafu(display("unsupported scheme {scheme:?} in {url:?} (expected http or https)"))]
    UnsupportedScheme {
        /// The rejected input.
        url: String,
        /// The scheme found in the URL.
        scheme: String,
    },

    /// The URL has no host component.
    #[snafu(display("URL {url:?} has no host"))]
    MissingHost {
        /// The rejected input.
        url: String,
    },
}

/// Maps documentation URLs to relative paths and numbered filenames.
///
/// The mapper holds a single option, fixed at construction: whether numbered
/// filenames drop their numeric prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrlMapper {
    no_prefix: bool,
}

impl UrlMapper {
    /// Creates a mapper. With `no_prefix` set, filenames omit the `NNN-` prefix.
    #[must_use]
    pub const fn new(no_prefix: bool) -> Self {
        Self { no_prefix }
    }

    /// Returns `true` if filenames are generated without a numeric prefix.
    #[must_use]
    pub const fn no_prefix(&self) -> bool {
        self.no_prefix
    }

    /// Derives the normalized relative path for a documentation URL.
    ///
    /// The result has no leading, trailing or doubled `/`, is percent-decoded
    /// and has spaces replaced by `-`. An empty string means the entry belongs
    /// at the root of the output tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is empty, unparsable, not `http`/`https`,
    /// or has no host.
    pub fn extract_path(&self, url: &str) -> Result<String, UrlMapperError> {
        let parsed = parse_doc_url(url)?;
        let segments: Vec<&str> = parsed
            .path()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        let start = match anchor_position(&segments) {
            Some(pos) if pos + 1 < segments.len() => pos + 1,
            // A bare anchor such as `/docs/` is the documentation root itself.
            Some(_) if segments.len() == 1 => segments.len(),
            _ => 0,
        };

        Ok(clean_path(&segments[start..].join("/")))
    }

    /// Returns the first segment of [`extract_path`](Self::extract_path).
    ///
    /// Single-segment paths have no directory, so the result is empty.
    ///
    /// # Errors
    ///
    /// Fails for the same inputs as [`extract_path`](Self::extract_path).
    pub fn extract_main_directory(&self, url: &str) -> Result<String, UrlMapperError> {
        let path = self.extract_path(url)?;
        Ok(path
            .split_once('/')
            .map_or_else(String::new, |(first, _)| first.to_owned()))
    }

    /// Splits [`extract_path`](Self::extract_path) into directory and last segment.
    ///
    /// Joining the two with `/` (or taking the file alone when the directory
    /// is empty) gives back the full path.
    ///
    /// # Errors
    ///
    /// Fails for the same inputs as [`extract_path`](Self::extract_path).
    pub fn extract_file_path(&self, url: &str) -> Result<(String, String), UrlMapperError> {
        let path = self.extract_path(url)?;
        Ok(match path.rsplit_once('/') {
            Some((dir, file)) => (dir.to_owned(), file.to_owned()),
            None => (String::new(), path),
        })
    }

    /// Builds the markdown filename for the entry at `number` within its directory.
    ///
    /// The name comes from the last path segment, or [`FALLBACK_SLUG`] when
    /// the URL points at a root.
    ///
    /// # Errors
    ///
    /// Fails for the same inputs as [`extract_path`](Self::extract_path).
    pub fn numbered_filename(&self, url: &str, number: usize) -> Result<String, UrlMapperError> {
        let path = self.extract_path(url)?;
        let slug = path
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or(FALLBACK_SLUG);
        Ok(self.filename_for(slug, number))
    }

    /// Formats `slug` as a markdown filename, honoring the prefix setting.
    ///
    /// Numbers are zero-padded to three digits; wider numbers print in full.
    #[must_use]
    pub fn filename_for(&self, slug: &str, number: usize) -> String {
        if self.no_prefix {
            format!("{slug}.md")
        } else {
            format!("{number:03}-{slug}.md")
        }
    }
}

/// Parses `url` and checks it is an absolute `http`/`https` URL with a host.
fn parse_doc_url(url: &str) -> Result<Url, UrlMapperError> {
    ensure!(!url.trim().is_empty(), EmptySnafu);

    let parsed = Url::parse(url.trim()).context(InvalidSnafu { url })?;
    ensure!(
        matches!(parsed.scheme(), "http" | "https"),
        UnsupportedSchemeSnafu {
            url,
            scheme: parsed.scheme(),
        }
    );
    ensure!(
        parsed.host_str().is_some_and(|host| !host.is_empty()),
        MissingHostSnafu { url }
    );

    Ok(parsed)
}

/// Index of the first segment that is an anchor, compared case-insensitively.
fn anchor_position(segments: &[&str]) -> Option<usize> {
    segments.iter().position(|segment| {
        ANCHOR_SEGMENTS
            .iter()
            .any(|anchor| segment.eq_ignore_ascii_case(anchor))
    })
}

/// Decodes `raw` and keeps only segments that are safe as path components.
///
/// Decoding can reintroduce `/`, `.` and `..` that the URL parser already
/// resolved, so dot segments are dropped after decoding. Control characters
/// are removed.
fn clean_path(raw: &str) -> String {
    let decoded: String = percent_decode_str(raw)
        .decode_utf8_lossy()
        .chars()
        .filter(|c| !c.is_control())
        .collect();
    decoded
        .replace(' ', "-")
        .split(['/', '\\'])
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .collect::<Vec<_>>()
        .join("/")
}
