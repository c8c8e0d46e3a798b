// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 The c2md contributors

//! Downloading Context7 exports from context7.com.
//!
//! Besides local files, the CLI accepts project URLs such as
//! `https://context7.com/vercel/next.js`. These are rewritten to the
//! project's `llms.txt` export with a `tokens` parameter large enough to
//! return the whole document, then fetched with a blocking request.

use snafu::prelude::*;
use std::io::Read;
use std::time::Duration;
use url::Url;

/// Host serving Context7 exports.
pub const CONTEXT7_HOST: &str = "context7.com";

/// `tokens` value requested when the URL does not set one.
pub const DEFAULT_TOKENS: &str = "999999999";

const EXPORT_FILENAME: &str = "llms.txt";
const TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Error type for remote input.
#[derive(Debug, Snafu)]
pub enum FetchError {
    /// The URL is not a context7.com project URL.
    #[snafu(display(
        "{url} is not a Context7 project URL (expected https://{CONTEXT7_HOST}/<org>/<project>)"
    ))]
    NotContext7 {
        /// The rejected URL.
        url: String,
    },

    /// The server answered with an error status.
    #[snafu(display("HTTP error {status} fetching {url}"))]
    Status {
        /// The requested URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The request failed before a response arrived.
    #[snafu(display("connection error fetching {url}: {source}"))]
    Transport {
        /// The requested URL.
        url: String,
        /// The underlying transport error.
        #[snafu(source(from(ureq::Transport, Box::new)))]
        source: Box<ureq::Transport>,
    },

    /// The response body could not be read as text.
    #[snafu(display("failed to read response from {url}: {source}"))]
    Body {
        /// The requested URL.
        url: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Returns `true` if `input` is an absolute `http`/`https` URL with a host.
#[must_use]
pub fn is_url(input: &str) -> bool {
    Url::parse(input).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https")
            && url.host_str().is_some_and(|host| !host.is_empty())
    })
}

/// Turns a context7.com project URL into the URL of its full export.
///
/// The path must name at least `<org>/<project>`. `llms.txt` is appended
/// when missing and a `tokens` parameter is added unless one is present.
///
/// # Errors
///
/// Returns [`FetchError::NotContext7`] for any other URL.
pub fn context7_download_url(input: &str) -> Result<String, FetchError> {
    let mut url = Url::parse(input)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .filter(|url| url.host_str() == Some(CONTEXT7_HOST))
        .context(NotContext7Snafu { url: input })?;

    let mut segments: Vec<String> = url
        .path()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect();
    if segments.last().is_some_and(|last| last == EXPORT_FILENAME) {
        segments.pop();
    }
    ensure!(segments.len() >= 2, NotContext7Snafu { url: input });

    segments.push(EXPORT_FILENAME.to_owned());
    url.set_path(&segments.join("/"));
    Ok(with_tokens(url).into())
}

/// Adds `tokens=999999999` to `url` unless it already has a `tokens` parameter.
///
/// Unparsable input is returned unchanged.
#[must_use]
pub fn ensure_tokens_parameter(url: &str) -> String {
    Url::parse(url).map_or_else(|_| url.to_owned(), |parsed| with_tokens(parsed).into())
}

fn with_tokens(mut url: Url) -> Url {
    if !url.query_pairs().any(|(key, _)| key == "tokens") {
        url.query_pairs_mut().append_pair("tokens", DEFAULT_TOKENS);
    }
    url
}

/// Downloads the export at `url` as text.
///
/// # Errors
///
/// Returns an error for error statuses, connection failures and bodies that
/// are not valid UTF-8.
pub fn download(url: &str) -> Result<String, FetchError> {
    let url = ensure_tokens_parameter(url);
    tracing::debug!(%url, "downloading Context7 export");

    let response = match ureq::get(&url)
        .timeout(TIMEOUT)
        .set("User-Agent", USER_AGENT)
        .call()
    {
        Ok(response) => response,
        Err(ureq::Error::Status(status, _)) => return StatusSnafu { url, status }.fail(),
        Err(ureq::Error::Transport(transport)) => {
            return Err(transport).context(TransportSnafu { url });
        }
    };

    let mut body = String::new();
    response
        .into_reader()
        .read_to_string(&mut body)
        .context(BodySnafu { url: &url })?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;

    /// Serves one canned HTTP response on a local port and returns its base URL.
    fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn detects_urls() {
        assert!(is_url("https://context7.com/project/llms.txt"));
        assert!(is_url("http://example.com"));
        assert!(!is_url("not-a-url"));
        assert!(!is_url("/path/to/file"));
        assert!(!is_url("file.txt"));
        assert!(!is_url(""));
        assert!(!is_url("ftp://example.com/file"));
    }

    #[test]
    fn rewrites_context7_project_urls() {
        assert_eq!(
            context7_download_url("https://context7.com/org/project/llms.txt").unwrap(),
            "https://context7.com/org/project/llms.txt?tokens=999999999"
        );
        assert_eq!(
            context7_download_url("https://context7.com/org/project").unwrap(),
            "https://context7.com/org/project/llms.txt?tokens=999999999"
        );
        assert_eq!(
            context7_download_url("http://context7.com/vercel/next.js").unwrap(),
            "http://context7.com/vercel/next.js/llms.txt?tokens=999999999"
        );
    }

    #[test]
    fn keeps_existing_tokens_parameter() {
        assert_eq!(
            context7_download_url("https://context7.com/org/project/llms.txt?tokens=12345")
                .unwrap(),
            "https://context7.com/org/project/llms.txt?tokens=12345"
        );
    }

    #[test]
    fn rejects_non_context7_urls() {
        for url in [
            "https://example.com/org/project/llms.txt",
            "https://context7.com/project/llms.txt",
            "https://context7.com/project",
            "https://context7.com/",
            "not-a-url",
        ] {
            assert!(
                matches!(context7_download_url(url), Err(FetchError::NotContext7 { .. })),
                "url: {url}"
            );
        }
    }

    #[test]
    fn adds_tokens_parameter() {
        let result = ensure_tokens_parameter("https://context7.com/project/llms.txt");
        assert!(result.contains("tokens=999999999"));

        let result = ensure_tokens_parameter("https://context7.com/project/llms.txt?tokens=12345");
        assert!(result.contains("tokens=12345"));
        assert!(!result.contains("tokens=999999999"));

        let result = ensure_tokens_parameter("https://context7.com/project/llms.txt?other=value");
        assert!(result.contains("other=value"));
        assert!(result.contains("tokens=999999999"));

        assert_eq!(ensure_tokens_parameter("not a url"), "not a url");
    }

    #[test]
    fn downloads_body() {
        let body = "TITLE: Test\nSOURCE: https://example.com/docs/test\n";
        let base = serve_once(format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        ));

        let content = download(&format!("{base}/org/project/llms.txt")).unwrap();
        assert_eq!(content, body);
    }

    #[test]
    fn reports_http_status_errors() {
        let base = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_owned(),
        );

        let err = download(&format!("{base}/missing/project/llms.txt")).unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert!(err.to_string().contains("HTTP error 404"));
    }

    #[test]
    fn reports_connection_errors() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = download(&format!("http://{addr}/org/project/llms.txt")).unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(err.to_string().contains("connection error"));
    }
}
