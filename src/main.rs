// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 The c2md contributors

//! Command-line interface for c2md.
//!
//! This binary provides the `c2md` command for converting a Context7
//! `llms.txt` export, local or downloaded from context7.com, into a tree of
//! Markdown files.

use c2md::fetch::{self, FetchError};
use c2md::index::{IndexGenerator, IndexSummary};
use c2md::organizer::{self, DirectorySummary, FileOrganizer, OrganizedStructure};
use c2md::parser::{self, ParseError, ParsedEntry};
use c2md::url_mapper::UrlMapper;
use c2md::writer::{self, MarkdownWriter, OutputSummary, WriteError};
use lexopt::prelude::*;
use serde::Serialize;
use snafu::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, debug, warn};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_OUTPUT_DIR: &str = "output";

/// Where the export comes from.
enum Input {
    /// A local `llms.txt` file.
    File(PathBuf),
    /// A context7.com project URL.
    Url(String),
}

impl Input {
    fn label(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Url(url) => url.clone(),
        }
    }
}

#[allow(clippy::struct_excessive_bools)]
struct Cli {
    input: Input,
    directory: PathBuf,
    tree: bool,
    no_prefix: bool,
    dry_run: bool,
    json: bool,
    quiet: bool,
    verbose: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("failed to initialize logging: {source}"))]
    Logging {
        source: tracing::subscriber::SetGlobalDefaultError,
    },

    #[snafu(display("input file not found: {}", path.display()))]
    InputNotFound { path: PathBuf },

    #[snafu(display("input is not a file: {}", path.display()))]
    InputNotFile { path: PathBuf },

    #[snafu(display("{source}"))]
    Fetch { source: FetchError },

    #[snafu(display("{source}"))]
    Parse { source: ParseError },

    #[snafu(display("{source}"))]
    Write { source: WriteError },

    #[snafu(display("failed to serialize plan: {source}"))]
    Json { source: serde_json::Error },
}

impl Error {
    const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ParseArgs { .. } => Some("run with --help for usage"),
            Self::InputNotFound { .. } | Self::InputNotFile { .. } => {
                Some("pass the path of a Context7 llms.txt export or a context7.com URL")
            }
            Self::Fetch {
                source: FetchError::NotContext7 { .. },
            } => Some("use a URL of the form https://context7.com/<org>/<project>"),
            Self::Fetch { .. } => {
                Some("check the network connection and that the project exists on context7.com")
            }
            Self::Parse { .. } => Some("check that the input file is readable"),
            Self::Write { .. } => Some("check that the output directory is writable"),
            Self::Logging { .. } | Self::Json { .. } => None,
        }
    }
}

fn print_help() {
    println!(
        "\
{name} {version}
Convert Context7 documentation exports to a tree of Markdown files

Usage: {name} [OPTIONS] <INPUT>

Arguments:
  <INPUT>  Context7 llms.txt file, or a context7.com project URL

Options:
  -d, --directory <DIR>  Output directory (default: ./{DEFAULT_OUTPUT_DIR})
  -T, --tree             Write a table of contents index (default: on)
      --no-tree          Do not write the index
  -p, --no-prefix        Omit numeric prefixes from filenames

Other options:
  -n, --dry-run          Show what would be written without writing
      --json             Print the dry-run plan as JSON (implies --dry-run)
  -q, --quiet            Suppress progress messages
  -v, --verbose          Show debug diagnostics
  -h, --help             Print help
  -V, --version          Print version",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
    );
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    // Show help if no arguments provided
    if std::env::args_os().len() == 1 {
        print_help();
        std::process::exit(0);
    }

    let mut input: Option<Input> = None;
    let mut directory = PathBuf::from(DEFAULT_OUTPUT_DIR);
    let mut tree = true;
    let mut no_prefix = false;
    let mut dry_run = false;
    let mut json = false;
    let mut quiet = false;
    let mut verbose = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('d') | Long("directory") => directory = parser.value()?.parse()?,
            // Last one wins
            Short('T') | Long("tree") => tree = true,
            Long("no-tree") => tree = false,
            Short('p') | Long("no-prefix") => no_prefix = true,
            Short('n') | Long("dry-run") => dry_run = true,
            Long("json") => {
                json = true;
                dry_run = true;
            }
            Short('q') | Long("quiet") => quiet = true,
            Short('v') | Long("verbose") => verbose = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) if input.is_none() => {
                input = Some(match val.into_string() {
                    Ok(s) if fetch::is_url(&s) => Input::Url(s),
                    Ok(s) => Input::File(PathBuf::from(s)),
                    Err(os) => Input::File(PathBuf::from(os)),
                });
            }
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(Cli {
        input: input.ok_or("missing required argument: <INPUT>")?,
        directory,
        tree,
        no_prefix,
        dry_run,
        json,
        quiet,
        verbose,
    })
}

fn init_logging(cli: &Cli) -> Result<(), Error> {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context(LoggingSnafu)
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            if let Some(hint) = err.hint() {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Error> {
    let cli = parse_args().context(ParseArgsSnafu)?;
    init_logging(&cli)?;

    let entries = load_entries(&cli)?;
    if entries.is_empty() {
        warn!(input = %cli.input.label(), "no valid entries found, nothing to write");
        return Ok(());
    }
    if !cli.quiet {
        eprintln!("Parsed {} entries from {}", entries.len(), cli.input.label());
    }

    let mut organizer = FileOrganizer::new(UrlMapper::new(cli.no_prefix));
    let structure = organizer.organize(&entries);
    let files = organizer::flatten(&structure);

    if cli.dry_run {
        return print_plan(&cli, &entries, &structure, &files);
    }

    let markdown = MarkdownWriter::new(&cli.directory);
    markdown.ensure_output_dir().context(WriteSnafu)?;
    let written = markdown.write_files(&files).context(WriteSnafu)?;
    for path in &written {
        debug!(path = %path.display(), "wrote file");
    }

    if cli.tree {
        // Index only what this run wrote.
        let generator = IndexGenerator::new(&cli.directory, cli.no_prefix);
        let relative = writer::output_summary(&files).file_paths;
        match generator.generate_index(&relative, None) {
            Ok(path) => {
                if !cli.quiet {
                    eprintln!("Wrote index {}", path.display());
                }
            }
            Err(err) => warn!(error = %err, "failed to generate index"),
        }
    }

    if !cli.quiet {
        let summary = organizer::summarize(&structure);
        eprintln!(
            "Wrote {} files ({} entries) in {} directories to {}",
            written.len(),
            entries.len(),
            summary.total_directories,
            cli.directory.display()
        );
    }
    Ok(())
}

/// Reads and parses the export named by the input argument.
fn load_entries(cli: &Cli) -> Result<Vec<ParsedEntry>, Error> {
    match &cli.input {
        Input::Url(url) => {
            let download_url = fetch::context7_download_url(url).context(FetchSnafu)?;
            if !cli.quiet {
                eprintln!("Downloading {download_url}");
            }
            let text = fetch::download(&download_url).context(FetchSnafu)?;
            Ok(parser::parse_entries(&text))
        }
        Input::File(path) => {
            ensure!(path.exists(), InputNotFoundSnafu { path });
            ensure!(path.is_file(), InputNotFileSnafu { path });
            parser::parse_file(path).context(ParseSnafu)
        }
    }
}

/// Everything a run would produce, for `--dry-run --json`.
#[derive(Serialize)]
struct Plan {
    input: String,
    output_directory: PathBuf,
    total_entries: usize,
    structure: DirectorySummary,
    output: OutputSummary,
    index: Option<IndexSummary>,
}

fn print_plan(
    cli: &Cli,
    entries: &[ParsedEntry],
    structure: &OrganizedStructure,
    files: &[organizer::OrganizedFile],
) -> Result<(), Error> {
    let output = writer::output_summary(files);
    let generator = IndexGenerator::new(&cli.directory, cli.no_prefix);
    let index = cli.tree.then(|| generator.summary(&output.file_paths));

    if cli.json {
        let plan = Plan {
            input: cli.input.label(),
            output_directory: cli.directory.clone(),
            total_entries: entries.len(),
            structure: organizer::summarize(structure),
            output,
            index,
        };
        let json = serde_json::to_string_pretty(&plan).context(JsonSnafu)?;
        println!("{json}");
        return Ok(());
    }

    let summary = organizer::summarize(structure);
    eprintln!(
        "Would write {} files ({} entries) in {} directories to {}",
        output.total_files,
        entries.len(),
        summary.total_directories,
        cli.directory.display()
    );
    for (directory, listing) in &summary.directories {
        eprintln!("  {directory}/ ({} files)", listing.file_count);
        for file in &listing.files {
            eprintln!("    {file}");
        }
    }
    if index.is_some() {
        eprintln!("Would write index {}", generator.index_path().display());
    }
    Ok(())
}
