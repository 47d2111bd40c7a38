#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions, // Rust naming conventions
    clippy::missing_errors_doc,      // error enums document themselves
    clippy::missing_panics_doc,      // same
)]

pub mod config;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod indent;
pub mod rewrite;
pub mod scan;
pub mod syntax;
pub mod types;
pub mod walk;

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use config::Config;
use engine::format_source;
use error::GosqlfmtError;
use formatter::{ExternalFormatter, QueryFormatter};
use scan::FunctionSet;
use types::{FileReport, FileStatus, LiteralOutcome, LiteralStatus, Report};

/// What a run should do, independent of the configuration file.
#[derive(Debug, Clone)]
pub struct Options {
    pub root: PathBuf,
    /// Report files that would change instead of writing them.
    pub check: bool,
    /// Record per-file fatal errors and continue with the next file.
    pub keep_going: bool,
}

impl Options {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            check: false,
            keep_going: false,
        }
    }
}

/// Walk `options.root` and rewrite every matching file with the formatter
/// described by `config`.
pub fn run(options: &Options, config: &Config) -> Result<Report, GosqlfmtError> {
    let formatter = ExternalFormatter::from_config(&config.formatter);
    run_with(options, config, &FunctionSet::sqlx(), &formatter)
}

/// The single entry point everything flows through:
/// walk → per file: parse → scan → format → rewrite → print → write.
///
/// Without `keep_going`, the first fatal file error ends the run; files
/// already written stay written.
pub fn run_with(
    options: &Options,
    config: &Config,
    functions: &FunctionSet,
    formatter: &dyn QueryFormatter,
) -> Result<Report, GosqlfmtError> {
    let files = walk::source_files(&options.root, &config.walk)?;
    tracing::debug!(root = %options.root.display(), files = files.len(), "walk complete");

    let mut report = Report::default();
    for path in files {
        match process_file(&path, options.check, functions, formatter) {
            Ok(file) => report.files.push(file),
            Err(e) if options.keep_going => {
                tracing::error!("{e}");
                report.first_failure.get_or_insert(e.exit_code());
                report.files.push(FileReport {
                    path,
                    status: FileStatus::Failed(e.to_string()),
                    literals: Vec::new(),
                });
            }
            Err(e) => return Err(e),
        }
    }
    Ok(report)
}

/// Run the pipeline on one file. The file is only touched when the
/// rewritten bytes differ from what is on disk.
pub fn process_file(
    path: &Path,
    check: bool,
    functions: &FunctionSet,
    formatter: &dyn QueryFormatter,
) -> Result<FileReport, GosqlfmtError> {
    let original = fs::read(path).map_err(|e| GosqlfmtError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let formatted = format_source(path, original.clone(), functions, formatter)?;
    log_outcomes(path, &formatted.literals);

    let status = if !formatted.changed(&original) {
        tracing::debug!(path = %path.display(), "unchanged");
        FileStatus::Unchanged
    } else if check {
        FileStatus::WouldChange
    } else {
        write_atomic(path, formatted.output.as_bytes())?;
        tracing::info!(path = %path.display(), "rewritten");
        FileStatus::Written
    };

    Ok(FileReport {
        path: path.to_path_buf(),
        status,
        literals: formatted.literals,
    })
}

/// Format a single source buffer without touching the file system.
pub fn format_bytes(
    path: &Path,
    source: Vec<u8>,
    formatter: &dyn QueryFormatter,
) -> Result<String, GosqlfmtError> {
    let formatted = format_source(path, source, &FunctionSet::sqlx(), formatter)?;
    log_outcomes(path, &formatted.literals);
    Ok(formatted.output)
}

fn log_outcomes(path: &Path, outcomes: &[LiteralOutcome]) {
    for outcome in outcomes {
        match &outcome.status {
            LiteralStatus::Skipped(e) => {
                tracing::warn!("{}:{}: {}: {e}", path.display(), outcome.position, outcome.function);
            }
            status => {
                tracing::debug!(
                    "{}:{}: {}: {status:?}",
                    path.display(),
                    outcome.position,
                    outcome.function
                );
            }
        }
    }
}

/// Replace `path` with `contents` via a sibling temp file and a rename, so
/// a crash never leaves a half-written source file. Keeps the original
/// permissions.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), GosqlfmtError> {
    let fail = |source: std::io::Error| GosqlfmtError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path).map_err(fail)?.permissions();

    let mut tmp = tempfile::Builder::new()
        .prefix(".gosqlfmt-")
        .tempfile_in(dir)
        .map_err(fail)?;
    tmp.write_all(contents).map_err(fail)?;
    tmp.as_file().sync_all().map_err(fail)?;
    fs::set_permissions(tmp.path(), permissions).map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;
    Ok(())
}
