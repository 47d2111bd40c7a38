use std::ops::Range;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::LiteralError;

/// 1-based line and byte column, like the positions Go tooling reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    #[must_use]
    pub fn from_point(point: tree_sitter::Point) -> Self {
        Self {
            line: point.row + 1,
            column: point.column + 1,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Byte range into the original source.
pub type Span = Range<usize>;

/// How a literal is delimited. Only `Backtick` literals (Go raw strings)
/// are ever rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    Backtick,
    DoubleQuote,
    SingleQuote,
    /// Numeric literals.
    None,
}

impl Delimiter {
    #[must_use]
    pub fn of(text: &str) -> Self {
        match text.as_bytes().first() {
            Some(b'`') => Self::Backtick,
            Some(b'"') => Self::DoubleQuote,
            Some(b'\'') => Self::SingleQuote,
            _ => Self::None,
        }
    }

    #[must_use]
    pub fn as_char(self) -> Option<char> {
        match self {
            Self::Backtick => Some('`'),
            Self::DoubleQuote => Some('"'),
            Self::SingleQuote => Some('\''),
            Self::None => None,
        }
    }

    #[must_use]
    pub fn is_raw(self) -> bool {
        self == Self::Backtick
    }
}

/// What happened to one literal argument of a recognized call.
#[derive(Debug, Serialize)]
pub struct LiteralOutcome {
    pub position: Position,
    pub function: String,
    pub arg_index: usize,
    #[serde(flatten)]
    pub status: LiteralStatus,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum LiteralStatus {
    Rewritten,
    /// Formatted, but the result matched what was already there.
    Unchanged,
    /// Not a raw literal; left alone.
    NotRaw,
    Skipped(#[serde(serialize_with = "serialize_display")] LiteralError),
}

impl LiteralStatus {
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

/// Final state of one file after the pipeline ran.
#[derive(Debug, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum FileStatus {
    Unchanged,
    Written,
    /// `--check` mode: the file would have been rewritten.
    WouldChange,
    /// `--keep-going` mode: a fatal error isolated to this file.
    Failed(String),
}

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub literals: Vec<LiteralOutcome>,
}

/// Everything one run did, in walk order.
#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub files: Vec<FileReport>,
    /// Exit code of the first isolated file failure, if any.
    #[serde(skip)]
    pub first_failure: Option<i32>,
}

impl Report {
    pub fn changed(&self) -> impl Iterator<Item = &FileReport> {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Written | FileStatus::WouldChange))
    }

    #[must_use]
    pub fn skipped_literals(&self) -> usize {
        self.files
            .iter()
            .flat_map(|f| &f.literals)
            .filter(|l| l.status.is_skipped())
            .count()
    }
}

fn serialize_display<T: std::fmt::Display, S: serde::Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
