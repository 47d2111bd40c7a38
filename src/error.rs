use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use crate::types::Position;

/// Every fatal error gosqlfmt can produce. Each one aborts processing of a
/// file (or the whole walk) and is shown to the user as a one-line message.
#[derive(Debug)]
pub enum GosqlfmtError {
    WalkFailed {
        path: PathBuf,
        reason: String,
    },
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseFailed {
        path: PathBuf,
        position: Option<Position>,
        reason: String,
    },
    PrintFailed {
        path: PathBuf,
        reason: String,
    },
    CanonicalizeFailed {
        path: PathBuf,
        position: Option<Position>,
        reason: String,
    },
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    ConfigInvalid {
        path: Option<PathBuf>,
        reason: String,
    },
}

impl std::fmt::Display for GosqlfmtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WalkFailed { path, reason } => {
                write!(f, "walking {}: {reason}", path.display())
            }
            Self::ReadFailed { path, source } => {
                write!(f, "reading {}: {source}", path.display())
            }
            Self::ParseFailed {
                path,
                position,
                reason,
            } => {
                write!(f, "parse error in {}", path.display())?;
                if let Some(pos) = position {
                    write!(f, " at {pos}")?;
                }
                write!(f, ": {reason}")
            }
            Self::PrintFailed { path, reason } => {
                write!(f, "printing {}: {reason}", path.display())
            }
            Self::CanonicalizeFailed {
                path,
                position,
                reason,
            } => {
                write!(f, "rewritten {} is not valid Go", path.display())?;
                if let Some(pos) = position {
                    write!(f, " at {pos}")?;
                }
                write!(f, ": {reason}")
            }
            Self::WriteFailed { path, source } => {
                write!(f, "writing {}: {source}", path.display())
            }
            Self::ConfigInvalid { path, reason } => match path {
                Some(p) => write!(f, "invalid config {}: {reason}", p.display()),
                None => write!(f, "invalid config: {reason}"),
            },
        }
    }
}

impl std::error::Error for GosqlfmtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFailed { source, .. } | Self::WriteFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl GosqlfmtError {
    /// Process exit status for this error. `1` is reserved for `--check`.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::WalkFailed { .. } | Self::ReadFailed { .. } | Self::WriteFailed { .. } => 2,
            Self::ParseFailed { .. }
            | Self::PrintFailed { .. }
            | Self::CanonicalizeFailed { .. } => 3,
            Self::ConfigInvalid { .. } => 4,
        }
    }
}

/// A failure confined to one literal. The literal keeps its original value
/// and processing moves on to the next one.
#[derive(Debug)]
pub enum LiteralError {
    /// The callee's line is past the end of the source.
    LineNotFound { line: usize, lines: usize },
    FormatFailed(FormatError),
    /// The formatted text contains a backtick and cannot live in a raw literal.
    DelimiterInOutput,
}

impl std::fmt::Display for LiteralError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LineNotFound { line, lines } => {
                write!(f, "line {line} not found (source has {lines} lines)")
            }
            Self::FormatFailed(e) => write!(f, "format failed: {e}"),
            Self::DelimiterInOutput => write!(f, "formatted query contains a backtick"),
        }
    }
}

impl std::error::Error for LiteralError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::LineNotFound { .. } | Self::DelimiterInOutput => None,
            Self::FormatFailed(e) => Some(e),
        }
    }
}

impl From<FormatError> for LiteralError {
    fn from(e: FormatError) -> Self {
        Self::FormatFailed(e)
    }
}

/// Why the external formatter could not produce a result.
#[derive(Debug)]
pub enum FormatError {
    /// Creating or writing the staging file.
    Stage(std::io::Error),
    Spawn {
        program: String,
        source: std::io::Error,
    },
    Exit {
        program: String,
        status: ExitStatus,
    },
    TimedOut {
        program: String,
        after: Duration,
    },
    /// Reading the staged file back.
    ReadBack(std::io::Error),
    NotUtf8,
    /// Returned by in-process formatters.
    Other(String),
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stage(e) => write!(f, "writing query to staging file: {e}"),
            Self::Spawn { program, source } => write!(f, "running {program}: {source}"),
            Self::Exit { program, status } => write!(f, "{program} exited with {status}"),
            Self::TimedOut { program, after } => {
                write!(f, "{program} timed out after {}ms", after.as_millis())
            }
            Self::ReadBack(e) => write!(f, "reading formatted query from staging file: {e}"),
            Self::NotUtf8 => write!(f, "formatted query is not valid UTF-8"),
            Self::Other(reason) => f.write_str(reason),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Stage(e) | Self::ReadBack(e) | Self::Spawn { source: e, .. } => Some(e),
            _ => None,
        }
    }
}
