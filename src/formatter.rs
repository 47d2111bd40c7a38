use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::FormatterConfig;
use crate::error::FormatError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Turns raw query text into formatted query text.
pub trait QueryFormatter {
    fn format_query(&self, query: &str) -> Result<String, FormatError>;
}

impl<F> QueryFormatter for F
where
    F: Fn(&str) -> Result<String, FormatError>,
{
    fn format_query(&self, query: &str) -> Result<String, FormatError> {
        self(query)
    }
}

/// Formats queries by staging them in a temp file and running an external
/// program (`pg_format` by default) that rewrites the file in place.
#[derive(Debug, Clone)]
pub struct ExternalFormatter {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ExternalFormatter {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    #[must_use]
    pub fn from_config(config: &FormatterConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone(), config.timeout())
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, staged: &Path) -> Result<(), FormatError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(staged)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| FormatError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let status = match wait(&mut child, self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                return Err(FormatError::TimedOut {
                    program: self.program.clone(),
                    after: self.timeout.unwrap_or_default(),
                });
            }
            Err(source) => {
                return Err(FormatError::Spawn {
                    program: self.program.clone(),
                    source,
                });
            }
        };

        if status.success() {
            Ok(())
        } else {
            Err(FormatError::Exit {
                program: self.program.clone(),
                status,
            })
        }
    }
}

impl Default for ExternalFormatter {
    fn default() -> Self {
        Self::from_config(&FormatterConfig::default())
    }
}

impl QueryFormatter for ExternalFormatter {
    /// The staging file is removed when `staged` drops, which happens on
    /// every return path below.
    fn format_query(&self, query: &str) -> Result<String, FormatError> {
        let mut staged = tempfile::Builder::new()
            .prefix("sql-")
            .tempfile()
            .map_err(FormatError::Stage)?;
        staged
            .write_all(query.as_bytes())
            .and_then(|()| staged.flush())
            .map_err(FormatError::Stage)?;

        self.run(staged.path())?;

        let bytes = fs::read(staged.path()).map_err(FormatError::ReadBack)?;
        String::from_utf8(bytes).map_err(|_| FormatError::NotUtf8)
    }
}

/// Wait for `child`, killing it once `timeout` elapses. `Ok(None)` means it
/// was killed. The child is always reaped before returning.
fn wait(child: &mut Child, timeout: Option<Duration>) -> std::io::Result<Option<ExitStatus>> {
    let Some(limit) = timeout else {
        return child.wait().map(Some);
    };
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
