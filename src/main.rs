use std::io;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, CommandFactory, Parser};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

use gosqlfmt::config::Config;
use gosqlfmt::types::FileStatus;
use gosqlfmt::Options;

/// gosqlfmt: format SQL literals passed to sqlx / database/sql calls in Go
/// source, in place, through an external SQL formatter.
#[derive(Parser)]
#[command(name = "gosqlfmt", version, about)]
struct Cli {
    /// Directory to walk, or a single Go file.
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Config file (default: gosqlfmt.toml in ROOT, if present).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// File extension to select.
    #[arg(long, value_name = "EXT")]
    ext: Option<String>,

    /// Skip paths (relative to ROOT) matching this glob. Repeatable.
    #[arg(long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Formatter program, run as `PROGRAM ARGS... <file>`.
    #[arg(long, value_name = "PROGRAM")]
    formatter: Option<String>,

    /// Replace the formatter's arguments. Repeatable.
    #[arg(long = "formatter-arg", value_name = "ARG", allow_hyphen_values = true)]
    formatter_args: Vec<String>,

    /// Seconds before a formatter run is killed (0 = no limit).
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Don't write; list files that would change and exit 1 if any.
    #[arg(long)]
    check: bool,

    /// Keep processing other files after a file fails to parse or print.
    #[arg(long)]
    keep_going: bool,

    /// Machine-readable JSON report on stdout.
    #[arg(long)]
    json: bool,

    /// More logging (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print shell completions for the given shell.
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Cli {
    /// Defaults < config file < flags.
    fn config(&self) -> Result<Config, gosqlfmt::error::GosqlfmtError> {
        let mut config = Config::resolve(self.config.as_deref(), &self.root)?;
        if let Some(ext) = &self.ext {
            config.walk.extension.clone_from(ext);
        }
        config.walk.exclude.extend(self.exclude.iter().cloned());
        if let Some(program) = &self.formatter {
            config.formatter.program.clone_from(program);
        }
        if !self.formatter_args.is_empty() {
            config.formatter.args.clone_from(&self.formatter_args);
        }
        if let Some(secs) = self.timeout {
            config.formatter.timeout_secs = secs;
        }
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gosqlfmt={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "gosqlfmt", &mut io::stdout());
        return;
    }

    init_logging(cli.verbose);

    let config = match cli.config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            process::exit(e.exit_code());
        }
    };

    let options = Options {
        root: cli.root.clone(),
        check: cli.check,
        keep_going: cli.keep_going,
    };

    let report = match gosqlfmt::run(&options, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e}");
            process::exit(e.exit_code());
        }
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).expect("report is always serializable")
        );
    } else if cli.check {
        for file in report.changed() {
            println!("{}", file.path.display());
        }
    }

    if let Some(code) = report.first_failure {
        process::exit(code);
    }
    if cli.check && report.files.iter().any(|f| matches!(f.status, FileStatus::WouldChange)) {
        process::exit(1);
    }
}
