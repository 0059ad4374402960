//! rotpipe CLI: pipe standard input into a size-rotated log file.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};

use rotpipe::config::{FileConfig, Settings};
use rotpipe::dated::LineStamper;
use rotpipe::pipe::pump;
use rotpipe::sink::RotatingSink;
use rotpipe::utils::format_bytes;
use rotpipe::{constants, ui};

#[derive(Parser, Debug)]
#[command(name = "rotpipe", version)]
#[command(about = "Append standard input to a file, rotating it into numbered backups by size")]
struct Cli {
    /// Output file; backups are written as <OUT>.1 .. <OUT>.<KEEP>
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Rotate once the file would grow past this size (e.g. 10K, 100M, 1,000,000)
    #[arg(short, long, value_name = "SIZE")]
    size: Option<String>,

    /// Number of backups to keep [default: 20]
    #[arg(short, long, value_name = "N", allow_negative_numbers = true)]
    keep: Option<i64>,

    /// Prefix each line with an RFC 3339 timestamp
    #[arg(short, long)]
    dated: bool,

    /// Read defaults from a TOML file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log rotations and progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            out: self.out.clone(),
            size: self.size.clone(),
            keep: self.keep,
            dated: self.dated.then_some(true),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::print_fatal(&e);
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut settings = cli.settings();
    if let Some(path) = &cli.config {
        let file = FileConfig::load_from(path).context("reading --config")?;
        settings = settings.or_file(file);
    }

    let validated = settings.validate()?;
    for warning in &validated.warnings {
        warn!("{warning}");
    }
    let policy = validated.policy;

    info!(
        path = %policy.output_path.display(),
        size_limit = %format_bytes(policy.size_limit),
        keep = policy.backup_count,
        dated = policy.dated_lines,
        "Starting"
    );

    let mut sink = RotatingSink::open(policy).context("opening output file")?;
    let mut stamper = sink.policy().dated_lines.then(LineStamper::new);

    let summary = pump(io::stdin().lock(), &mut sink, stamper.as_mut())
        .context("piping standard input")?;
    sink.close().context("closing output file")?;

    debug!(
        bytes_read = summary.bytes_read,
        chunks = summary.chunks,
        lines = summary.lines,
        rotations = summary.rotations,
        "Input exhausted"
    );
    Ok(())
}

/// Initialize stderr logging. `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let default = if verbose {
        constants::VERBOSE_LOG_FILTER
    } else {
        constants::DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}
