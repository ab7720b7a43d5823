use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use linsheet::{EvalConfig, OutputFormat};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "linsheet", version, about = "Evaluate linear cell formulas in parallel")]
struct Cli {
    /// Definitions file, one cell per line.
    #[arg(default_value = "input.txt")]
    input: PathBuf,

    /// Worker threads (defaults to the available parallelism).
    #[arg(long, short = 't')]
    threads: Option<usize>,

    /// Evaluate every job on the coordinator thread.
    #[arg(long, conflicts_with = "threads")]
    sequential: bool,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Raise log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file = File::open(&cli.input)
        .with_context(|| format!("failed to open {}", cli.input.display()))?;
    let parsed = linsheet::parse::parse_reader(BufReader::new(file))
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    for error in &parsed.errors {
        tracing::warn!(line = error.line, "{}", error.kind);
    }

    let mut config = EvalConfig::default().with_parallel(!cli.sequential);
    if let Some(threads) = cli.threads {
        config = config.with_max_threads(threads);
    }

    let report = linsheet::evaluate(&parsed.definitions, config).context("evaluation failed")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report
        .write(cli.format.into(), &mut out)
        .context("failed to write results")?;
    out.flush()?;
    Ok(())
}
