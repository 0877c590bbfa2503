use std::path::PathBuf;
use std::time::Duration;

use tokio::io::{BufWriter, Stdout};
use tracing::{Level, info};
use windowed_batch::prelude::*;

const USAGE: &str = "Usage: windowed-batch <glucose.csv> [window-minutes] [grid|first-arrival]";

/// Parsed command line
#[derive(Debug)]
struct Args {
    input: PathBuf,
    config: StreamConfig,
}

#[tokio::main]
async fn main() {
    app().run(parse_args, run_import).await
}

/// Runner for the import; the finished summary is logged at info
fn app() -> CliApp {
    CliApp::new("windowed-batch").with_log_level(Level::INFO)
}

/// Parse and validate command-line arguments
fn parse_args(args: Vec<String>) -> Result<Args, AppError> {
    let (input, rest) = match args.as_slice() {
        [_, input, rest @ ..] if rest.len() <= 2 => (input, rest),
        _ => return Err(AppError::InvalidArguments(USAGE.to_string())),
    };

    let mut config = StreamConfig::for_reading::<GlucoseRead>();

    if let Some(minutes) = rest.first() {
        let minutes: u64 = minutes.parse().map_err(|_| {
            AppError::InvalidArguments(format!("window-minutes must be a number, got {minutes}"))
        })?;
        config.window = Duration::from_secs(minutes.saturating_mul(60));
    }

    if let Some(name) = rest.get(1) {
        let policy = WindowPolicy::from_name(name)
            .ok_or_else(|| AppError::InvalidArguments(format!("unknown window policy {name}")))?;
        config = config.with_policy(policy);
    }

    config.validate()?;

    Ok(Args {
        input: PathBuf::from(input),
        config,
    })
}

/// Batch glucose reads by window and write committed batches to stdout as CSV
async fn run_import(stdout: BufWriter<Stdout>, args: Args) -> Result<(), AppError> {
    let reads = CsvRecordStream::<GlucoseRead>::from_file(&args.input).await?;

    let buffer = StreamBuffer::with_config(CsvBatchSink::new(stdout), &args.config)?;
    let mut session = ImportSession::new(buffer, SkipErrors);

    let completed = session.run(reads).await?;
    let summary = session.summary();
    if !completed {
        return Err(AppError::ImportAborted(summary.read));
    }

    let sink = session.into_buffer().into_writer();
    info!(
        read = summary.read,
        accepted = summary.accepted,
        rejected = summary.rejected,
        unreadable = summary.unreadable,
        batches = sink.batches(),
        "Import finished"
    );

    Ok(())
}
