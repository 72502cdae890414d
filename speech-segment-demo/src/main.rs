mod console_delegate;
mod tone_source;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;

use speech_segment_core::{CaptureError, RecordingSession, SegmentFileWriter, SessionConfiguration, StopPolicy};

use console_delegate::ConsoleDelegate;
use tone_source::ToneSource;

/// Record a synthetic tone in rolling segments and store each one as a WAV file.
#[derive(Debug, Parser)]
#[command(name = "segment-demo", version)]
struct Args {
    /// Session configuration (JSON). Defaults apply when omitted.
    #[arg(short, long, env = "SEGMENT_DEMO_CONFIG")]
    config: Option<PathBuf>,

    /// Directory receiving one sub-directory per session.
    #[arg(short, long, default_value = "segments")]
    output: PathBuf,

    /// How long to record, in seconds.
    #[arg(short, long, default_value_t = 10.0)]
    seconds: f64,

    /// Tone frequency in Hz.
    #[arg(long, default_value_t = 440.0)]
    frequency: f32,

    /// Capture chunk length in milliseconds.
    #[arg(long, default_value_t = 20)]
    chunk_ms: u64,

    /// Override the drain interval from the configuration.
    #[arg(long)]
    drain_ms: Option<u64>,

    /// Drop the partial segment on stop instead of flushing it.
    #[arg(long)]
    discard: bool,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("segment demo failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), CaptureError> {
    let mut config = match args.config {
        Some(ref path) => SessionConfiguration::load(path)?,
        None => SessionConfiguration::default(),
    };
    if let Some(ms) = args.drain_ms {
        config.drain_interval_ms = ms;
    }
    if args.discard {
        config.stop_policy = StopPolicy::Discard;
    }
    config.validate()?;

    let source = ToneSource::new(config.format, args.frequency, Duration::from_millis(args.chunk_ms));
    let writer = Arc::new(SegmentFileWriter::new(&args.output));

    let mut session = RecordingSession::new(source, config, writer)?;
    session.set_delegate(Arc::new(ConsoleDelegate));
    session.start()?;

    thread::sleep(Duration::from_secs_f64(args.seconds.max(0.0)));

    let summary = session.stop()?;
    let json = serde_json::to_string_pretty(&summary)
        .map_err(|e| CaptureError::Unknown(format!("failed to serialize summary: {}", e)))?;
    println!("{}", json);
    Ok(())
}
