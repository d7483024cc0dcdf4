//! Microphone-to-speaker loopback through the live audio pipeline.
//!
//! Captured audio is encoded into base64 PCM frames exactly as it would be
//! sent to a realtime transport, then decoded and scheduled for gapless
//! playback. Useful for checking device setup and frame pacing.

use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use clap::Parser;
use log::LevelFilter;

use live_audio_core::{
    CaptureConfiguration, CapturePipeline, EncodedFrame, FrameCallback, LiveAudioError,
    PlaybackConfiguration, PlaybackScheduler,
};
use live_audio_cpal::{check_microphone_permission, CpalMicCapture, CpalOutputProvider, DeviceEnumerator};

/// Live audio loopback: mic -> base64 PCM frames -> scheduled playback
#[derive(Parser, Debug)]
#[command(name = "live-audio-loopback")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase logging verbosity (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,

    /// List input and output devices and exit
    #[arg(long)]
    list_devices: bool,

    /// How long to run, in seconds
    #[arg(long, default_value_t = 10)]
    seconds: u64,

    /// Emit one frame per device block instead of accumulating
    #[arg(long)]
    immediate: bool,

    /// Input device name (default: system default)
    #[arg(long)]
    input: Option<String>,

    /// Output device name (default: system default)
    #[arg(long)]
    output: Option<String>,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else {
            match self.verbose {
                0 => LevelFilter::Warn,
                1 => LevelFilter::Info,
                2 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        }
    }
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .format_timestamp_millis()
        .init();

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), LiveAudioError> {
    if args.list_devices {
        return list_devices();
    }

    if !check_microphone_permission()? {
        return Err(LiveAudioError::PermissionDenied);
    }

    let (frame_tx, frame_rx) = mpsc::channel::<EncodedFrame>();
    let on_frame: FrameCallback = Arc::new(move |frame: &EncodedFrame| {
        let _ = frame_tx.send(frame.clone());
    });

    let mic = match &args.input {
        Some(id) => CpalMicCapture::with_device(id.clone()),
        None => CpalMicCapture::default_device(),
    };
    let mut capture_config = if args.immediate {
        CaptureConfiguration::immediate()
    } else {
        CaptureConfiguration::default()
    };
    capture_config.device_id = args.input.clone();

    let mut capture = CapturePipeline::new(mic, capture_config, on_frame)?;
    capture.start()?;

    // Frames go straight back out, so playback runs at the capture rate.
    let speaker = match &args.output {
        Some(id) => CpalOutputProvider::with_device(id.clone()),
        None => CpalOutputProvider::default_device(),
    };
    let playback_config = PlaybackConfiguration {
        output_sample_rate: capture.sample_rate(),
        device_id: args.output.clone(),
    };
    let mut playback = PlaybackScheduler::new(speaker, playback_config)?;
    if let Err(e) = playback.start() {
        capture.stop();
        return Err(e);
    }

    log::info!(
        "loopback running for {}s at {} Hz",
        args.seconds,
        capture.sample_rate()
    );

    let deadline = Instant::now() + Duration::from_secs(args.seconds);
    while Instant::now() < deadline {
        match frame_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(frame) => {
                if let Some(unit) = playback.play(&frame.data) {
                    log::debug!(
                        "{} samples scheduled at {:.3}s",
                        unit.sample_count,
                        unit.start_time
                    );
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    capture.stop();
    playback.stop();

    let captured = capture.diagnostics();
    let played = playback.diagnostics();
    println!(
        "captured {} samples in {} frames, scheduled {} chunks ({} dropped)",
        captured.samples_emitted, captured.frames_emitted, played.chunks_scheduled, played.chunks_dropped
    );
    Ok(())
}

fn list_devices() -> Result<(), LiveAudioError> {
    let enumerator = DeviceEnumerator::new();

    println!("Input devices:");
    for source in enumerator.list_capture_devices()? {
        let marker = if source.is_default { " (default)" } else { "" };
        println!("  {}{}", source.name, marker);
    }

    println!("Output devices:");
    for source in enumerator.list_render_devices()? {
        let marker = if source.is_default { " (default)" } else { "" };
        println!("  {}{}", source.name, marker);
    }
    Ok(())
}
