//! # live-audio-core
//!
//! Platform-agnostic audio core for live voice conversations.
//!
//! Turns microphone input into base64 16-bit PCM frames for a realtime
//! transport, and plays base64 PCM chunks from the transport back-to-back
//! without gaps regardless of arrival jitter. Device backends implement
//! `CaptureProvider` and `OutputProvider` and plug into the generic
//! `CapturePipeline`, `PlaybackScheduler` and `LiveSession`.
//!
//! ## Architecture
//!
//! ```text
//! live-audio-core (this crate)
//! ├── traits/       ← CaptureProvider, AudioOutput, OutputProvider, LiveTransport, LiveSessionDelegate
//! ├── models/       ← LiveAudioError, PipelineState, configurations, frames and units
//! ├── processing/   ← PCM conversion, base64 codec, FrameAccumulator, PlaybackTimeline
//! ├── capture/      ← CapturePipeline
//! ├── playback/     ← PlaybackScheduler
//! └── session/      ← LiveSession, ServerMessage, Transcript
//! ```

pub mod capture;
pub mod models;
pub mod playback;
pub mod processing;
pub mod session;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience.
pub use capture::pipeline::{CapturePipeline, FrameCallback, DEFAULT_CAPTURE_SAMPLE_RATE};
pub use models::audio_models::{
    AudioSource, DeviceDirection, EncodedFrame, PipelineDiagnostics, PlaybackUnit, ScheduledUnit,
};
pub use models::config::{
    CaptureConfiguration, FrameEmission, PlaybackConfiguration, DEFAULT_FRAME_THRESHOLD,
    DEFAULT_OUTPUT_SAMPLE_RATE,
};
pub use models::error::LiveAudioError;
pub use models::state::PipelineState;
pub use playback::scheduler::PlaybackScheduler;
pub use processing::accumulator::FrameAccumulator;
pub use processing::timeline::PlaybackTimeline;
pub use session::live::LiveSession;
pub use session::messages::ServerMessage;
pub use session::transcript::{Role, Transcript, TranscriptEntry};
pub use traits::audio_output::{AudioOutput, OutputProvider};
pub use traits::capture_provider::{AudioBufferCallback, CaptureProvider};
pub use traits::session_delegate::LiveSessionDelegate;
pub use traits::transport::LiveTransport;
