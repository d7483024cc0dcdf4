use std::sync::Arc;

use crate::models::audio_models::AudioSource;
use crate::models::error::LiveAudioError;

/// Callback invoked when the engine delivers an input block.
///
/// Parameters:
/// - `samples`: Interleaved f32 samples in `[-1.0, 1.0]`.
/// - `sample_rate`: The device's input sample rate.
/// - `channels`: Number of interleaved channels.
pub type AudioBufferCallback = Arc<dyn Fn(&[f32], u32, u16) + Send + Sync + 'static>;

/// Platform-specific microphone input.
///
/// Implemented by `CpalMicCapture` in `live-audio-cpal`, and by scripted
/// fakes in tests.
pub trait CaptureProvider: Send {
    /// Whether an input device is present.
    fn is_available(&self) -> bool;

    /// Acquire the input device and begin delivering blocks via `callback`.
    ///
    /// Returns the input sample rate, fixed for the rest of the session.
    /// The block size is chosen by the engine. Blocks arrive in capture
    /// order on a dedicated audio thread.
    fn start(&mut self, callback: AudioBufferCallback) -> Result<u32, LiveAudioError>;

    /// Stop all input tracks and release the device. Must tolerate repeats.
    fn stop(&mut self) -> Result<(), LiveAudioError>;

    fn device_info(&self) -> AudioSource;
}
