use crate::models::audio_models::{AudioSource, PlaybackUnit};
use crate::models::error::LiveAudioError;

/// An open output device with its own running clock.
///
/// Scheduled units belong to the device: they cannot be moved or cancelled
/// one by one, only aborted together by `close`.
pub trait AudioOutput: Send {
    /// Device clock in seconds.
    fn current_time(&self) -> f64;

    fn is_suspended(&self) -> bool;

    /// Resume a suspended device. No-op if already running.
    fn resume(&mut self) -> Result<(), LiveAudioError>;

    /// Queue a unit to start playing at `unit.start_time`.
    ///
    /// Returns the start time the device actually used. If the device clock
    /// passed `unit.start_time` before the unit was queued, the unit starts
    /// immediately instead of skipping its opening samples.
    fn schedule(&mut self, unit: PlaybackUnit) -> Result<f64, LiveAudioError>;

    /// Stop output immediately, dropping everything still queued.
    fn close(&mut self);
}

/// Opens output devices on demand.
pub trait OutputProvider: Send {
    type Output: AudioOutput;

    fn open(&mut self) -> Result<Self::Output, LiveAudioError>;

    fn device_info(&self) -> AudioSource;
}
