use std::sync::Arc;

use crate::models::audio_models::{PipelineDiagnostics, PlaybackUnit, ScheduledUnit};
use crate::models::config::PlaybackConfiguration;
use crate::models::error::LiveAudioError;
use crate::models::state::PipelineState;
use crate::processing::codec;
use crate::traits::audio_output::{AudioOutput, OutputProvider};

/// Gap-free playback of base64 PCM chunks arriving at irregular times.
///
/// Each chunk becomes one unit placed at `max(next_start_time, device clock)`,
/// so chunks that arrive faster than real time queue back to back, and a
/// chunk arriving after a stall starts right away instead of being scheduled
/// in the past.
///
/// The output device is opened lazily on the first `start` or `play` and
/// closed by `stop`, which aborts everything still queued.
pub struct PlaybackScheduler<O: OutputProvider> {
    provider: O,
    config: PlaybackConfiguration,
    output: Option<O::Output>,
    next_start_time: f64,
    state: PipelineState,
    diagnostics: PipelineDiagnostics,
}

impl<O: OutputProvider> PlaybackScheduler<O> {
    pub fn new(provider: O, config: PlaybackConfiguration) -> Result<Self, LiveAudioError> {
        config.validate().map_err(LiveAudioError::ConfigurationFailed)?;
        Ok(Self {
            provider,
            config,
            output: None,
            next_start_time: 0.0,
            state: PipelineState::Idle,
            diagnostics: PipelineDiagnostics::default(),
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Device-clock time at which the next chunk would start if the device
    /// clock has not passed it.
    pub fn next_start_time(&self) -> f64 {
        self.next_start_time
    }

    pub fn is_device_open(&self) -> bool {
        self.output.is_some()
    }

    pub fn diagnostics(&self) -> PipelineDiagnostics {
        self.diagnostics.clone()
    }

    pub fn config(&self) -> &PlaybackConfiguration {
        &self.config
    }

    /// Open the output device if needed and resume it if suspended.
    ///
    /// Some platforms only let a device resume in response to a user
    /// gesture, so call this from the action that opens the session.
    pub fn start(&mut self) -> Result<(), LiveAudioError> {
        let output = self.ensure_output()?;
        if output.is_suspended() {
            output.resume()?;
            log::debug!("resumed suspended output device");
        }
        self.state = PipelineState::Running;
        Ok(())
    }

    /// Schedule one chunk, dropping it with a warning if it cannot be played.
    ///
    /// A bad chunk never interrupts the stream: later chunks keep their
    /// contiguous offsets as if the bad one had never arrived.
    pub fn play(&mut self, chunk: &str) -> Option<ScheduledUnit> {
        match self.try_play(chunk) {
            Ok(unit) => Some(unit),
            Err(e) => {
                self.diagnostics.chunks_dropped += 1;
                log::warn!("dropping audio chunk: {}", e);
                None
            }
        }
    }

    /// Schedule one chunk, returning why it could not be played.
    pub fn try_play(&mut self, chunk: &str) -> Result<ScheduledUnit, LiveAudioError> {
        let samples = codec::decode_chunk(chunk)?;
        if samples.is_empty() {
            return Err(LiveAudioError::MalformedAudioChunk("empty chunk".into()));
        }

        let sample_rate = self.config.output_sample_rate;
        let next_start_time = self.next_start_time;
        let output = self.ensure_output()?;

        let unit = PlaybackUnit {
            start_time: next_start_time.max(output.current_time()),
            sample_rate,
            samples: Arc::from(samples),
        };
        let duration_secs = unit.duration_secs();
        let sample_count = unit.samples.len();
        // The device clock keeps running between the read above and the
        // queueing below, so take the start time the device settled on.
        let start_time = output.schedule(unit)?;
        let scheduled = ScheduledUnit {
            start_time,
            duration_secs,
            sample_count,
        };

        self.next_start_time = scheduled.end_time();
        self.state = PipelineState::Running;
        self.diagnostics.chunks_scheduled += 1;
        self.diagnostics.samples_emitted += scheduled.sample_count as u64;
        Ok(scheduled)
    }

    /// Close the output device, cutting off anything queued, and start a
    /// fresh timeline on the next `start`/`play`. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(mut output) = self.output.take() {
            output.close();
            log::info!("playback stopped");
        }
        self.next_start_time = 0.0;
        if self.state.is_running() {
            self.state = PipelineState::Stopped;
        }
    }

    fn ensure_output(&mut self) -> Result<&mut O::Output, LiveAudioError> {
        if self.output.is_none() {
            let output = self.provider.open().map_err(|e| {
                log::error!("failed to open output device: {}", e);
                e
            })?;
            log::info!("opened output device {}", self.provider.device_info().name);
            self.output = Some(output);
        }
        self.output
            .as_mut()
            .ok_or_else(|| LiveAudioError::Unknown("output device missing after open".into()))
    }
}

impl<O: OutputProvider> Drop for PlaybackScheduler<O> {
    fn drop(&mut self) {
        self.stop();
    }
}
