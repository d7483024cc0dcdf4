use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::audio_models::{EncodedFrame, PipelineDiagnostics};
use crate::models::config::{CaptureConfiguration, FrameEmission};
use crate::models::error::LiveAudioError;
use crate::models::state::PipelineState;
use crate::processing::accumulator::FrameAccumulator;
use crate::processing::{codec, pcm};
use crate::traits::capture_provider::{AudioBufferCallback, CaptureProvider};

/// Reported by `sample_rate()` until a device has been acquired.
pub const DEFAULT_CAPTURE_SAMPLE_RATE: u32 = 16000;

/// Receives each emitted frame on the capture thread.
///
/// Frames are delivered one at a time in capture order, after the frame
/// state lock is released. `sample_rate` and `diagnostics` stay available
/// while a callback runs, but the callback must not call `flush` or `stop`.
pub type FrameCallback = Arc<dyn Fn(&EncodedFrame) + Send + Sync + 'static>;

/// State shared between the caller and the capture thread.
struct FrameState {
    accepting: bool,
    sample_rate: u32,
    rate_mismatch_logged: bool,
    accumulator: Option<FrameAccumulator>,
    diagnostics: PipelineDiagnostics,
}

impl FrameState {
    fn new(emission: FrameEmission) -> Self {
        let accumulator = match emission {
            FrameEmission::Immediate => None,
            FrameEmission::Accumulate { threshold } => Some(FrameAccumulator::new(threshold)),
        };
        Self {
            accepting: false,
            sample_rate: DEFAULT_CAPTURE_SAMPLE_RATE,
            rate_mismatch_logged: false,
            accumulator,
            diagnostics: PipelineDiagnostics::default(),
        }
    }

    fn encode(&mut self, samples: Vec<i16>) -> EncodedFrame {
        self.diagnostics.frames_emitted += 1;
        self.diagnostics.samples_emitted += samples.len() as u64;
        EncodedFrame {
            data: codec::encode_frame(&samples),
            sample_rate: self.sample_rate,
            sample_count: samples.len(),
        }
    }
}

/// Continuous microphone capture into base64 PCM frames.
///
/// ```text
/// [CaptureProvider] → f32 block → clamp + i16 → [FrameAccumulator] → base64 → on_frame
/// ```
///
/// One instance covers one capture session. After `stop` the pipeline must
/// be `reset` before it can start again.
pub struct CapturePipeline<P: CaptureProvider> {
    provider: P,
    config: CaptureConfiguration,
    on_frame: FrameCallback,
    state: PipelineState,
    frames: Arc<Mutex<FrameState>>,
    delivery: Arc<Mutex<()>>,
}

impl<P: CaptureProvider> CapturePipeline<P> {
    pub fn new(
        provider: P,
        config: CaptureConfiguration,
        on_frame: FrameCallback,
    ) -> Result<Self, LiveAudioError> {
        config.validate().map_err(LiveAudioError::ConfigurationFailed)?;
        let frames = Arc::new(Mutex::new(FrameState::new(config.emission)));
        Ok(Self {
            provider,
            config,
            on_frame,
            state: PipelineState::Idle,
            frames,
            delivery: Arc::new(Mutex::new(())),
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Input sample rate of the acquired device, for tagging outbound frames.
    pub fn sample_rate(&self) -> u32 {
        self.frames.lock().sample_rate
    }

    pub fn diagnostics(&self) -> PipelineDiagnostics {
        self.frames.lock().diagnostics.clone()
    }

    pub fn config(&self) -> &CaptureConfiguration {
        &self.config
    }

    /// Acquire the microphone and start emitting frames.
    ///
    /// Device failures (`PermissionDenied`, `DeviceNotAvailable`) are returned
    /// as-is and leave the pipeline idle. Calling `start` while running is a
    /// no-op.
    pub fn start(&mut self) -> Result<(), LiveAudioError> {
        match self.state {
            PipelineState::Running => {
                log::debug!("capture already running");
                return Ok(());
            }
            PipelineState::Stopped => {
                return Err(LiveAudioError::InvalidTransition {
                    state: self.state.to_string(),
                    action: "start capture",
                });
            }
            PipelineState::Idle => {}
        }

        self.frames.lock().accepting = true;

        let frames = Arc::clone(&self.frames);
        let delivery = Arc::clone(&self.delivery);
        let on_frame = Arc::clone(&self.on_frame);
        let callback: AudioBufferCallback =
            Arc::new(move |samples: &[f32], sample_rate: u32, channels: u16| {
                process_block(&frames, &delivery, &on_frame, samples, sample_rate, channels);
            });

        match self.provider.start(callback) {
            Ok(sample_rate) => {
                self.frames.lock().sample_rate = sample_rate;
                self.state = PipelineState::Running;
                log::info!(
                    "capture started on {} at {} Hz",
                    self.provider.device_info().name,
                    sample_rate
                );
                Ok(())
            }
            Err(e) => {
                self.frames.lock().accepting = false;
                log::error!("failed to start capture: {}", e);
                Err(e)
            }
        }
    }

    /// Emit any accumulated samples now as one frame.
    ///
    /// Returns whether a frame was emitted. Immediate-mode pipelines never
    /// hold samples, so this always returns false for them.
    pub fn flush(&self) -> bool {
        let _delivery = self.delivery.lock();
        let frame = {
            let mut frames = self.frames.lock();
            let remainder = frames.accumulator.as_mut().and_then(|acc| acc.take_remainder());
            remainder.map(|samples| frames.encode(samples))
        };
        match frame {
            Some(frame) => {
                (self.on_frame)(&frame);
                true
            }
            None => false,
        }
    }

    /// Stop capturing and release the device.
    ///
    /// Pending accumulated samples are discarded, not flushed. Safe to call
    /// repeatedly or before `start`.
    pub fn stop(&mut self) {
        if !self.state.is_running() {
            return;
        }

        {
            // Waits out a frame in delivery so none arrives after stop returns.
            let _delivery = self.delivery.lock();
            let mut frames = self.frames.lock();
            frames.accepting = false;
            if let Some(acc) = frames.accumulator.as_mut() {
                if !acc.is_empty() {
                    log::debug!("discarding {} pending capture samples", acc.pending());
                }
                acc.clear();
            }
        }

        if let Err(e) = self.provider.stop() {
            log::debug!("ignoring capture teardown error: {}", e);
        }

        self.state = PipelineState::Stopped;
        log::info!("capture stopped");
    }

    /// Return a stopped pipeline to idle so it can be started again.
    pub fn reset(&mut self) -> Result<(), LiveAudioError> {
        if self.state.is_running() {
            return Err(LiveAudioError::InvalidTransition {
                state: self.state.to_string(),
                action: "reset capture",
            });
        }
        *self.frames.lock() = FrameState::new(self.config.emission);
        self.state = PipelineState::Idle;
        Ok(())
    }
}

impl<P: CaptureProvider> Drop for CapturePipeline<P> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Per-block processing, run on the capture thread for every engine block.
///
/// The rate acquired at start tags every frame of the session. A block
/// reporting a different rate is still converted but does not retag.
fn process_block(
    frames: &Mutex<FrameState>,
    delivery: &Mutex<()>,
    on_frame: &FrameCallback,
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) {
    let mono = if channels > 1 {
        pcm::downmix_to_mono(samples, channels as usize)
    } else {
        samples.to_vec()
    };
    let converted = pcm::convert_block(&mono);

    let _delivery = delivery.lock();
    let frame = {
        let mut state = frames.lock();
        if !state.accepting {
            return;
        }
        if sample_rate != state.sample_rate && !state.rate_mismatch_logged {
            log::warn!(
                "capture block at {} Hz in a {} Hz session, keeping session rate",
                sample_rate,
                state.sample_rate
            );
            state.rate_mismatch_logged = true;
        }
        state.diagnostics.blocks_received += 1;
        state.diagnostics.samples_received += converted.len() as u64;

        let ready = match state.accumulator.as_mut() {
            Some(acc) => acc.push(converted),
            None if converted.is_empty() => None,
            None => Some(converted),
        };
        ready.map(|samples| state.encode(samples))
    };
    if let Some(frame) = frame {
        on_frame(&frame);
    }
}
