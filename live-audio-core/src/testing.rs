//! In-memory providers for unit tests.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::audio_models::{AudioSource, DeviceDirection, PlaybackUnit};
use crate::models::error::LiveAudioError;
use crate::traits::audio_output::{AudioOutput, OutputProvider};
use crate::traits::capture_provider::{AudioBufferCallback, CaptureProvider};
use crate::traits::transport::LiveTransport;

#[derive(Default)]
struct MicInner {
    callback: Option<AudioBufferCallback>,
    last_callback: Option<AudioBufferCallback>,
    starts: u32,
    stops: u32,
}

/// Test-side handle that plays the role of the audio engine.
#[derive(Clone, Default)]
pub struct MicHandle {
    inner: Arc<Mutex<MicInner>>,
}

impl MicHandle {
    /// Deliver a mono block, as the engine would while capturing.
    pub fn feed(&self, samples: &[f32], sample_rate: u32) {
        self.feed_interleaved(samples, sample_rate, 1);
    }

    pub fn feed_interleaved(&self, samples: &[f32], sample_rate: u32, channels: u16) {
        let callback = self.inner.lock().callback.clone();
        if let Some(cb) = callback {
            cb(samples, sample_rate, channels);
        }
    }

    /// Deliver a block through the callback from the last session even if
    /// the provider has been stopped, like a late engine callback.
    pub fn feed_late(&self, samples: &[f32], sample_rate: u32) {
        let callback = self.inner.lock().last_callback.clone();
        if let Some(cb) = callback {
            cb(samples, sample_rate, 1);
        }
    }

    pub fn starts(&self) -> u32 {
        self.inner.lock().starts
    }

    pub fn stops(&self) -> u32 {
        self.inner.lock().stops
    }

    pub fn is_capturing(&self) -> bool {
        self.inner.lock().callback.is_some()
    }
}

pub struct FakeMic {
    sample_rate: u32,
    failure: Option<LiveAudioError>,
    handle: MicHandle,
}

impl FakeMic {
    pub fn new(sample_rate: u32) -> (Self, MicHandle) {
        let handle = MicHandle::default();
        let mic = Self {
            sample_rate,
            failure: None,
            handle: handle.clone(),
        };
        (mic, handle)
    }

    pub fn failing(error: LiveAudioError) -> (Self, MicHandle) {
        let (mut mic, handle) = Self::new(48000);
        mic.failure = Some(error);
        (mic, handle)
    }
}

impl CaptureProvider for FakeMic {
    fn is_available(&self) -> bool {
        self.failure.is_none()
    }

    fn start(&mut self, callback: AudioBufferCallback) -> Result<u32, LiveAudioError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let mut inner = self.handle.inner.lock();
        inner.starts += 1;
        inner.last_callback = Some(Arc::clone(&callback));
        inner.callback = Some(callback);
        Ok(self.sample_rate)
    }

    fn stop(&mut self) -> Result<(), LiveAudioError> {
        let mut inner = self.handle.inner.lock();
        inner.stops += 1;
        inner.callback = None;
        Ok(())
    }

    fn device_info(&self) -> AudioSource {
        AudioSource {
            id: "fake-mic".into(),
            name: "Fake Microphone".into(),
            direction: DeviceDirection::Input,
            is_default: true,
        }
    }
}

#[derive(Default)]
struct OutputInner {
    clock: f64,
    suspended: bool,
    open: bool,
    opened: u32,
    closed: u32,
    resumed: u32,
    delay_next_schedule: Option<f64>,
    scheduled: Vec<PlaybackUnit>,
}

/// Test-side handle onto the fake output device and its clock.
#[derive(Clone, Default)]
pub struct OutputHandle {
    inner: Arc<Mutex<OutputInner>>,
}

impl OutputHandle {
    pub fn set_clock(&self, secs: f64) {
        self.inner.lock().clock = secs;
    }

    pub fn advance(&self, secs: f64) {
        self.inner.lock().clock += secs;
    }

    /// Advance the clock by `secs` between the next clock read and the
    /// unit being queued, as a render callback can on a real device.
    pub fn delay_next_schedule(&self, secs: f64) {
        self.inner.lock().delay_next_schedule = Some(secs);
    }

    pub fn scheduled(&self) -> Vec<PlaybackUnit> {
        self.inner.lock().scheduled.clone()
    }

    pub fn start_times(&self) -> Vec<f64> {
        self.inner.lock().scheduled.iter().map(|u| u.start_time).collect()
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().open
    }

    pub fn opened(&self) -> u32 {
        self.inner.lock().opened
    }

    pub fn closed(&self) -> u32 {
        self.inner.lock().closed
    }

    pub fn resumed(&self) -> u32 {
        self.inner.lock().resumed
    }
}

pub struct ManualOutputProvider {
    start_suspended: bool,
    failure: Option<LiveAudioError>,
    handle: OutputHandle,
}

impl ManualOutputProvider {
    pub fn new() -> (Self, OutputHandle) {
        let handle = OutputHandle::default();
        let provider = Self {
            start_suspended: false,
            failure: None,
            handle: handle.clone(),
        };
        (provider, handle)
    }

    /// Devices open suspended, like a browser context before a user gesture.
    pub fn suspended() -> (Self, OutputHandle) {
        let (mut provider, handle) = Self::new();
        provider.start_suspended = true;
        (provider, handle)
    }

    pub fn failing(error: LiveAudioError) -> (Self, OutputHandle) {
        let (mut provider, handle) = Self::new();
        provider.failure = Some(error);
        (provider, handle)
    }
}

impl OutputProvider for ManualOutputProvider {
    type Output = ManualOutput;

    fn open(&mut self) -> Result<ManualOutput, LiveAudioError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let mut inner = self.handle.inner.lock();
        inner.open = true;
        inner.opened += 1;
        inner.suspended = self.start_suspended;
        Ok(ManualOutput {
            handle: self.handle.clone(),
        })
    }

    fn device_info(&self) -> AudioSource {
        AudioSource {
            id: "manual-output".into(),
            name: "Manual Output".into(),
            direction: DeviceDirection::Output,
            is_default: true,
        }
    }
}

pub struct ManualOutput {
    handle: OutputHandle,
}

impl AudioOutput for ManualOutput {
    fn current_time(&self) -> f64 {
        self.handle.inner.lock().clock
    }

    fn is_suspended(&self) -> bool {
        self.handle.inner.lock().suspended
    }

    fn resume(&mut self) -> Result<(), LiveAudioError> {
        let mut inner = self.handle.inner.lock();
        if inner.suspended {
            inner.suspended = false;
            inner.resumed += 1;
        }
        Ok(())
    }

    fn schedule(&mut self, mut unit: PlaybackUnit) -> Result<f64, LiveAudioError> {
        let mut inner = self.handle.inner.lock();
        if let Some(delay) = inner.delay_next_schedule.take() {
            inner.clock += delay;
        }
        unit.start_time = unit.start_time.max(inner.clock);
        let start_time = unit.start_time;
        inner.scheduled.push(unit);
        Ok(start_time)
    }

    fn close(&mut self) {
        let mut inner = self.handle.inner.lock();
        inner.open = false;
        inner.closed += 1;
    }
}

#[derive(Default)]
struct TransportInner {
    sent: Vec<(String, String)>,
    closed: u32,
    fail_sends: bool,
}

#[derive(Clone, Default)]
pub struct RecordingTransport {
    inner: Arc<Mutex<TransportInner>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.inner.lock().sent.clone()
    }

    pub fn closed(&self) -> u32 {
        self.inner.lock().closed
    }

    pub fn fail_sends(&self) {
        self.inner.lock().fail_sends = true;
    }
}

impl LiveTransport for RecordingTransport {
    fn send_realtime_audio(&self, mime_type: &str, data: &str) -> Result<(), LiveAudioError> {
        let mut inner = self.inner.lock();
        if inner.fail_sends {
            return Err(LiveAudioError::TransportFailed("connection reset".into()));
        }
        inner.sent.push((mime_type.to_string(), data.to_string()));
        Ok(())
    }

    fn close(&self) {
        self.inner.lock().closed += 1;
    }
}
