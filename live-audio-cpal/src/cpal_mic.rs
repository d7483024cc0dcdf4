//! cpal microphone capture provider.
//!
//! Opens the input device at its native format and delivers f32 blocks via
//! the `AudioBufferCallback`. The block size is whatever the host engine
//! hands out per callback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample};
use parking_lot::Mutex;

use live_audio_core::models::audio_models::{AudioSource, DeviceDirection};
use live_audio_core::models::error::LiveAudioError;
use live_audio_core::traits::capture_provider::{AudioBufferCallback, CaptureProvider};

use crate::device_enumerator::DeviceEnumerator;
use crate::permissions::{map_build_error, map_default_config_error, map_play_error};

/// cpal microphone capture.
///
/// The stream lives on a dedicated thread for its whole lifetime, since
/// `cpal::Stream` is not `Send` on every platform.
pub struct CpalMicCapture {
    device_id: Option<String>,
    device_name: String,
    is_default: bool,
    running: Arc<AtomicBool>,
    capture_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl CpalMicCapture {
    /// Create a capture for the system default microphone.
    pub fn default_device() -> Self {
        Self {
            device_id: None,
            device_name: "Default Microphone".into(),
            is_default: true,
            running: Arc::new(AtomicBool::new(false)),
            capture_handle: Mutex::new(None),
        }
    }

    /// Create a capture for a specific microphone by device ID.
    pub fn with_device(id: String) -> Self {
        Self {
            device_name: id.clone(),
            device_id: Some(id),
            is_default: false,
            running: Arc::new(AtomicBool::new(false)),
            capture_handle: Mutex::new(None),
        }
    }

    fn join_capture_thread(&self) {
        if let Some(handle) = self.capture_handle.lock().take() {
            let _ = handle.join();
        }
    }
}

impl CaptureProvider for CpalMicCapture {
    fn is_available(&self) -> bool {
        DeviceEnumerator::new()
            .capture_device(self.device_id.as_deref())
            .is_ok()
    }

    fn start(&mut self, callback: AudioBufferCallback) -> Result<u32, LiveAudioError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(LiveAudioError::InvalidTransition {
                state: "running".into(),
                action: "start microphone",
            });
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let device_id = self.device_id.clone();
        let (ready_tx, ready_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("cpal-mic-capture".into())
            .spawn(move || {
                let stream = match open_input_stream(device_id.as_deref(), callback) {
                    Ok((stream, sample_rate)) => {
                        let _ = ready_tx.send(Ok(sample_rate));
                        stream
                    }
                    Err(e) => {
                        running.store(false, Ordering::SeqCst);
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                while running.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(10));
                }

                if let Err(e) = stream.pause() {
                    log::debug!("ignoring input pause error: {}", e);
                }
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                LiveAudioError::Unknown(format!("failed to spawn mic thread: {}", e))
            })?;

        *self.capture_handle.lock() = Some(handle);

        match ready_rx.recv() {
            Ok(Ok(sample_rate)) => Ok(sample_rate),
            Ok(Err(e)) => {
                self.join_capture_thread();
                Err(e)
            }
            Err(_) => {
                self.running.store(false, Ordering::SeqCst);
                self.join_capture_thread();
                Err(LiveAudioError::Unknown("mic thread exited before reporting".into()))
            }
        }
    }

    fn stop(&mut self) -> Result<(), LiveAudioError> {
        self.running.store(false, Ordering::SeqCst);
        self.join_capture_thread();
        Ok(())
    }

    fn device_info(&self) -> AudioSource {
        AudioSource {
            id: self.device_id.clone().unwrap_or_else(|| "default-mic".into()),
            name: self.device_name.clone(),
            direction: DeviceDirection::Input,
            is_default: self.is_default,
        }
    }
}

impl Drop for CpalMicCapture {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Open and start the input stream. Runs on the capture thread.
fn open_input_stream(
    device_id: Option<&str>,
    callback: AudioBufferCallback,
) -> Result<(cpal::Stream, u32), LiveAudioError> {
    let device = DeviceEnumerator::new().capture_device(device_id)?;
    let supported = device
        .default_input_config()
        .map_err(map_default_config_error)?;
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.config();
    let sample_rate = config.sample_rate.0;

    log::info!(
        "opening input {} ({} ch, {} Hz, {:?})",
        device.name().unwrap_or_default(),
        config.channels,
        sample_rate,
        sample_format
    );

    let stream = match sample_format {
        SampleFormat::F32 => build_input::<f32>(&device, &config, callback),
        SampleFormat::I16 => build_input::<i16>(&device, &config, callback),
        SampleFormat::U16 => build_input::<u16>(&device, &config, callback),
        SampleFormat::I32 => build_input::<i32>(&device, &config, callback),
        other => Err(LiveAudioError::ConfigurationFailed(format!(
            "unsupported input sample format {:?}",
            other
        ))),
    }?;

    stream.play().map_err(map_play_error)?;
    Ok((stream, sample_rate))
}

fn build_input<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    callback: AudioBufferCallback,
) -> Result<cpal::Stream, LiveAudioError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let sample_rate = config.sample_rate.0;
    let channels = config.channels;
    let mut block: Vec<f32> = Vec::new();

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                block.clear();
                block.extend(data.iter().map(|s| s.to_sample::<f32>()));
                callback(&block, sample_rate, channels);
            },
            |err| log::warn!("input stream error: {}", err),
            None,
        )
        .map_err(map_build_error)
}
