//! cpal output device for the playback scheduler.
//!
//! Each `open` starts an output stream on its own thread. The stream callback
//! renders a shared `PlaybackTimeline`, which owns the device clock and the
//! queue of scheduled units.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample};
use parking_lot::Mutex;

use live_audio_core::models::audio_models::{AudioSource, DeviceDirection, PlaybackUnit};
use live_audio_core::models::error::LiveAudioError;
use live_audio_core::processing::timeline::PlaybackTimeline;
use live_audio_core::traits::audio_output::{AudioOutput, OutputProvider};

use crate::device_enumerator::DeviceEnumerator;
use crate::permissions::{map_build_error, map_default_config_error, map_play_error};

/// Opens cpal output devices on demand.
pub struct CpalOutputProvider {
    device_id: Option<String>,
}

impl CpalOutputProvider {
    pub fn default_device() -> Self {
        Self { device_id: None }
    }

    pub fn with_device(id: String) -> Self {
        Self {
            device_id: Some(id),
        }
    }
}

impl OutputProvider for CpalOutputProvider {
    type Output = CpalOutput;

    fn open(&mut self) -> Result<CpalOutput, LiveAudioError> {
        CpalOutput::open(self.device_id.clone())
    }

    fn device_info(&self) -> AudioSource {
        AudioSource {
            id: self
                .device_id
                .clone()
                .unwrap_or_else(|| "default-output".into()),
            name: self
                .device_id
                .clone()
                .unwrap_or_else(|| "Default Output".into()),
            direction: DeviceDirection::Output,
            is_default: self.device_id.is_none(),
        }
    }
}

/// An open cpal output stream.
pub struct CpalOutput {
    timeline: Arc<Mutex<PlaybackTimeline>>,
    running: Arc<AtomicBool>,
    output_handle: Option<thread::JoinHandle<()>>,
}

impl CpalOutput {
    fn open(device_id: Option<String>) -> Result<Self, LiveAudioError> {
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);
        let (ready_tx, ready_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("cpal-audio-output".into())
            .spawn(move || {
                let (stream, timeline) = match open_output_stream(device_id.as_deref()) {
                    Ok(opened) => opened,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(timeline));

                while thread_running.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(10));
                }

                if let Err(e) = stream.pause() {
                    log::debug!("ignoring output pause error: {}", e);
                }
            })
            .map_err(|e| LiveAudioError::Unknown(format!("failed to spawn output thread: {}", e)))?;

        match ready_rx.recv() {
            Ok(Ok(timeline)) => Ok(Self {
                timeline,
                running,
                output_handle: Some(handle),
            }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(LiveAudioError::Unknown(
                    "output thread exited before reporting".into(),
                ))
            }
        }
    }
}

impl AudioOutput for CpalOutput {
    fn current_time(&self) -> f64 {
        self.timeline.lock().current_time()
    }

    fn is_suspended(&self) -> bool {
        self.timeline.lock().is_suspended()
    }

    fn resume(&mut self) -> Result<(), LiveAudioError> {
        self.timeline.lock().resume();
        Ok(())
    }

    fn schedule(&mut self, unit: PlaybackUnit) -> Result<f64, LiveAudioError> {
        if self.output_handle.is_none() {
            return Err(LiveAudioError::StreamFailed("output device is closed".into()));
        }
        Ok(self.timeline.lock().schedule(unit))
    }

    fn close(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.timeline.lock().clear();
        if let Some(handle) = self.output_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        self.close();
    }
}

/// Open and start the output stream. Runs on the output thread.
fn open_output_stream(
    device_id: Option<&str>,
) -> Result<(cpal::Stream, Arc<Mutex<PlaybackTimeline>>), LiveAudioError> {
    let device = DeviceEnumerator::new().render_device(device_id)?;
    let supported = device
        .default_output_config()
        .map_err(map_default_config_error)?;
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.config();

    log::info!(
        "opening output {} ({} ch, {} Hz, {:?})",
        device.name().unwrap_or_default(),
        config.channels,
        config.sample_rate.0,
        sample_format
    );

    let timeline = Arc::new(Mutex::new(PlaybackTimeline::new(
        config.sample_rate.0,
        config.channels as usize,
    )));

    let stream = match sample_format {
        SampleFormat::F32 => build_output::<f32>(&device, &config, Arc::clone(&timeline)),
        SampleFormat::I16 => build_output::<i16>(&device, &config, Arc::clone(&timeline)),
        SampleFormat::U16 => build_output::<u16>(&device, &config, Arc::clone(&timeline)),
        SampleFormat::I32 => build_output::<i32>(&device, &config, Arc::clone(&timeline)),
        other => Err(LiveAudioError::ConfigurationFailed(format!(
            "unsupported output sample format {:?}",
            other
        ))),
    }?;

    stream.play().map_err(map_play_error)?;
    Ok((stream, timeline))
}

fn build_output<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    timeline: Arc<Mutex<PlaybackTimeline>>,
) -> Result<cpal::Stream, LiveAudioError>
where
    T: SizedSample + FromSample<f32>,
{
    let mut scratch: Vec<f32> = Vec::new();

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                scratch.resize(data.len(), 0.0);
                timeline.lock().render(&mut scratch);
                for (out, &sample) in data.iter_mut().zip(scratch.iter()) {
                    *out = T::from_sample(sample);
                }
            },
            |err| log::warn!("output stream error: {}", err),
            None,
        )
        .map_err(map_build_error)
}
