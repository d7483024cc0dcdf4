//! Audio device enumeration via the cpal default host.
//!
//! cpal exposes no stable endpoint IDs, so a device's name doubles as its ID.

use cpal::traits::{DeviceTrait, HostTrait};

use live_audio_core::models::audio_models::{AudioSource, DeviceDirection};
use live_audio_core::models::error::LiveAudioError;

/// Audio device enumerator over the platform's default cpal host.
pub struct DeviceEnumerator {
    host: cpal::Host,
}

impl DeviceEnumerator {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    /// List input (microphone) devices.
    pub fn list_capture_devices(&self) -> Result<Vec<AudioSource>, LiveAudioError> {
        let default_name = self.host.default_input_device().and_then(|d| d.name().ok());
        let devices = self
            .host
            .input_devices()
            .map_err(|e| LiveAudioError::Unknown(format!("failed to list input devices: {}", e)))?;
        Ok(collect_sources(devices, DeviceDirection::Input, default_name.as_deref()))
    }

    /// List output (speaker/headphone) devices.
    pub fn list_render_devices(&self) -> Result<Vec<AudioSource>, LiveAudioError> {
        let default_name = self.host.default_output_device().and_then(|d| d.name().ok());
        let devices = self
            .host
            .output_devices()
            .map_err(|e| LiveAudioError::Unknown(format!("failed to list output devices: {}", e)))?;
        Ok(collect_sources(devices, DeviceDirection::Output, default_name.as_deref()))
    }

    /// Input device by ID, or the default input device for `None`.
    pub fn capture_device(&self, id: Option<&str>) -> Result<cpal::Device, LiveAudioError> {
        match id {
            None => self
                .host
                .default_input_device()
                .ok_or(LiveAudioError::DeviceNotAvailable),
            Some(id) => self
                .host
                .input_devices()
                .map_err(|_| LiveAudioError::DeviceNotAvailable)?
                .find(|d| d.name().is_ok_and(|name| name == id))
                .ok_or(LiveAudioError::DeviceNotAvailable),
        }
    }

    /// Output device by ID, or the default output device for `None`.
    pub fn render_device(&self, id: Option<&str>) -> Result<cpal::Device, LiveAudioError> {
        match id {
            None => self
                .host
                .default_output_device()
                .ok_or(LiveAudioError::DeviceNotAvailable),
            Some(id) => self
                .host
                .output_devices()
                .map_err(|_| LiveAudioError::DeviceNotAvailable)?
                .find(|d| d.name().is_ok_and(|name| name == id))
                .ok_or(LiveAudioError::DeviceNotAvailable),
        }
    }
}

impl Default for DeviceEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_sources(
    devices: impl Iterator<Item = cpal::Device>,
    direction: DeviceDirection,
    default_name: Option<&str>,
) -> Vec<AudioSource> {
    devices
        .filter_map(|device| match device.name() {
            Ok(name) => Some(name),
            Err(e) => {
                log::debug!("skipping unnamed device: {}", e);
                None
            }
        })
        .map(|name| AudioSource {
            is_default: default_name == Some(name.as_str()),
            id: name.clone(),
            name,
            direction,
        })
        .collect()
}
