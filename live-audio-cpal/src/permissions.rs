//! Microphone permission check and cpal error classification.
//!
//! cpal has no dedicated permission error. Denied access surfaces as a
//! backend-specific error whose description mentions it (macOS TCC, the
//! Windows privacy toggle, a sandboxed PipeWire portal), so those are
//! recognized by text.

use cpal::traits::{DeviceTrait, HostTrait};

use live_audio_core::models::error::LiveAudioError;

const PERMISSION_MARKERS: [&str; 4] = ["permission", "denied", "not authorized", "access"];

/// Check whether the default microphone can be opened.
///
/// Returns `Ok(false)` when there is no input device or access is denied.
pub fn check_microphone_permission() -> Result<bool, LiveAudioError> {
    let Some(device) = cpal::default_host().default_input_device() else {
        return Ok(false);
    };

    match device.default_input_config() {
        Ok(_) => Ok(true),
        Err(e) => match map_default_config_error(e) {
            LiveAudioError::PermissionDenied | LiveAudioError::DeviceNotAvailable => Ok(false),
            other => {
                // Other error, assume available but report
                log::warn!("Unexpected error checking mic permission: {}", other);
                Ok(true)
            }
        },
    }
}

pub(crate) fn map_default_config_error(e: cpal::DefaultStreamConfigError) -> LiveAudioError {
    match e {
        cpal::DefaultStreamConfigError::DeviceNotAvailable => LiveAudioError::DeviceNotAvailable,
        cpal::DefaultStreamConfigError::StreamTypeNotSupported => {
            LiveAudioError::ConfigurationFailed("stream type not supported".into())
        }
        other => classify_backend_error(&other.to_string()),
    }
}

pub(crate) fn map_build_error(e: cpal::BuildStreamError) -> LiveAudioError {
    match e {
        cpal::BuildStreamError::DeviceNotAvailable => LiveAudioError::DeviceNotAvailable,
        cpal::BuildStreamError::StreamConfigNotSupported => {
            LiveAudioError::ConfigurationFailed("stream config not supported".into())
        }
        other => classify_backend_error(&other.to_string()),
    }
}

pub(crate) fn map_play_error(e: cpal::PlayStreamError) -> LiveAudioError {
    match e {
        cpal::PlayStreamError::DeviceNotAvailable => LiveAudioError::DeviceNotAvailable,
        other => classify_backend_error(&other.to_string()),
    }
}

fn classify_backend_error(description: &str) -> LiveAudioError {
    let lower = description.to_lowercase();
    if PERMISSION_MARKERS.iter().any(|m| lower.contains(m)) {
        LiveAudioError::PermissionDenied
    } else {
        LiveAudioError::StreamFailed(description.to_string())
    }
}
