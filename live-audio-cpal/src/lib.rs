//! # live-audio-cpal
//!
//! Cross-platform device backend for live-audio-core, built on cpal.
//!
//! Provides:
//! - `CpalMicCapture`: microphone input as a `CaptureProvider`
//! - `CpalOutputProvider`: lazily opened output devices for the `PlaybackScheduler`
//! - `DeviceEnumerator`: input and output device listing
//! - `permissions`: microphone access check
//!
//! ## Usage
//! ```ignore
//! use live_audio_core::{CaptureConfiguration, CapturePipeline, PlaybackConfiguration, PlaybackScheduler};
//! use live_audio_cpal::{CpalMicCapture, CpalOutputProvider};
//!
//! let mut capture = CapturePipeline::new(
//!     CpalMicCapture::default_device(),
//!     CaptureConfiguration::default(),
//!     Arc::new(|frame| send(frame.mime_type(), &frame.data)),
//! )?;
//! let mut playback = PlaybackScheduler::new(
//!     CpalOutputProvider::default_device(),
//!     PlaybackConfiguration::default(),
//! )?;
//! ```

pub mod cpal_mic;
pub mod cpal_output;
pub mod device_enumerator;
pub mod permissions;

pub use cpal_mic::CpalMicCapture;
pub use cpal_output::{CpalOutput, CpalOutputProvider};
pub use device_enumerator::DeviceEnumerator;
pub use permissions::check_microphone_permission;
