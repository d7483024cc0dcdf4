use std::sync::Arc;

/// Direction of an audio device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceDirection {
    Input,
    Output,
}

/// An audio device available for capture or playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSource {
    pub id: String,
    pub name: String,
    pub direction: DeviceDirection,
    pub is_default: bool,
}

/// One transport-ready capture frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    /// Base64 of the frame's 16-bit little-endian PCM bytes.
    pub data: String,
    /// Capture rate the samples were taken at.
    pub sample_rate: u32,
    pub sample_count: usize,
}

impl EncodedFrame {
    /// Mime type the receiving decoder expects, e.g. `audio/pcm;rate=48000`.
    pub fn mime_type(&self) -> String {
        pcm_mime_type(self.sample_rate)
    }
}

pub fn pcm_mime_type(sample_rate: u32) -> String {
    format!("audio/pcm;rate={}", sample_rate)
}

/// Decoded audio handed to an output device, fixed once scheduled.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackUnit {
    /// Start time on the output device clock, in seconds.
    pub start_time: f64,
    pub sample_rate: u32,
    pub samples: Arc<[f32]>,
}

impl PlaybackUnit {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration_secs()
    }
}

/// Where a chunk landed on the playback timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledUnit {
    pub start_time: f64,
    pub duration_secs: f64,
    pub sample_count: usize,
}

impl ScheduledUnit {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration_secs
    }
}

/// Counters for debugging a live audio session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineDiagnostics {
    pub blocks_received: u64,
    pub samples_received: u64,
    pub frames_emitted: u64,
    pub samples_emitted: u64,
    pub chunks_scheduled: u64,
    pub chunks_dropped: u64,
}
