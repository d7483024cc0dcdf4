/// Samples per outbound frame when accumulating capture blocks.
pub const DEFAULT_FRAME_THRESHOLD: usize = 4096;

/// Rate at which inbound synthesized speech is defined. Not negotiated.
pub const DEFAULT_OUTPUT_SAMPLE_RATE: u32 = 24000;

/// How converted capture blocks are turned into outbound frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEmission {
    /// One frame per engine block, as soon as it arrives.
    Immediate,
    /// Buffer blocks until at least `threshold` samples are pending, then
    /// emit everything accumulated as one frame.
    Accumulate { threshold: usize },
}

impl Default for FrameEmission {
    fn default() -> Self {
        Self::Accumulate {
            threshold: DEFAULT_FRAME_THRESHOLD,
        }
    }
}

/// Configuration for a capture pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureConfiguration {
    /// Frame emission strategy (default: accumulate 4096 samples).
    pub emission: FrameEmission,

    /// Specific microphone device ID, or None for system default.
    pub device_id: Option<String>,
}

impl CaptureConfiguration {
    pub fn immediate() -> Self {
        Self {
            emission: FrameEmission::Immediate,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if let FrameEmission::Accumulate { threshold } = self.emission {
            if threshold == 0 {
                return Err("frame threshold must be positive".into());
            }
        }
        Ok(())
    }
}

/// Configuration for a playback scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackConfiguration {
    /// Rate of the inbound PCM chunks in Hz (default: 24000).
    pub output_sample_rate: u32,

    /// Specific output device ID, or None for system default.
    pub device_id: Option<String>,
}

impl PlaybackConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.output_sample_rate == 0 {
            return Err("output sample rate must be positive".into());
        }
        Ok(())
    }
}

impl Default for PlaybackConfiguration {
    fn default() -> Self {
        Self {
            output_sample_rate: DEFAULT_OUTPUT_SAMPLE_RATE,
            device_id: None,
        }
    }
}
