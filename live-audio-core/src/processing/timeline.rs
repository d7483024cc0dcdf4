use std::collections::VecDeque;

use crate::models::audio_models::PlaybackUnit;

/// Device-side playback timeline.
///
/// Output backends own one of these per open device. Scheduled units are
/// mixed into the device buffer at their start times, resampled from the
/// unit rate to the device rate by linear interpolation. The clock is the
/// number of frames rendered so far, so it only advances while the device
/// pulls audio and stays frozen while suspended.
#[derive(Debug)]
pub struct PlaybackTimeline {
    device_sample_rate: u32,
    channels: usize,
    frames_rendered: u64,
    suspended: bool,
    units: VecDeque<PlaybackUnit>,
}

impl PlaybackTimeline {
    pub fn new(device_sample_rate: u32, channels: usize) -> Self {
        Self {
            device_sample_rate,
            channels: channels.max(1),
            frames_rendered: 0,
            suspended: false,
            units: VecDeque::new(),
        }
    }

    /// Seconds of audio rendered since the device opened.
    pub fn current_time(&self) -> f64 {
        self.frames_rendered as f64 / self.device_sample_rate as f64
    }

    pub fn device_sample_rate(&self) -> u32 {
        self.device_sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Queue a unit and return the time it will actually start.
    ///
    /// A start time the clock has already passed is moved up to now, so the
    /// unit plays from its first sample. Units arrive in non-decreasing
    /// start order.
    pub fn schedule(&mut self, mut unit: PlaybackUnit) -> f64 {
        unit.start_time = unit.start_time.max(self.current_time());
        let start_time = unit.start_time;
        self.units.push_back(unit);
        start_time
    }

    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Units scheduled but not yet fully played.
    pub fn pending_units(&self) -> usize {
        self.units.len()
    }

    /// Drop every pending unit.
    pub fn clear(&mut self) {
        self.units.clear();
    }

    /// Fill an interleaved device buffer and advance the clock.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        if self.suspended {
            return;
        }

        let rate = self.device_sample_rate as f64;
        let frames = out.len() / self.channels;
        for (i, frame) in out.chunks_exact_mut(self.channels).enumerate() {
            let t = (self.frames_rendered + i as u64) as f64 / rate;
            let mut mixed = 0.0f32;
            for unit in &self.units {
                if t < unit.start_time {
                    break;
                }
                if let Some(sample) = sample_at(unit, t - unit.start_time) {
                    mixed += sample;
                }
            }
            frame.fill(mixed.clamp(-1.0, 1.0));
        }

        self.frames_rendered += frames as u64;
        let now = self.current_time();
        self.units.retain(|unit| unit.end_time() > now);
    }
}

fn sample_at(unit: &PlaybackUnit, offset_secs: f64) -> Option<f32> {
    let position = offset_secs * unit.sample_rate as f64;
    let index = position as usize;
    let current = *unit.samples.get(index)?;
    let fraction = (position - index as f64) as f32;
    let next = unit.samples.get(index + 1).copied().unwrap_or(current);
    Some(current * (1.0 - fraction) + next * fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::sync::Arc;

    fn unit(start_time: f64, sample_rate: u32, samples: &[f32]) -> PlaybackUnit {
        PlaybackUnit {
            start_time,
            sample_rate,
            samples: Arc::from(samples),
        }
    }

    #[test]
    fn renders_unit_at_matching_rate() {
        let mut timeline = PlaybackTimeline::new(4, 1);
        timeline.schedule(unit(0.0, 4, &[0.1, 0.2, 0.3, 0.4]));

        let mut out = [0.0f32; 4];
        timeline.render(&mut out);

        assert_eq!(out, [0.1, 0.2, 0.3, 0.4]);
        assert_abs_diff_eq!(timeline.current_time(), 1.0);
        assert_eq!(timeline.pending_units(), 0);
    }

    #[test]
    fn unit_waits_for_its_start_time() {
        let mut timeline = PlaybackTimeline::new(4, 1);
        timeline.schedule(unit(0.5, 4, &[0.5, 0.5]));

        let mut out = [0.0f32; 4];
        timeline.render(&mut out);

        assert_eq!(out, [0.0, 0.0, 0.5, 0.5]);
    }

    #[test]
    fn back_to_back_units_leave_no_gap() {
        let mut timeline = PlaybackTimeline::new(4, 1);
        timeline.schedule(unit(0.0, 4, &[0.1, 0.2]));
        timeline.schedule(unit(0.5, 4, &[0.3, 0.4]));

        let mut out = [0.0f32; 4];
        timeline.render(&mut out);

        assert_eq!(out, [0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn late_unit_starts_from_its_first_sample() {
        let mut timeline = PlaybackTimeline::new(4, 1);
        let mut out = [0.0f32; 2];
        timeline.render(&mut out);

        let start = timeline.schedule(unit(0.0, 4, &[0.1, 0.2, 0.3, 0.4]));
        assert_abs_diff_eq!(start, 0.5);

        let mut out = [0.0f32; 4];
        timeline.render(&mut out);
        assert_eq!(out, [0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn upsamples_by_interpolation() {
        let mut timeline = PlaybackTimeline::new(8, 1);
        timeline.schedule(unit(0.0, 4, &[0.0, 1.0]));

        let mut out = [0.0f32; 4];
        timeline.render(&mut out);

        assert_abs_diff_eq!(out[0], 0.0);
        assert_abs_diff_eq!(out[1], 0.5);
        assert_abs_diff_eq!(out[2], 1.0);
        assert_abs_diff_eq!(out[3], 1.0);
    }

    #[test]
    fn duplicates_mono_across_channels() {
        let mut timeline = PlaybackTimeline::new(4, 2);
        timeline.schedule(unit(0.0, 4, &[0.25, -0.25]));

        let mut out = [0.0f32; 4];
        timeline.render(&mut out);

        assert_eq!(out, [0.25, 0.25, -0.25, -0.25]);
        assert_abs_diff_eq!(timeline.current_time(), 0.5);
    }

    #[test]
    fn suspended_timeline_is_silent_and_frozen() {
        let mut timeline = PlaybackTimeline::new(4, 1);
        timeline.schedule(unit(0.0, 4, &[0.9, 0.9]));
        timeline.suspend();

        let mut out = [1.0f32; 4];
        timeline.render(&mut out);

        assert_eq!(out, [0.0; 4]);
        assert_eq!(timeline.current_time(), 0.0);
        assert_eq!(timeline.pending_units(), 1);

        timeline.resume();
        timeline.render(&mut out);
        assert_eq!(out, [0.9, 0.9, 0.0, 0.0]);
    }

    #[test]
    fn clear_aborts_pending_units() {
        let mut timeline = PlaybackTimeline::new(4, 1);
        timeline.schedule(unit(0.0, 4, &[0.5; 8]));
        timeline.clear();

        let mut out = [0.0f32; 4];
        timeline.render(&mut out);
        assert_eq!(out, [0.0; 4]);
    }
}
