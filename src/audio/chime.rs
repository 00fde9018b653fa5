use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44_100;

/// Short confirmation tone: a single sine burst with a linear fade-out so it
/// ends without a click.
pub struct ChimeTone {
    freq: f32,
    total_samples: usize,
    num_sample: usize,
}

impl ChimeTone {
    pub fn new(freq: f32, duration_ms: u64) -> Self {
        Self {
            freq,
            total_samples: (SAMPLE_RATE as u64 * duration_ms / 1_000) as usize,
            num_sample: 0,
        }
    }

    /// The default "all keys held" confirmation: a short A5 ping.
    pub fn confirmation() -> Self {
        Self::new(880.0, 150)
    }
}

impl Iterator for ChimeTone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples {
            return None;
        }
        self.num_sample += 1;

        let t = self.num_sample as f32 / SAMPLE_RATE as f32;
        let fade = 1.0 - self.num_sample as f32 / self.total_samples as f32;
        let sample = (2.0 * PI * self.freq * t).sin() * fade;

        Some(sample * 0.15) // Lower amplitude to prevent clipping
    }
}

impl Source for ChimeTone {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_samples - self.num_sample)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_millis(
            self.total_samples as u64 * 1_000 / SAMPLE_RATE as u64,
        ))
    }
}
