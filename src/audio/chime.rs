//! Rep-completion chime: a short decaying sine blip.

use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44100;

pub struct RepChime {
    freq: f32,
    amplitude: f32,
    total_samples: usize,
    num_sample: usize,
}

impl RepChime {
    pub fn new(volume: f32) -> Self {
        Self::with_params(880.0, Duration::from_millis(150), volume)
    }

    pub fn with_params(freq: f32, duration: Duration, volume: f32) -> Self {
        let total_samples = (duration.as_secs_f32() * SAMPLE_RATE as f32) as usize;
        Self {
            freq,
            amplitude: volume.clamp(0.0, 1.0) * 0.4,
            total_samples,
            num_sample: 0,
        }
    }
}

impl Iterator for RepChime {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples {
            return None;
        }
        let t = self.num_sample as f32 / SAMPLE_RATE as f32;
        self.num_sample += 1;

        // Linear fade-out keeps the blip click-free.
        let envelope = 1.0 - self.num_sample as f32 / self.total_samples as f32;
        Some((2.0 * PI * self.freq * t).sin() * envelope * self.amplitude)
    }
}

impl Source for RepChime {
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
        Some(Duration::from_secs_f32(
            self.total_samples as f32 / SAMPLE_RATE as f32,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_and_bounded() {
        let chime = RepChime::new(1.0);
        let samples: Vec<f32> = chime.collect();
        assert_eq!(samples.len(), (0.15 * SAMPLE_RATE as f32) as usize);
        assert!(samples.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn volume_scales_amplitude() {
        let loud: f32 = RepChime::new(1.0).fold(0.0, |acc, s| acc.max(s.abs()));
        let quiet: f32 = RepChime::new(0.2).fold(0.0, |acc, s| acc.max(s.abs()));
        assert!(loud > quiet);
    }

    #[test]
    fn zero_volume_is_silent() {
        assert!(RepChime::new(0.0).all(|s| s == 0.0));
    }
}
