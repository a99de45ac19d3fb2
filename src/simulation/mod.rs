//! Synthetic acquisition signals for demos and stress tests.
//!
//! Generates raw ADC-style codes directly, biased to mid-scale the way a
//! unipolar converter sees a bipolar signal.

use std::f32::consts::PI;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::pipeline::Scaling;

/// One sinusoidal component of a test signal.
#[derive(Clone, Copy, Debug)]
pub struct Tone {
    pub freq_hz: f32,
    /// Peak amplitude as a fraction of half scale (0..=1).
    pub amplitude: f32,
}

/// Test-signal description.
#[derive(Clone, Debug)]
pub struct SignalSpec {
    pub sample_rate_hz: f32,
    pub tones: Vec<Tone>,
    /// RMS of additive Gaussian noise, same units as `Tone::amplitude`.
    pub noise_rms: f32,
    pub seed: u64,
}

impl SignalSpec {
    pub fn tone(sample_rate_hz: f32, freq_hz: f32, amplitude: f32) -> Self {
        Self {
            sample_rate_hz,
            tones: vec![Tone { freq_hz, amplitude }],
            noise_rms: 0.0,
            seed: 0,
        }
    }

    pub fn with_noise(mut self, noise_rms: f32) -> Self {
        self.noise_rms = noise_rms;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Generate `count` acquisition codes for the given signal.
pub fn generate_codes(spec: &SignalSpec, count: usize, scaling: Scaling) -> Vec<u16> {
    let mut rng = ChaCha8Rng::seed_from_u64(spec.seed);
    let noise = Normal::new(0.0f32, spec.noise_rms.max(f32::MIN_POSITIVE)).unwrap();

    let full_scale = scaling.input_full_scale() as f32;
    (0..count)
        .map(|i| {
            let t = i as f32 / spec.sample_rate_hz;
            let mut value: f32 = spec
                .tones
                .iter()
                .map(|tone| tone.amplitude * (2.0 * PI * tone.freq_hz * t).sin())
                .sum();
            if spec.noise_rms > 0.0 {
                value += noise.sample(&mut rng);
            }
            // Bias the bipolar signal to mid-scale and quantize.
            let unit = (value.clamp(-1.0, 1.0) + 1.0) / 2.0;
            (unit * full_scale) as u16
        })
        .collect()
}
