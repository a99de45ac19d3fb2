use num_complex::Complex32;

/// Magnitude of every bin of a transformed block.
pub fn magnitudes(block: &[Complex32]) -> Vec<f32> {
    block.iter().map(|bin| bin.norm()).collect()
}

/// Index and magnitude of the strongest bin, ignoring DC.
///
/// Only the first half of the spectrum is searched; for real input the
/// upper half mirrors it.
pub fn peak_bin(block: &[Complex32]) -> Option<(usize, f32)> {
    let half = block.len() / 2;
    block
        .iter()
        .enumerate()
        .take(half.max(1))
        .skip(1)
        .map(|(i, bin)| (i, bin.norm()))
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::fft::FftEngine;
    use std::f32::consts::PI;

    #[test]
    fn test_peak_bin_finds_sinusoid() {
        let n = 64;
        let bin = 4;
        let engine = FftEngine::new(n).unwrap();
        let mut block: Vec<Complex32> = (0..n)
            .map(|i| Complex32::new((2.0 * PI * bin as f32 * i as f32 / n as f32).sin(), 0.0))
            .collect();
        engine.forward(&mut block);

        let (peak, _) = peak_bin(&block).unwrap();
        assert_eq!(peak, bin);
    }

    #[test]
    fn test_magnitudes_length() {
        let block = vec![Complex32::new(1.0, -1.0); 8];
        let mags = magnitudes(&block);
        assert_eq!(mags.len(), 8);
        assert!((mags[0] - 2.0f32.sqrt()).abs() < 1e-6);
    }
}
