use crate::dsp::history::HistoryBuffer;
use crate::error::{DspError, Result};

/// Floating-point FIR filter
///
/// Convolves the K most recent input samples against a fixed coefficient
/// vector of length K (filter order + 1). The coefficients are supplied at
/// construction and immutable afterwards; this crate does not design them.
pub struct FirFilter {
    coeffs: Vec<f32>,
    history: HistoryBuffer<f32>,
}

impl FirFilter {
    /// Create a FIR filter from pre-designed coefficients.
    ///
    /// # Errors
    /// Returns `DspError::EmptyCoefficients` if `coeffs` is empty.
    pub fn new(coeffs: Vec<f32>) -> Result<Self> {
        if coeffs.is_empty() {
            return Err(DspError::EmptyCoefficients);
        }
        Ok(Self {
            history: HistoryBuffer::new(coeffs.len()),
            coeffs,
        })
    }

    /// Process a single sample through the filter.
    pub fn process(&mut self, sample: f32) -> f32 {
        self.history.push(sample);

        let mut output = 0.0f32;
        for (coeff, past) in self.coeffs.iter().zip(self.history.as_slice()) {
            output += coeff * past;
        }
        output
    }

    /// Process an entire buffer of samples in-place.
    pub fn process_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Number of taps (filter order + 1).
    pub fn num_taps(&self) -> usize {
        self.coeffs.len()
    }

    /// Tap coefficients.
    pub fn coeffs(&self) -> &[f32] {
        &self.coeffs
    }

    /// Zero the delay line.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}
