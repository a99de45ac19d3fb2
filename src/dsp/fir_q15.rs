use crate::constants::{Q15_MAX, Q15_MIN, Q15_ONE};
use crate::dsp::history::HistoryBuffer;
use crate::error::{DspError, Result};

/// Saturate a wide accumulator down to the signed 16-bit Q15 range.
///
/// Clamps, never wraps.
#[inline]
pub fn saturate_q15(value: i32) -> i16 {
    value.clamp(Q15_MIN, Q15_MAX) as i16
}

/// Convert a real value in [-1, 1) to Q15, saturating at the rails.
#[inline]
pub fn q15_from_f32(value: f32) -> i16 {
    saturate_q15((value * Q15_ONE as f32) as i32)
}

/// Convert a Q15 value back to a real number.
#[inline]
pub fn q15_to_f32(value: i16) -> f32 {
    value as f32 / Q15_ONE as f32
}

/// Fixed-point Q15 FIR filter
///
/// Same structure as `FirFilter`, but coefficients and samples are 16-bit
/// Q15 integers (value / 32768). Each multiply produces a Q30 product; the
/// products are accumulated in a wide intermediate, shifted right by 15 to
/// return to Q15, and saturated to [-32768, 32767].
pub struct FirFilterQ15 {
    coeffs: Vec<i16>,
    history: HistoryBuffer<i16>,
}

impl FirFilterQ15 {
    /// Create a Q15 FIR filter from pre-scaled integer coefficients.
    pub fn new(coeffs: Vec<i16>) -> Result<Self> {
        if coeffs.is_empty() {
            return Err(DspError::EmptyCoefficients);
        }
        Ok(Self {
            history: HistoryBuffer::new(coeffs.len()),
            coeffs,
        })
    }

    /// Create from real coefficients, quantizing each to Q15.
    pub fn from_f32_coeffs(coeffs: &[f32]) -> Result<Self> {
        Self::new(coeffs.iter().copied().map(q15_from_f32).collect())
    }

    /// Process a single Q15 sample through the filter.
    pub fn process(&mut self, sample: i16) -> i16 {
        self.history.push(sample);

        // Each product is bounded by 2^30; accumulating in 64 bits keeps
        // the sum exact for any tap count before the single saturation step.
        let mut acc = 0i64;
        for (coeff, past) in self.coeffs.iter().zip(self.history.as_slice()) {
            acc += *coeff as i64 * *past as i64;
        }

        // Q30 -> Q15, then clamp.
        saturate_q15((acc >> 15).clamp(i32::MIN as i64, i32::MAX as i64) as i32)
    }

    /// Process an entire buffer of Q15 samples in-place.
    pub fn process_buffer(&mut self, buffer: &mut [i16]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn num_taps(&self) -> usize {
        self.coeffs.len()
    }

    pub fn coeffs(&self) -> &[i16] {
        &self.coeffs
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}
