use crate::dsp::history::HistoryBuffer;
use crate::error::{DspError, Result};

/// Direct-form IIR filter
///
/// Recursive filter over two K-deep histories, one of past inputs and one
/// of past outputs:
///
/// ```text
/// y[n] = sum(b[i] * x[n-i], i = 0..K) - sum(a[i] * y[n-i], i = 1..K)
/// ```
///
/// Coefficients must be pre-normalized: `a[0]` is required to be exactly 1.0
/// at construction and is never applied as a division. Callers holding an
/// unnormalized design must divide both vectors by `a[0]` first.
///
/// No saturation is applied internally; range handling belongs to the
/// pipeline boundary. For higher orders prefer `SosCascade`, which keeps the
/// per-stage coefficients small and well-conditioned.
pub struct DirectFormIir {
    b: Vec<f32>,
    a: Vec<f32>,
    x_history: HistoryBuffer<f32>,
    y_history: HistoryBuffer<f32>,
}

impl DirectFormIir {
    /// Create a direct-form IIR filter from feed-forward (`b`) and feedback
    /// (`a`) coefficient vectors of equal length.
    ///
    /// # Errors
    /// - `DspError::EmptyCoefficients` if either vector is empty
    /// - `DspError::CoefficientLengthMismatch` if lengths differ
    /// - `DspError::Normalization` if `a[0] != 1.0`
    pub fn new(b: Vec<f32>, a: Vec<f32>) -> Result<Self> {
        if b.is_empty() || a.is_empty() {
            return Err(DspError::EmptyCoefficients);
        }
        if b.len() != a.len() {
            return Err(DspError::CoefficientLengthMismatch {
                forward: b.len(),
                feedback: a.len(),
            });
        }
        if a[0] != 1.0 {
            return Err(DspError::Normalization(a[0]));
        }
        let k = b.len();
        Ok(Self {
            b,
            a,
            x_history: HistoryBuffer::new(k),
            y_history: HistoryBuffer::new(k),
        })
    }

    /// Process a single sample through the filter.
    pub fn process(&mut self, sample: f32) -> f32 {
        self.x_history.push(sample);

        // Shift the output history first, reserving slot 0 for the value
        // computed below. y_history[i] then holds y[n-1-i] during the
        // feedback accumulation.
        self.y_history.shift();

        let mut y = 0.0f32;
        for (b, x) in self.b.iter().zip(self.x_history.as_slice()) {
            y += b * x;
        }
        let y_past = self.y_history.as_slice();
        for (a, y_prev) in self.a[1..].iter().zip(&y_past[1..]) {
            y -= a * y_prev;
        }

        self.y_history.set_front(y);
        y
    }

    /// Process an entire buffer of samples in-place.
    pub fn process_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Filter length K (order + 1).
    pub fn len(&self) -> usize {
        self.b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    /// Zero both histories.
    pub fn reset(&mut self) {
        self.x_history.clear();
        self.y_history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rejects_length_mismatch() {
        let result = DirectFormIir::new(vec![1.0, 0.5], vec![1.0]);
        assert!(matches!(
            result,
            Err(DspError::CoefficientLengthMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_unnormalized_feedback() {
        let result = DirectFormIir::new(vec![1.0, 0.0], vec![2.0, 0.0]);
        assert!(matches!(result, Err(DspError::Normalization(_))));
    }

    #[test]
    fn test_zero_input_gives_zero_output() {
        let mut filter = DirectFormIir::new(
            vec![0.0528, 0.2640, 0.5279, 0.5279, 0.2640, 0.0528],
            vec![1.0, 0.0, 0.6335, 0.0, 0.0557, 0.0],
        )
        .unwrap();
        for _ in 0..64 {
            assert_eq!(filter.process(0.0), 0.0);
        }
    }

    #[test]
    fn test_pure_feedforward_reduces_to_fir() {
        // With zero feedback taps the recursion disappears and the impulse
        // response is the b vector.
        let b = vec![0.5, 0.25, 0.125];
        let mut filter = DirectFormIir::new(b.clone(), vec![1.0, 0.0, 0.0]).unwrap();

        let mut output = Vec::new();
        output.push(filter.process(1.0));
        for _ in 1..b.len() {
            output.push(filter.process(0.0));
        }
        for (got, want) in output.iter().zip(&b) {
            assert_abs_diff_eq!(got, want, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_single_pole_feedback() {
        // y[n] = x[n] + 0.5 y[n-1]: impulse response 1, 0.5, 0.25, ...
        let mut filter = DirectFormIir::new(vec![1.0, 0.0], vec![1.0, -0.5]).unwrap();
        assert_abs_diff_eq!(filter.process(1.0), 1.0, epsilon = 1e-7);
        assert_abs_diff_eq!(filter.process(0.0), 0.5, epsilon = 1e-7);
        assert_abs_diff_eq!(filter.process(0.0), 0.25, epsilon = 1e-7);
        assert_abs_diff_eq!(filter.process(0.0), 0.125, epsilon = 1e-7);
    }
}
