use crate::error::{DspError, Result};

/// Second-order section coefficients plus a per-section gain.
///
/// Unlike the direct form, `a0` is applied as an explicit division, so a
/// section does not have to be pre-normalized; it only has to be
/// non-degenerate (`a0 != 0`).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SectionCoeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a0: f32,
    pub a1: f32,
    pub a2: f32,
    pub gain: f32,
}

impl SectionCoeffs {
    /// Normalized section (a0 = 1) with unit gain.
    pub fn normalized(b0: f32, b1: f32, b2: f32, a1: f32, a2: f32, gain: f32) -> Self {
        Self {
            b0,
            b1,
            b2,
            a0: 1.0,
            a1,
            a2,
            gain,
        }
    }
}

/// One biquad stage: coefficients plus its own two-deep input and output
/// histories.
///
/// The history update happens after the difference equation: the current
/// input becomes `x1` for the next call and the pre-gain output becomes
/// `y1`. The gain only scales the value handed onward.
#[derive(Clone, Debug)]
struct BiquadSection {
    coeffs: SectionCoeffs,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl BiquadSection {
    fn new(coeffs: SectionCoeffs) -> Self {
        Self {
            coeffs,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    fn process(&mut self, x0: f32) -> f32 {
        let c = &self.coeffs;

        let y = (c.b0 * x0 + c.b1 * self.x1 + c.b2 * self.x2
            - c.a1 * self.y1
            - c.a2 * self.y2)
            / c.a0;

        self.x2 = self.x1;
        self.x1 = x0;
        self.y2 = self.y1;
        self.y1 = y;

        y * c.gain
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

/// Cascade of second-order sections
///
/// Sections run in index order; each section's gain-scaled output is the
/// next section's input, and the final section's value is the cascade
/// output. Splitting a high-order recursive filter into biquads keeps each
/// stage's coefficients small and well-conditioned, which is why this form
/// is preferred over `DirectFormIir` beyond a few poles.
pub struct SosCascade {
    sections: Vec<BiquadSection>,
}

impl SosCascade {
    /// Create a cascade from section definitions.
    ///
    /// # Errors
    /// - `DspError::EmptyCascade` if `sections` is empty
    /// - `DspError::DegenerateSection` if any section has `a0 == 0`
    pub fn new(sections: &[SectionCoeffs]) -> Result<Self> {
        if sections.is_empty() {
            return Err(DspError::EmptyCascade);
        }
        for (index, coeffs) in sections.iter().enumerate() {
            if coeffs.a0 == 0.0 {
                return Err(DspError::DegenerateSection { index });
            }
        }
        Ok(Self {
            sections: sections.iter().copied().map(BiquadSection::new).collect(),
        })
    }

    /// Process a single sample through every section in order.
    pub fn process(&mut self, sample: f32) -> f32 {
        let mut x = sample;
        for section in &mut self.sections {
            x = section.process(x);
        }
        x
    }

    /// Process an entire buffer of samples in-place.
    pub fn process_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Number of second-order sections.
    pub fn num_sections(&self) -> usize {
        self.sections.len()
    }

    /// Zero every section's history.
    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn demo_cascade() -> Vec<SectionCoeffs> {
        // Three-section lowpass from the reference design set.
        vec![
            SectionCoeffs {
                b0: 1.0,
                b1: 2.0,
                b2: 1.0,
                a0: 1.0,
                a1: 0.0,
                a2: 0.5279,
                gain: 0.3820,
            },
            SectionCoeffs {
                b0: 1.0,
                b1: 2.0,
                b2: 1.0,
                a0: 1.0,
                a1: 0.0,
                a2: 0.1056,
                gain: 0.2764,
            },
            SectionCoeffs {
                b0: 1.0,
                b1: 1.0,
                b2: 0.0,
                a0: 1.0,
                a1: 0.0,
                a2: 0.0,
                gain: 0.5,
            },
        ]
    }

    #[test]
    fn test_rejects_empty_cascade() {
        assert!(matches!(SosCascade::new(&[]), Err(DspError::EmptyCascade)));
    }

    #[test]
    fn test_rejects_degenerate_section() {
        let mut sections = demo_cascade();
        sections[1].a0 = 0.0;
        assert!(matches!(
            SosCascade::new(&sections),
            Err(DspError::DegenerateSection { index: 1 })
        ));
    }

    #[test]
    fn test_zero_input_gives_zero_output() {
        let mut cascade = SosCascade::new(&demo_cascade()).unwrap();
        for _ in 0..64 {
            assert_eq!(cascade.process(0.0), 0.0);
        }
    }

    #[test]
    fn test_single_section_impulse() {
        // One FIR-only section: impulse response is gain * {b0, b1, b2}.
        let section = SectionCoeffs::normalized(0.5, 0.25, 0.125, 0.0, 0.0, 2.0);
        let mut cascade = SosCascade::new(&[section]).unwrap();

        assert_abs_diff_eq!(cascade.process(1.0), 1.0, epsilon = 1e-7);
        assert_abs_diff_eq!(cascade.process(0.0), 0.5, epsilon = 1e-7);
        assert_abs_diff_eq!(cascade.process(0.0), 0.25, epsilon = 1e-7);
        assert_abs_diff_eq!(cascade.process(0.0), 0.0, epsilon = 1e-7);
    }

    #[test]
    fn test_unnormalized_a0_divides() {
        // Doubling a0 must halve the output of a feed-forward section.
        let section = SectionCoeffs {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a0: 2.0,
            a1: 0.0,
            a2: 0.0,
            gain: 1.0,
        };
        let mut cascade = SosCascade::new(&[section]).unwrap();
        assert_abs_diff_eq!(cascade.process(1.0), 0.5, epsilon = 1e-7);
    }

    #[test]
    fn test_gain_applies_after_history_update() {
        // The stored output history is pre-gain: a gain-0 section must still
        // feed its internal recursion as if the gain were 1.
        let section = SectionCoeffs::normalized(1.0, 0.0, 0.0, -0.5, 0.0, 0.0);
        let mut cascade = SosCascade::new(&[section]).unwrap();
        // Output is always zero because of the gain...
        assert_eq!(cascade.process(1.0), 0.0);
        assert_eq!(cascade.process(0.0), 0.0);
        // ...but the pre-gain recursion kept running; a sibling cascade with
        // unit gain shows the underlying state evolution.
        let unit = SectionCoeffs::normalized(1.0, 0.0, 0.0, -0.5, 0.0, 1.0);
        let mut reference = SosCascade::new(&[unit]).unwrap();
        assert_abs_diff_eq!(reference.process(1.0), 1.0, epsilon = 1e-7);
        assert_abs_diff_eq!(reference.process(0.0), 0.5, epsilon = 1e-7);
    }
}
