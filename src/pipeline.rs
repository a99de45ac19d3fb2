//! Sample pipeline: boundary scaling around an interchangeable filter stage.
//!
//! Raw unsigned acquisition codes are normalized to the unit range,
//! filtered, optionally re-centered, saturated, and rescaled to the output
//! code range. Both range conversions truncate toward zero; that rule is
//! part of the contract and covered by tests.

use num_complex::Complex32;

use crate::config::{FftConfig, Passband};
use crate::constants::{DEFAULT_INPUT_BITS, DEFAULT_OUTPUT_BITS, Q15_HALF, Q15_MAX};
use crate::dsp::{BlockAccumulator, DirectFormIir, FftEngine, FirFilter, FirFilterQ15, SosCascade};
use crate::error::{DspError, Result};

/// Common trait for per-sample filter stages.
///
/// Implemented by FirFilter, DirectFormIir, and SosCascade.
pub trait FilterStage {
    /// Process a single sample through the filter.
    fn process(&mut self, sample: f32) -> f32;

    /// Process a buffer of samples in-place.
    fn process_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}

impl FilterStage for FirFilter {
    fn process(&mut self, sample: f32) -> f32 {
        FirFilter::process(self, sample)
    }
}

impl FilterStage for DirectFormIir {
    fn process(&mut self, sample: f32) -> f32 {
        DirectFormIir::process(self, sample)
    }
}

impl FilterStage for SosCascade {
    fn process(&mut self, sample: f32) -> f32 {
        SosCascade::process(self, sample)
    }
}

/// Bit widths of the two range-conversion seams.
#[derive(Debug, Clone, Copy)]
pub struct Scaling {
    input_bits: u32,
    output_bits: u32,
}

impl Scaling {
    /// 12-bit codes in, 8-bit codes out.
    pub fn adc12_dac8() -> Self {
        Self {
            input_bits: DEFAULT_INPUT_BITS,
            output_bits: DEFAULT_OUTPUT_BITS,
        }
    }

    pub fn new(input_bits: u32, output_bits: u32) -> Result<Self> {
        if input_bits == 0 || input_bits > 16 {
            return Err(DspError::Config(format!(
                "input bit width must be 1..=16, got {}",
                input_bits
            )));
        }
        if output_bits == 0 || output_bits > 8 {
            return Err(DspError::Config(format!(
                "output bit width must be 1..=8, got {}",
                output_bits
            )));
        }
        Ok(Self {
            input_bits,
            output_bits,
        })
    }

    /// Largest input code (e.g. 4095 for 12 bits).
    pub fn input_full_scale(&self) -> u16 {
        ((1u32 << self.input_bits) - 1) as u16
    }

    /// Largest output code (e.g. 255 for 8 bits).
    pub fn output_full_scale(&self) -> u8 {
        ((1u32 << self.output_bits) - 1) as u8
    }

    /// Raw code -> [0, 1]. Codes above full scale clamp to 1.0.
    pub fn normalize(&self, code: u16) -> f32 {
        let full_scale = self.input_full_scale();
        code.min(full_scale) as f32 / full_scale as f32
    }

    /// [0, 1] -> output code, clamping first, truncating toward zero.
    pub fn to_output_code(&self, value: f32) -> u8 {
        let clamped = value.clamp(0.0, 1.0);
        (clamped * self.output_full_scale() as f32) as u8
    }

    /// Raw code -> Q15, truncating toward zero. Full scale maps to 32767.
    pub fn normalize_q15(&self, code: u16) -> i16 {
        let full_scale = self.input_full_scale();
        let code = code.min(full_scale);
        ((code as i32 * Q15_MAX) / full_scale as i32) as i16
    }

    /// Q15 -> output code. Negative values clamp to 0, truncating toward
    /// zero otherwise.
    pub fn q15_to_output_code(&self, value: i16) -> u8 {
        let clamped = (value as i32).clamp(0, Q15_MAX);
        ((clamped * self.output_full_scale() as i32) / Q15_MAX) as u8
    }
}

impl Default for Scaling {
    fn default() -> Self {
        Self::adc12_dac8()
    }
}

/// Floating-point sample pipeline around a filter stage.
///
/// Non-lowpass passbands strip the acquisition DC bias, leaving the signal
/// centered on zero; for those the half-scale offset is restored before
/// output scaling.
pub struct Pipeline<S: FilterStage> {
    stage: S,
    scaling: Scaling,
    restore_dc: bool,
}

impl<S: FilterStage> Pipeline<S> {
    pub fn new(stage: S, scaling: Scaling, passband: Passband) -> Self {
        Self {
            stage,
            scaling,
            restore_dc: !passband.passes_dc(),
        }
    }

    /// One raw input code in, one output code out.
    pub fn process_code(&mut self, code: u16) -> u8 {
        let normalized = self.scaling.normalize(code);
        let mut filtered = self.stage.process(normalized);
        if self.restore_dc {
            filtered += 0.5;
        }
        self.scaling.to_output_code(filtered)
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }
}

/// Q15 fixed-point pipeline.
///
/// Identical boundary behavior to `Pipeline`, with the DC restoration
/// applied scale-aware: +0.5 in Q15 is a saturating add of 16384, not a
/// float literal.
pub struct PipelineQ15 {
    filter: FirFilterQ15,
    scaling: Scaling,
    restore_dc: bool,
}

impl PipelineQ15 {
    pub fn new(filter: FirFilterQ15, scaling: Scaling, passband: Passband) -> Self {
        Self {
            filter,
            scaling,
            restore_dc: !passband.passes_dc(),
        }
    }

    pub fn process_code(&mut self, code: u16) -> u8 {
        let sample = self.scaling.normalize_q15(code);
        let mut filtered = self.filter.process(sample);
        if self.restore_dc {
            filtered = filtered.saturating_add(Q15_HALF);
        }
        self.scaling.q15_to_output_code(filtered)
    }
}

/// Block spectrum analyzer: accumulates scalar samples and transforms each
/// completed block.
///
/// Diagnostic path only; it produces spectra for a consumer to inspect and
/// never drives output codes.
pub struct FftAnalyzer {
    engine: FftEngine,
    accumulator: BlockAccumulator,
    scaling: Scaling,
}

impl FftAnalyzer {
    pub fn new(config: FftConfig, scaling: Scaling) -> Result<Self> {
        Ok(Self {
            engine: FftEngine::new(config.block_len)?,
            accumulator: BlockAccumulator::new(config.block_len)?,
            scaling,
        })
    }

    /// Feed one raw code. Returns the transformed block once per N samples.
    pub fn process_code(&mut self, code: u16) -> Option<Vec<Complex32>> {
        let normalized = self.scaling.normalize(code);
        let engine = &self.engine;
        self.accumulator.push(normalized).map(|block| {
            engine.forward(block);
            block.to_vec()
        })
    }

    pub fn block_len(&self) -> usize {
        self.engine.block_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets;

    #[test]
    fn test_scaling_rejects_bad_widths() {
        assert!(Scaling::new(0, 8).is_err());
        assert!(Scaling::new(12, 0).is_err());
        assert!(Scaling::new(17, 8).is_err());
        assert!(Scaling::new(12, 9).is_err());
        assert!(Scaling::new(12, 8).is_ok());
    }

    #[test]
    fn test_normalize_endpoints_and_clamp() {
        let scaling = Scaling::adc12_dac8();
        assert_eq!(scaling.normalize(0), 0.0);
        assert_eq!(scaling.normalize(4095), 1.0);
        // Codes beyond the configured bit width clamp, never exceed 1.0.
        assert_eq!(scaling.normalize(u16::MAX), 1.0);
    }

    #[test]
    fn test_output_truncates_toward_zero() {
        let scaling = Scaling::adc12_dac8();
        // 0.999 * 255 = 254.745 -> 254, not 255.
        assert_eq!(scaling.to_output_code(0.999), 254);
        assert_eq!(scaling.to_output_code(1.0), 255);
        assert_eq!(scaling.to_output_code(0.0), 0);
    }

    #[test]
    fn test_output_clamps_out_of_range() {
        let scaling = Scaling::adc12_dac8();
        assert_eq!(scaling.to_output_code(1.7), 255);
        assert_eq!(scaling.to_output_code(-0.3), 0);
    }

    #[test]
    fn test_q15_seam_truncates() {
        let scaling = Scaling::adc12_dac8();
        assert_eq!(scaling.normalize_q15(0), 0);
        assert_eq!(scaling.normalize_q15(4095), 32767);
        // 2048 * 32767 / 4095 truncates to 16387.
        assert_eq!(scaling.normalize_q15(2048), 16387);
        assert_eq!(scaling.q15_to_output_code(32767), 255);
        assert_eq!(scaling.q15_to_output_code(-5), 0);
    }

    #[test]
    fn test_lowpass_pipeline_passes_midscale() {
        let design = presets::fir_average();
        let mut pipeline = Pipeline::new(
            design.build().unwrap(),
            Scaling::adc12_dac8(),
            design.passband,
        );
        // Constant mid-scale input settles to mid-scale output.
        let mut code = 0;
        for _ in 0..16 {
            code = pipeline.process_code(2048);
        }
        assert!((126..=128).contains(&code), "got {}", code);
    }

    #[test]
    fn test_highpass_pipeline_restores_dc() {
        let design = presets::fir_highpass_7k5();
        let mut pipeline = Pipeline::new(
            design.build().unwrap(),
            Scaling::adc12_dac8(),
            design.passband,
        );
        // A highpass removes the constant; the restored offset centers the
        // output near half scale instead of zero.
        let mut code = 0;
        for _ in 0..16 {
            code = pipeline.process_code(2048);
        }
        assert!((120..=134).contains(&code), "got {}", code);
    }

    #[test]
    fn test_q15_pipeline_dc_offset_is_scale_aware() {
        let design = presets::fir_highpass_7k5();
        let mut pipeline = PipelineQ15::new(
            design.build_q15().unwrap(),
            Scaling::adc12_dac8(),
            design.passband,
        );
        let mut code = 0;
        for _ in 0..16 {
            code = pipeline.process_code(2048);
        }
        // Same half-scale centering as the float path.
        assert!((120..=134).contains(&code), "got {}", code);
    }

    #[test]
    fn test_fft_analyzer_emits_once_per_block() {
        let mut analyzer =
            FftAnalyzer::new(FftConfig { block_len: 8 }, Scaling::adc12_dac8()).unwrap();
        let mut spectra = 0;
        for i in 0..24u16 {
            if analyzer.process_code(i * 100).is_some() {
                spectra += 1;
            }
        }
        assert_eq!(spectra, 3);
    }
}
