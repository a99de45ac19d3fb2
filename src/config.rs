//! Named filter designs.
//!
//! Coefficients are supplied, never computed here: a design bundles a
//! coefficient set with the metadata needed to use it correctly (sample
//! rate it was designed for, passband shape). The passband shape decides
//! whether the pipeline restores a DC offset after filtering.
//!
//! Designs can also be loaded from a TOML file:
//!
//! ```toml
//! [[fir]]
//! name = "lowpass-2k5"
//! sample_rate_hz = 18000.0
//! passband = "lowpass"
//! coeffs = [0.09017288, 0.17721641, 0.2326107, 0.2326107, 0.17721641, 0.09017288]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dsp::{DirectFormIir, FirFilter, FirFilterQ15, SectionCoeffs, SosCascade};
use crate::error::{DspError, Result};

/// Passband shape of a design.
///
/// Filters that do not pass zero-frequency content (highpass, bandpass)
/// remove the acquisition DC bias along with the stopband; the pipeline
/// re-centers their output with a half-scale offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Passband {
    Lowpass,
    Highpass,
    Bandpass,
}

impl Passband {
    /// Whether zero-frequency content survives this passband.
    pub fn passes_dc(&self) -> bool {
        matches!(self, Passband::Lowpass)
    }
}

/// A named FIR coefficient set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirDesign {
    pub name: String,
    pub sample_rate_hz: f32,
    pub passband: Passband,
    pub coeffs: Vec<f32>,
}

impl FirDesign {
    /// Instantiate a floating-point filter from this design.
    pub fn build(&self) -> Result<FirFilter> {
        FirFilter::new(self.coeffs.clone())
    }

    /// Instantiate a Q15 filter, quantizing the coefficients.
    pub fn build_q15(&self) -> Result<FirFilterQ15> {
        FirFilterQ15::from_f32_coeffs(&self.coeffs)
    }
}

/// A named direct-form IIR coefficient set (`a[0]` must be 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IirDesign {
    pub name: String,
    pub sample_rate_hz: f32,
    pub passband: Passband,
    pub b: Vec<f32>,
    pub a: Vec<f32>,
}

impl IirDesign {
    pub fn build(&self) -> Result<DirectFormIir> {
        DirectFormIir::new(self.b.clone(), self.a.clone())
    }
}

/// A named cascade of second-order sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SosDesign {
    pub name: String,
    pub sample_rate_hz: f32,
    pub passband: Passband,
    pub sections: Vec<SectionCoeffs>,
}

impl SosDesign {
    pub fn build(&self) -> Result<SosCascade> {
        SosCascade::new(&self.sections)
    }
}

/// Block-transform configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FftConfig {
    /// Block length N, a power of two.
    pub block_len: usize,
}

impl Default for FftConfig {
    fn default() -> Self {
        Self { block_len: 64 }
    }
}

/// Designs loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesignFile {
    #[serde(default)]
    pub fir: Vec<FirDesign>,
    #[serde(default)]
    pub iir: Vec<IirDesign>,
    #[serde(default)]
    pub sos: Vec<SosDesign>,
}

impl DesignFile {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| DspError::Config(format!("design file: {}", e)))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| DspError::Config(format!("design file: {}", e)))?;
        Self::from_toml_str(&text)
    }

    pub fn find_fir(&self, name: &str) -> Option<&FirDesign> {
        self.fir.iter().find(|d| d.name == name)
    }

    pub fn find_iir(&self, name: &str) -> Option<&IirDesign> {
        self.iir.iter().find(|d| d.name == name)
    }

    pub fn find_sos(&self, name: &str) -> Option<&SosDesign> {
        self.sos.iter().find(|d| d.name == name)
    }
}

/// Built-in coefficient sets, all designed for fs = 18 kHz.
pub mod presets {
    use super::*;

    /// 4-point averaging filter.
    pub fn fir_average() -> FirDesign {
        FirDesign {
            name: "average".into(),
            sample_rate_hz: 18_000.0,
            passband: Passband::Lowpass,
            coeffs: vec![0.25, 0.25, 0.25, 0.25],
        }
    }

    /// Order-6 lowpass, fc = 4.5 kHz, Hann window.
    pub fn fir_lowpass_4k5() -> FirDesign {
        FirDesign {
            name: "lowpass-4k5".into(),
            sample_rate_hz: 18_000.0,
            passband: Passband::Lowpass,
            coeffs: vec![
                0.0,
                0.036_524_12,
                0.463_475_88,
                0.463_475_88,
                0.036_524_12,
                0.0,
            ],
        }
    }

    /// Order-6 lowpass, fc = 4.5 kHz, Blackman window.
    pub fn fir_lowpass_4k5_blackman() -> FirDesign {
        FirDesign {
            name: "lowpass-4k5-blackman".into(),
            sample_rate_hz: 18_000.0,
            passband: Passband::Lowpass,
            coeffs: vec![
                -0.007_776_31,
                0.064_454_65,
                0.443_321_67,
                0.443_321_67,
                0.064_454_65,
                -0.007_776_31,
            ],
        }
    }

    /// Order-10 lowpass, fc = 4.5 kHz.
    pub fn fir_lowpass_4k5_order10() -> FirDesign {
        FirDesign {
            name: "lowpass-4k5-order10".into(),
            sample_rate_hz: 18_000.0,
            passband: Passband::Lowpass,
            coeffs: vec![
                0.060_530_31,
                0.0,
                -0.100_883_85,
                0.0,
                0.302_651_61,
                0.475_403_96,
                0.302_651_61,
                0.0,
                -0.100_883_85,
                0.0,
                0.060_530_31,
            ],
        }
    }

    /// Order-5 lowpass, fc = 4.5 kHz, rectangular window.
    pub fn fir_lowpass_4k5_order5() -> FirDesign {
        FirDesign {
            name: "lowpass-4k5-order5".into(),
            sample_rate_hz: 18_000.0,
            passband: Passband::Lowpass,
            coeffs: vec![
                -0.088_235_29,
                0.147_058_82,
                0.441_176_47,
                0.441_176_47,
                0.147_058_82,
                -0.088_235_29,
            ],
        }
    }

    /// Lowpass, fc = 2.5 kHz.
    pub fn fir_lowpass_2k5() -> FirDesign {
        FirDesign {
            name: "lowpass-2k5".into(),
            sample_rate_hz: 18_000.0,
            passband: Passband::Lowpass,
            coeffs: vec![
                0.090_172_88,
                0.177_216_42,
                0.232_610_70,
                0.232_610_70,
                0.177_216_42,
                0.090_172_88,
            ],
        }
    }

    /// Highpass, fc = 7.5 kHz.
    pub fn fir_highpass_7k5() -> FirDesign {
        FirDesign {
            name: "highpass-7k5".into(),
            sample_rate_hz: 18_000.0,
            passband: Passband::Highpass,
            coeffs: vec![
                -0.140_456_12,
                0.171_368_36,
                -0.188_175_52,
                0.188_175_52,
                -0.171_368_36,
                0.140_456_12,
            ],
        }
    }

    /// Bandpass, 2.5-7.5 kHz.
    pub fn fir_bandpass_2k5_7k5() -> FirDesign {
        FirDesign {
            name: "bandpass-2k5-7k5".into(),
            sample_rate_hz: 18_000.0,
            passband: Passband::Bandpass,
            coeffs: vec![
                -0.064_367_37,
                -0.320_311_66,
                0.312_058_02,
                0.312_058_02,
                -0.320_311_66,
                -0.064_367_37,
            ],
        }
    }

    /// Order-6 direct-form lowpass.
    pub fn iir_lowpass() -> IirDesign {
        IirDesign {
            name: "iir-lowpass".into(),
            sample_rate_hz: 18_000.0,
            passband: Passband::Lowpass,
            b: vec![0.0528, 0.2640, 0.5279, 0.5279, 0.2640, 0.0528],
            a: vec![1.0, 0.0, 0.6335, 0.0, 0.0557, 0.0],
        }
    }

    /// Three-section lowpass cascade equivalent to `iir_lowpass`, but
    /// numerically better conditioned.
    pub fn sos_lowpass() -> SosDesign {
        SosDesign {
            name: "sos-lowpass".into(),
            sample_rate_hz: 18_000.0,
            passband: Passband::Lowpass,
            sections: vec![
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
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_build() {
        assert!(presets::fir_average().build().is_ok());
        assert!(presets::fir_lowpass_4k5().build().is_ok());
        assert!(presets::fir_lowpass_4k5_blackman().build().is_ok());
        assert!(presets::fir_lowpass_4k5_order10().build().is_ok());
        assert!(presets::fir_lowpass_4k5_order5().build_q15().is_ok());
        assert!(presets::fir_highpass_7k5().build().is_ok());
        assert!(presets::fir_bandpass_2k5_7k5().build().is_ok());
        assert!(presets::iir_lowpass().build().is_ok());
        assert!(presets::sos_lowpass().build().is_ok());
    }

    #[test]
    fn test_passes_dc() {
        assert!(Passband::Lowpass.passes_dc());
        assert!(!Passband::Highpass.passes_dc());
        assert!(!Passband::Bandpass.passes_dc());
    }

    #[test]
    fn test_design_file_roundtrip() {
        let text = r#"
            [[fir]]
            name = "lowpass-2k5"
            sample_rate_hz = 18000.0
            passband = "lowpass"
            coeffs = [0.25, 0.5, 0.25]

            [[sos]]
            name = "demo"
            sample_rate_hz = 18000.0
            passband = "lowpass"

            [[sos.sections]]
            b0 = 1.0
            b1 = 2.0
            b2 = 1.0
            a0 = 1.0
            a1 = 0.0
            a2 = 0.5
            gain = 0.25
        "#;
        let file = DesignFile::from_toml_str(text).unwrap();
        assert!(file.find_fir("lowpass-2k5").is_some());
        assert!(file.find_fir("nonesuch").is_none());
        let sos = file.find_sos("demo").unwrap();
        assert_eq!(sos.sections.len(), 1);
        assert!(sos.build().is_ok());
    }

    #[test]
    fn test_design_file_rejects_bad_toml() {
        assert!(DesignFile::from_toml_str("[[fir]\nname=").is_err());
    }
}
