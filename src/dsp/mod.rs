pub mod biquad;
pub mod fft;
pub mod fir;
pub mod fir_q15;
pub mod history;
pub mod iir;
pub mod spectrum;

pub use biquad::{SectionCoeffs, SosCascade};
pub use fft::{BlockAccumulator, FftEngine};
pub use fir::FirFilter;
pub use fir_q15::{FirFilterQ15, q15_from_f32, q15_to_f32, saturate_q15};
pub use history::HistoryBuffer;
pub use iir::DirectFormIir;
