pub mod acquisition;
pub mod config;
pub mod constants;
pub mod dsp;
pub mod error;
pub mod pipeline;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::{DesignFile, FftConfig, FirDesign, IirDesign, Passband, SosDesign};
pub use error::{DspError, Result};
pub use pipeline::{FftAnalyzer, FilterStage, Pipeline, PipelineQ15, Scaling};
