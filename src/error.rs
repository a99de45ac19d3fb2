use thiserror::Error;

#[derive(Error, Debug)]
pub enum DspError {
    #[error("Empty coefficient vector")]
    EmptyCoefficients,

    #[error("Coefficient length mismatch: feed-forward has {forward}, feedback has {feedback}")]
    CoefficientLengthMismatch { forward: usize, feedback: usize },

    #[error("Feedback normalization term a[0] must be 1.0, got {0}")]
    Normalization(f32),

    #[error("Biquad section {index} has a0 = 0")]
    DegenerateSection { index: usize },

    #[error("Biquad cascade has no sections")]
    EmptyCascade,

    #[error("FFT size must be a power of two >= 2, got {0}")]
    FftSize(usize),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DspError>;
