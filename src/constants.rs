//! Numeric constants shared across the processing pipeline.

/// Q15 full scale: a Q15 integer encodes value / 32768.
pub const Q15_ONE: i32 = 32768;

/// Largest representable Q15 value (just under +1.0).
pub const Q15_MAX: i32 = 32767;

/// Smallest representable Q15 value (-1.0 exactly).
pub const Q15_MIN: i32 = -32768;

/// 0.5 in Q15, used for scale-aware DC offset restoration.
pub const Q15_HALF: i16 = 16384;

/// Default acquisition bit width (12-bit ADC codes, 0..=4095).
pub const DEFAULT_INPUT_BITS: u32 = 12;

/// Default output bit width (8-bit DAC codes, 0..=255).
pub const DEFAULT_OUTPUT_BITS: u32 = 8;
