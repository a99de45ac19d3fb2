use std::f32::consts::PI;

use num_complex::Complex32;

use crate::error::{DspError, Result};

/// Iterative radix-2 decimation-in-time FFT over fixed-size blocks.
///
/// The block length is fixed at construction and must be a power of two;
/// anything else is rejected up front rather than at transform time. The
/// forward transform is unscaled, the inverse divides by N (the usual
/// unitary-inverse convention), so `inverse(forward(x)) == x` within float
/// tolerance.
pub struct FftEngine {
    n: usize,
}

impl FftEngine {
    /// Create an engine for blocks of length `n`.
    ///
    /// # Errors
    /// Returns `DspError::FftSize` unless `n` is a power of two >= 2.
    pub fn new(n: usize) -> Result<Self> {
        if n < 2 || !n.is_power_of_two() {
            return Err(DspError::FftSize(n));
        }
        Ok(Self { n })
    }

    /// Block length N.
    pub fn block_len(&self) -> usize {
        self.n
    }

    /// In-place forward transform.
    ///
    /// # Panics
    /// Debug-asserts that `block.len()` matches the engine's N; passing a
    /// block of the wrong length is a programmer error.
    pub fn forward(&self, block: &mut [Complex32]) {
        debug_assert_eq!(block.len(), self.n);
        bit_reverse_permute(block);
        butterfly_passes(block);
    }

    /// In-place inverse transform: conjugate, forward, conjugate, 1/N.
    pub fn inverse(&self, block: &mut [Complex32]) {
        debug_assert_eq!(block.len(), self.n);
        for value in block.iter_mut() {
            *value = value.conj();
        }
        bit_reverse_permute(block);
        butterfly_passes(block);
        let scale = 1.0 / self.n as f32;
        for value in block.iter_mut() {
            *value = value.conj() * scale;
        }
    }
}

/// Reorder the block so that slot `i` receives the element whose index is
/// the bit-reversal of `i`.
///
/// The target index is maintained incrementally with a bit-toggle walk
/// (clear the leading run of set bits, set the next) instead of a lookup
/// table, so no per-N table has to be kept around. Each pair is swapped
/// exactly once, guarded by the `i < j` comparison.
fn bit_reverse_permute(block: &mut [Complex32]) {
    let n = block.len();
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;

        if i < j {
            block.swap(i, j);
        }
    }
}

/// log2(N) butterfly passes with the forward (negative-angle) twiddle
/// convention.
fn butterfly_passes(block: &mut [Complex32]) {
    let n = block.len();
    let mut step = 2;
    while step <= n {
        let half_step = step / 2;
        let angle_step = -2.0 * PI / step as f32;

        for group in (0..n).step_by(step) {
            for pair in 0..half_step {
                let lower = group + pair;
                let upper = lower + half_step;

                let angle = angle_step * pair as f32;
                let twiddle = Complex32::new(angle.cos(), angle.sin());

                let scaled = block[upper] * twiddle;
                block[upper] = block[lower] - scaled;
                block[lower] += scaled;
            }
        }
        step *= 2;
    }
}

/// Collects scalar samples into successive real slots of a complex block.
///
/// `push` returns the filled block once every N samples; the write index
/// then wraps to 0 and accumulation continues with the next block. The
/// cycle never terminates on its own.
pub struct BlockAccumulator {
    block: Vec<Complex32>,
    index: usize,
}

impl BlockAccumulator {
    pub fn new(n: usize) -> Result<Self> {
        if n < 2 || !n.is_power_of_two() {
            return Err(DspError::FftSize(n));
        }
        Ok(Self {
            block: vec![Complex32::new(0.0, 0.0); n],
            index: 0,
        })
    }

    /// Append one scalar sample (imaginary part zero). Returns the complete
    /// block when this sample was the N-th of the current cycle.
    pub fn push(&mut self, sample: f32) -> Option<&mut [Complex32]> {
        self.block[self.index] = Complex32::new(sample, 0.0);

        if self.index == self.block.len() - 1 {
            self.index = 0;
            Some(&mut self.block)
        } else {
            self.index += 1;
            None
        }
    }

    /// Samples accumulated toward the current block.
    pub fn fill_level(&self) -> usize {
        self.index
    }

    pub fn block_len(&self) -> usize {
        self.block.len()
    }
}
