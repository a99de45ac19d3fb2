/// Fixed-length sample history, newest first.
///
/// A K-deep shift register: every push moves existing samples toward
/// higher indices, drops the oldest, and places the new sample at index 0.
/// Each filter owns exactly one (or two, for recursive forms).
#[derive(Clone, Debug)]
pub struct HistoryBuffer<T> {
    samples: Vec<T>,
}

impl<T: Copy + Default> HistoryBuffer<T> {
    /// Create a zero-filled history of length `len`.
    pub fn new(len: usize) -> Self {
        Self {
            samples: vec![T::default(); len],
        }
    }

    /// Shift the register and insert `sample` at index 0.
    ///
    /// The element at the highest index falls off. O(K).
    pub fn push(&mut self, sample: T) {
        let k = self.samples.len();
        for i in (1..k).rev() {
            self.samples[i] = self.samples[i - 1];
        }
        self.samples[0] = sample;
    }

    /// Shift the register without inserting, leaving index 0 unchanged.
    ///
    /// Used by the direct-form recursive filter, which must reserve slot 0
    /// for an output it has not computed yet.
    pub fn shift(&mut self) {
        let k = self.samples.len();
        for i in (1..k).rev() {
            self.samples[i] = self.samples[i - 1];
        }
    }

    /// Store directly into slot 0 (after a `shift`).
    pub fn set_front(&mut self, sample: T) {
        self.samples[0] = sample;
    }

    /// Snapshot of the history, newest first.
    pub fn as_slice(&self) -> &[T] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Reset all history to the default value.
    pub fn clear(&mut self) {
        self.samples.fill(T::default());
    }
}
