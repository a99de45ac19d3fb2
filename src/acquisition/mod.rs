pub mod ready;
pub mod sink;
pub mod source;

pub use ready::{ReadyLatch, SampleMailbox};
pub use sink::{SampleSink, VecSink, WavSink};
pub use source::{SampleSource, ThreadedSource, VecSource, WavSource};
