use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

/// Output collaborator: accepts one scaled output code per processed
/// sample.
pub trait SampleSink {
    fn emit(&mut self, code: u8);
}

/// In-memory sink for tests.
#[derive(Default)]
pub struct VecSink {
    pub codes: Vec<u8>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SampleSink for VecSink {
    fn emit(&mut self, code: u8) {
        self.codes.push(code);
    }
}

/// WAV-file sink, mapping output codes back to [-1, 1] mono float samples.
pub struct WavSink {
    writer: WavWriter<BufWriter<File>>,
    full_scale: f32,
    write_failures: usize,
}

impl WavSink {
    pub fn create<P: AsRef<Path>>(path: P, sample_rate: u32, full_scale: u8) -> anyhow::Result<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let writer = WavWriter::create(path, spec)?;
        Ok(Self {
            writer,
            full_scale: full_scale as f32,
            write_failures: 0,
        })
    }

    /// Finish the file. Fails if any sample was lost along the way, so a
    /// truncated file is never reported as a clean run.
    pub fn finalize(self) -> anyhow::Result<()> {
        if self.write_failures > 0 {
            anyhow::bail!("{} samples failed to write", self.write_failures);
        }
        self.writer.finalize()?;
        Ok(())
    }
}

impl SampleSink for WavSink {
    fn emit(&mut self, code: u8) {
        let sample = (code as f32 / self.full_scale) * 2.0 - 1.0;
        if let Err(e) = self.writer.write_sample(sample) {
            self.write_failures += 1;
            log::error!("WAV write failed: {}", e);
        }
    }
}
