use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, bounded};
use hound::WavReader;

use crate::pipeline::Scaling;

/// Acquisition collaborator: hands out one raw unsigned sample code per
/// call, `None` when the stream ends.
pub trait SampleSource: Send {
    fn next_code(&mut self) -> Option<u16>;
}

/// In-memory source for tests and synthetic signals.
pub struct VecSource {
    codes: Vec<u16>,
    position: usize,
}

impl VecSource {
    pub fn new(codes: Vec<u16>) -> Self {
        Self { codes, position: 0 }
    }
}

impl SampleSource for VecSource {
    fn next_code(&mut self) -> Option<u16> {
        let code = self.codes.get(self.position).copied();
        if code.is_some() {
            self.position += 1;
        }
        code
    }
}

/// WAV-file source, quantizing samples to acquisition codes.
///
/// Samples are mapped from [-1, 1] to the unipolar code range the way an
/// ADC with a mid-scale bias would see them. Multi-channel files are
/// reduced to their first channel.
pub struct WavSource {
    codes: Vec<u16>,
    position: usize,
    sample_rate: u32,
}

impl WavSource {
    pub fn open<P: AsRef<Path>>(path: P, scaling: Scaling) -> anyhow::Result<Self> {
        let reader = WavReader::open(path.as_ref())?;
        let spec = reader.spec();
        let channels = spec.channels as usize;
        let sample_rate = spec.sample_rate;

        let samples = Self::read_samples(reader, &spec)?;
        let full_scale = scaling.input_full_scale() as f32;
        let codes = samples
            .iter()
            .step_by(channels)
            .map(|&s| {
                let unit = (s.clamp(-1.0, 1.0) + 1.0) / 2.0;
                (unit * full_scale) as u16
            })
            .collect();

        Ok(Self {
            codes,
            position: 0,
            sample_rate,
        })
    }

    fn read_samples(
        mut reader: WavReader<BufReader<File>>,
        spec: &hound::WavSpec,
    ) -> anyhow::Result<Vec<f32>> {
        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                // 1 << 31 overflows i32 for 32-bit PCM; shift in 64 bits.
                let max_val = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(samples)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl SampleSource for WavSource {
    fn next_code(&mut self) -> Option<u16> {
        let code = self.codes.get(self.position).copied();
        if code.is_some() {
            self.position += 1;
        }
        code
    }
}

/// Source fed by a producer thread through a depth-1 bounded channel.
///
/// The channel alternative to `SampleMailbox`: the producer blocks instead
/// of overwriting, so no code is ever dropped. The producer thread ends
/// when its iterator does, which closes the channel and ends the source.
pub struct ThreadedSource {
    rx: Receiver<u16>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadedSource {
    pub fn spawn<I>(codes: I) -> Self
    where
        I: IntoIterator<Item = u16> + Send + 'static,
        I::IntoIter: Send,
    {
        let (tx, rx) = bounded(1);
        let handle = std::thread::spawn(move || {
            for code in codes {
                if tx.send(code).is_err() {
                    log::warn!("Sample receiver dropped");
                    break;
                }
            }
        });
        Self {
            rx,
            handle: Some(handle),
        }
    }
}

impl SampleSource for ThreadedSource {
    fn next_code(&mut self) -> Option<u16> {
        self.rx.recv().ok()
    }
}

impl Drop for ThreadedSource {
    fn drop(&mut self) {
        // Unblock the producer, then reap it.
        let (_, dead_rx) = bounded(0);
        self.rx = dead_rx;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
