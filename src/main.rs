use std::path::PathBuf;

use clap::Parser;

use tapline::acquisition::{SampleSink, SampleSource, VecSink, WavSink, WavSource};
use tapline::config::{DesignFile, FftConfig, presets};
use tapline::dsp::spectrum;
use tapline::pipeline::{FftAnalyzer, FilterStage, Pipeline, PipelineQ15, Scaling};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Engine {
    /// Floating-point FIR
    Fir,
    /// Fixed-point Q15 FIR
    FirQ15,
    /// Direct-form IIR
    Iir,
    /// Cascaded second-order sections
    Sos,
    /// Block FFT spectrum analysis (diagnostic only, no output codes)
    Fft,
}

/// Run an acquisition stream through a filter engine or the FFT analyzer.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Filter engine to run
    #[arg(long, value_enum, default_value_t = Engine::Fir)]
    engine: Engine,

    /// Input WAV file (first channel, quantized to input codes)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output WAV file for the filtered code stream
    #[arg(long)]
    output: Option<PathBuf>,

    /// TOML file of named designs (defaults to built-in presets)
    #[arg(long)]
    designs: Option<PathBuf>,

    /// Design name to select from the design file
    #[arg(long)]
    design: Option<String>,

    /// Acquisition bit width
    #[arg(long, default_value_t = 12)]
    input_bits: u32,

    /// Output bit width
    #[arg(long, default_value_t = 8)]
    output_bits: u32,

    /// FFT block length (power of two)
    #[arg(long, default_value_t = 64)]
    fft_len: usize,

    /// Print one JSON record per transformed block (FFT engine)
    #[arg(long)]
    json: bool,

    /// Generate a synthetic tone instead of reading a file
    #[cfg(feature = "simulation")]
    #[arg(long)]
    simulate: bool,

    /// Simulated tone frequency in Hz
    #[cfg(feature = "simulation")]
    #[arg(long, default_value_t = 1125.0)]
    tone_hz: f32,

    /// Simulated sample rate in Hz
    #[cfg(feature = "simulation")]
    #[arg(long, default_value_t = 18_000.0)]
    sample_rate: f32,

    /// Simulated additive noise RMS (fraction of half scale)
    #[cfg(feature = "simulation")]
    #[arg(long, default_value_t = 0.0)]
    noise: f32,

    /// Number of simulated samples
    #[cfg(feature = "simulation")]
    #[arg(long, default_value_t = 18_000)]
    samples: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let scaling = Scaling::new(args.input_bits, args.output_bits)?;
    let (mut source, sample_rate) = open_source(&args, scaling)?;

    log::info!(
        "Engine: {:?}, scaling {}-bit in / {}-bit out",
        args.engine,
        args.input_bits,
        args.output_bits
    );

    if args.engine == Engine::Fft {
        return run_fft(&args, scaling, source.as_mut());
    }

    let designs = match &args.designs {
        Some(path) => DesignFile::load(path)?,
        None => DesignFile::default(),
    };

    let mut pipeline = build_pipeline(&args, &designs, scaling)?;

    let mut processed = 0usize;
    match &args.output {
        Some(path) => {
            let mut sink = WavSink::create(path, sample_rate, scaling.output_full_scale())?;
            processed += drive(source.as_mut(), &mut sink, pipeline.as_mut());
            sink.finalize()?;
            log::info!("Wrote {} samples to {}", processed, path.display());
        }
        None => {
            let mut sink = VecSink::new();
            processed += drive(source.as_mut(), &mut sink, pipeline.as_mut());
            let min = sink.codes.iter().min().copied().unwrap_or(0);
            let max = sink.codes.iter().max().copied().unwrap_or(0);
            println!(
                "Processed {} samples (output codes {}..={})",
                processed, min, max
            );
        }
    }

    Ok(())
}

/// Per-code adapter so every engine can share one drive loop.
trait CodePipeline {
    fn process_code(&mut self, code: u16) -> u8;
}

impl<S: FilterStage> CodePipeline for Pipeline<S> {
    fn process_code(&mut self, code: u16) -> u8 {
        Pipeline::process_code(self, code)
    }
}

impl CodePipeline for PipelineQ15 {
    fn process_code(&mut self, code: u16) -> u8 {
        PipelineQ15::process_code(self, code)
    }
}

fn drive(
    source: &mut dyn SampleSource,
    sink: &mut dyn SampleSink,
    pipeline: &mut dyn CodePipeline,
) -> usize {
    let mut count = 0;
    while let Some(code) = source.next_code() {
        sink.emit(pipeline.process_code(code));
        count += 1;
    }
    count
}

fn open_source(args: &Args, scaling: Scaling) -> anyhow::Result<(Box<dyn SampleSource>, u32)> {
    #[cfg(feature = "simulation")]
    if args.simulate {
        use tapline::acquisition::ThreadedSource;
        use tapline::simulation::{SignalSpec, generate_codes};

        let spec = SignalSpec::tone(args.sample_rate, args.tone_hz, 0.8).with_noise(args.noise);
        log::info!(
            "Simulating {} samples: {} Hz tone at fs {} Hz",
            args.samples,
            args.tone_hz,
            args.sample_rate
        );
        let codes = generate_codes(&spec, args.samples, scaling);
        return Ok((Box::new(ThreadedSource::spawn(codes)), args.sample_rate as u32));
    }

    match &args.input {
        Some(path) => {
            let source = WavSource::open(path, scaling)?;
            let sample_rate = source.sample_rate();
            log::info!(
                "Input: {} ({} samples at {} Hz)",
                path.display(),
                source.len(),
                sample_rate
            );
            Ok((Box::new(source), sample_rate))
        }
        None => anyhow::bail!("no input: pass --input (or --simulate with the simulation feature)"),
    }
}

fn build_pipeline(
    args: &Args,
    designs: &DesignFile,
    scaling: Scaling,
) -> anyhow::Result<Box<dyn CodePipeline>> {
    let name = args.design.as_deref();
    Ok(match args.engine {
        Engine::Fir => {
            let design = match name {
                Some(n) => designs
                    .find_fir(n)
                    .ok_or_else(|| anyhow::anyhow!("no FIR design named {:?}", n))?
                    .clone(),
                None => presets::fir_lowpass_4k5(),
            };
            log::info!("FIR design {:?}, {} taps", design.name, design.coeffs.len());
            Box::new(Pipeline::new(design.build()?, scaling, design.passband))
        }
        Engine::FirQ15 => {
            let design = match name {
                Some(n) => designs
                    .find_fir(n)
                    .ok_or_else(|| anyhow::anyhow!("no FIR design named {:?}", n))?
                    .clone(),
                None => presets::fir_lowpass_4k5_order5(),
            };
            log::info!("Q15 FIR design {:?}", design.name);
            Box::new(PipelineQ15::new(
                design.build_q15()?,
                scaling,
                design.passband,
            ))
        }
        Engine::Iir => {
            let design = match name {
                Some(n) => designs
                    .find_iir(n)
                    .ok_or_else(|| anyhow::anyhow!("no IIR design named {:?}", n))?
                    .clone(),
                None => presets::iir_lowpass(),
            };
            log::info!("IIR design {:?}, order {}", design.name, design.b.len() - 1);
            Box::new(Pipeline::new(design.build()?, scaling, design.passband))
        }
        Engine::Sos => {
            let design = match name {
                Some(n) => designs
                    .find_sos(n)
                    .ok_or_else(|| anyhow::anyhow!("no SOS design named {:?}", n))?
                    .clone(),
                None => presets::sos_lowpass(),
            };
            log::info!(
                "SOS design {:?}, {} sections",
                design.name,
                design.sections.len()
            );
            Box::new(Pipeline::new(design.build()?, scaling, design.passband))
        }
        Engine::Fft => unreachable!("handled by run_fft"),
    })
}

fn run_fft(args: &Args, scaling: Scaling, source: &mut dyn SampleSource) -> anyhow::Result<()> {
    let mut analyzer = FftAnalyzer::new(
        FftConfig {
            block_len: args.fft_len,
        },
        scaling,
    )?;

    let mut block_index = 0usize;
    while let Some(code) = source.next_code() {
        if let Some(block) = analyzer.process_code(code) {
            let mags = spectrum::magnitudes(&block);
            if let Some((bin, magnitude)) = spectrum::peak_bin(&block) {
                log::info!(
                    "block {}: peak bin {} (magnitude {:.3})",
                    block_index,
                    bin,
                    magnitude
                );
            }
            if args.json {
                let record = serde_json::json!({
                    "block": block_index,
                    "n": analyzer.block_len(),
                    "magnitudes": mags,
                });
                println!("{}", record);
            }
            block_index += 1;
        }
    }

    println!("Analyzed {} blocks of {}", block_index, analyzer.block_len());
    Ok(())
}
