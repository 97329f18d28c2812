//! `ay8910-play`: plays a short demo tune on the PSG core.
//!
//! ```text
//! ay8910-play [--config FILE] [--seconds N] [--wav FILE | --stream]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use log::info;

use ay8910::{PsgConfig, SharedPsg};

/// Demo melody, in Hz
const MELODY: [f32; 8] = [261.6, 329.6, 392.0, 523.3, 392.0, 329.6, 261.6, 196.0];

/// Seconds per note
const NOTE_SECONDS: f32 = 0.25;

enum Output {
    Wav(PathBuf),
    Stream,
}

struct Args {
    config: Option<PathBuf>,
    seconds: f32,
    output: Output,
}

impl Args {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> anyhow::Result<Self> {
        let mut parsed = Args {
            config: None,
            seconds: 4.0,
            output: Output::Wav(PathBuf::from("ay8910-demo.wav")),
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = args.next().context("--config needs a file")?;
                    parsed.config = Some(PathBuf::from(path));
                }
                "--seconds" => {
                    let value = args.next().context("--seconds needs a value")?;
                    parsed.seconds = value
                        .parse()
                        .with_context(|| format!("invalid duration: {value}"))?;
                }
                "--wav" => {
                    let path = args.next().context("--wav needs a file")?;
                    parsed.output = Output::Wav(PathBuf::from(path));
                }
                "--stream" => parsed.output = Output::Stream,
                "-h" | "--help" => {
                    println!(
                        "Usage: ay8910-play [--config FILE] [--seconds N] [--wav FILE | --stream]"
                    );
                    std::process::exit(0);
                }
                other => bail!("unknown argument: {other}"),
            }
        }
        Ok(parsed)
    }
}

/// Tone half period (in generator ticks) for `freq` at `sample_rate`.
///
/// Generators tick four times per output sample and a period is half a cycle.
fn tone_period(freq: f32, sample_rate: u32) -> u16 {
    let ticks_per_second = sample_rate as f32 * 4.0;
    ((ticks_per_second / (2.0 * freq)).round() as u16).clamp(1, 0x0FFF)
}

/// Program the static part of the patch: envelope-shaped tone on A, soft noise on B.
fn setup_patch(psg: &SharedPsg) -> ay8910::Result<()> {
    psg.write_register(7, 0x2E)?; // tone A, noise B
    psg.write_register(6, 0x10)?; // noise period
    psg.write_register(9, 0x04)?; // volume B
    psg.write_register(8, 0x10)?; // A follows the envelope
    psg.write_register(11, 0x00)?;
    psg.write_register(12, 0x08)?; // envelope period 0x0800
    Ok(())
}

fn play_note(psg: &SharedPsg, freq: f32, sample_rate: u32) -> ay8910::Result<()> {
    let period = tone_period(freq, sample_rate);
    psg.write_register(0, (period & 0xFF) as u8)?;
    psg.write_register(1, (period >> 8) as u8)?;
    psg.write_register(13, 0x09) // decay once per note
}

#[cfg(feature = "export-wav")]
fn write_wav(
    psg: &SharedPsg,
    config: &PsgConfig,
    seconds: f32,
    path: &Path,
) -> anyhow::Result<()> {
    use ay8910::WavSink;

    let mut sink = WavSink::create(path, config.sample_rate)?;
    let blocks_per_note = config.blocks_for(NOTE_SECONDS).max(1);
    let total_blocks = config.blocks_for(seconds);

    for block in 0..total_blocks {
        if block % blocks_per_note == 0 {
            let note = MELODY[(block / blocks_per_note) % MELODY.len()];
            play_note(psg, note, config.sample_rate)?;
        }
        psg.pump(&mut sink, config.block_size)?;
    }

    info!("Wrote {} samples to {}", sink.samples_written(), path.display());
    sink.finalize()?;
    Ok(())
}

#[cfg(not(feature = "export-wav"))]
fn write_wav(_: &SharedPsg, _: &PsgConfig, _: f32, _: &Path) -> anyhow::Result<()> {
    bail!("WAV output requires the \"export-wav\" feature")
}

#[cfg(feature = "streaming")]
fn stream(psg: &SharedPsg, config: &PsgConfig, seconds: f32) -> anyhow::Result<()> {
    use std::time::{Duration, Instant};

    let device = ay8910::AudioDevice::new(psg.clone(), config)?;
    let start = Instant::now();
    let mut note = 0;
    while start.elapsed().as_secs_f32() < seconds {
        play_note(psg, MELODY[note % MELODY.len()], config.sample_rate)?;
        note += 1;
        std::thread::sleep(Duration::from_secs_f32(NOTE_SECONDS));
    }
    device.finish();
    Ok(())
}

#[cfg(not(feature = "streaming"))]
fn stream(_: &SharedPsg, _: &PsgConfig, _: f32) -> anyhow::Result<()> {
    bail!("Streaming requires the \"streaming\" feature. Rebuild with `--features streaming`.")
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse(std::env::args().skip(1))?;
    let config = match &args.config {
        Some(path) => PsgConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PsgConfig::default(),
    };
    info!(
        "PSG at {} Hz, {} sample blocks",
        config.sample_rate, config.block_size
    );

    let psg = SharedPsg::default();
    setup_patch(&psg)?;
    psg.start();
    if !config.start_enabled {
        psg.toggle_enabled();
    }

    match &args.output {
        Output::Wav(path) => write_wav(&psg, &config, args.seconds, path),
        Output::Stream => stream(&psg, &config, args.seconds),
    }
}
