//! WAV file sink

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use log::debug;

use crate::shared::SharedPsg;
use crate::sink::AudioSink;
use crate::{PsgConfig, PsgError, Result};

/// Sink writing 16-bit mono PCM to a WAV file
pub struct WavSink {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    sample_rate: u32,
    written: usize,
}

impl WavSink {
    /// Create (or truncate) a WAV file at `path`
    pub fn create<P: AsRef<Path>>(path: P, sample_rate: u32) -> Result<Self> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = hound::WavWriter::create(path.as_ref(), spec).map_err(|e| {
            PsgError::AudioFileError(format!("Failed to create WAV file: {}", e))
        })?;
        debug!("Writing WAV to {}", path.as_ref().display());

        Ok(WavSink {
            writer: Some(writer),
            sample_rate,
            written: 0,
        })
    }

    /// Samples written so far
    pub fn samples_written(&self) -> usize {
        self.written
    }

    /// Flush the header and close the file
    pub fn finalize(mut self) -> Result<()> {
        self.finish()
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize().map_err(|e| {
                PsgError::AudioFileError(format!("Failed to finalize WAV file: {}", e))
            })?;
        }
        Ok(())
    }
}

impl AudioSink for WavSink {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn accept(&mut self, block: &[f32]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| PsgError::AudioFileError("WAV file already finalized".into()))?;

        // Convert f32 samples to i16
        for &sample in block {
            let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| PsgError::AudioFileError(format!("Failed to write sample: {}", e)))?;
        }
        self.written += block.len();
        Ok(())
    }
}

impl Drop for WavSink {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            log::warn!("{e}");
        }
    }
}

/// Render `blocks` callback blocks from `psg` into a WAV file.
pub fn render_to_wav<P: AsRef<Path>>(
    psg: &SharedPsg,
    config: &PsgConfig,
    blocks: usize,
    output_path: P,
) -> Result<usize> {
    config.validate()?;
    let mut sink = WavSink::create(output_path, config.sample_rate)?;
    for _ in 0..blocks {
        psg.pump(&mut sink, config.block_size)?;
    }
    let written = sink.samples_written();
    sink.finalize()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_sink_writes_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        let mut sink = WavSink::create(&path, 22_050).unwrap();
        sink.accept(&[0.0, 0.5, 1.0, 2.0]).unwrap();
        assert_eq!(sink.samples_written(), 4);
        sink.finalize().unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 22_050);
        assert_eq!(reader.spec().channels, 1);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, i16::MAX / 2, i16::MAX, i16::MAX]);
    }

    #[test]
    fn test_render_to_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let psg = SharedPsg::default();
        psg.write_register(0, 0x40).unwrap();
        psg.write_register(7, 0x3E).unwrap();
        psg.write_register(8, 0x0F).unwrap();
        psg.start();

        let config = PsgConfig::default();
        let written = render_to_wav(&psg, &config, 4, &path).unwrap();
        assert_eq!(written, 4 * config.block_size);

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len() as usize, written);
    }
}
