//! Audio sink abstraction
//!
//! The core never talks to an audio API. Whatever consumes samples (a
//! device callback, a file writer, a test buffer) implements [`AudioSink`]
//! and receives fixed-size blocks of unit-scale mono samples.

use crate::Result;

/// Consumer of sample blocks at a fixed rate
pub trait AudioSink {
    /// Sample rate the sink plays back at, in Hz
    fn sample_rate(&self) -> u32;

    /// Accept one block of mono samples
    fn accept(&mut self, block: &[f32]) -> Result<()>;
}

/// Sink that keeps every sample in memory
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    sample_rate: u32,
    samples: Vec<f32>,
    blocks: usize,
}

impl BufferSink {
    /// Create an empty buffer sink
    pub fn new(sample_rate: u32) -> Self {
        BufferSink {
            sample_rate,
            samples: Vec::new(),
            blocks: 0,
        }
    }

    /// Samples received so far
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of blocks received
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Take the collected samples, leaving the sink empty
    pub fn take(&mut self) -> Vec<f32> {
        self.blocks = 0;
        std::mem::take(&mut self.samples)
    }
}

impl AudioSink for BufferSink {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn accept(&mut self, block: &[f32]) -> Result<()> {
        self.samples.extend_from_slice(block);
        self.blocks += 1;
        Ok(())
    }
}
