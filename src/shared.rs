//! Shared PSG handle
//!
//! The host emulation (writer) and the audio callback (producer) usually run
//! on different threads. Both go through [`SharedPsg`], which holds the lock
//! for one whole register write or one whole block, so a write can never land
//! in the middle of a mix.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::ay8910::{Psg, PsgState};
use crate::sink::AudioSink;
use crate::{PsgError, Result};

/// Cloneable, thread-safe handle to one chip
#[derive(Clone, Default)]
pub struct SharedPsg {
    chip: Arc<Mutex<Psg>>,
}

impl SharedPsg {
    /// Wrap an existing chip
    pub fn new(chip: Psg) -> Self {
        SharedPsg {
            chip: Arc::new(Mutex::new(chip)),
        }
    }

    /// Write a register (writer role)
    pub fn write_register(&self, index: u8, value: u8) -> Result<()> {
        self.chip.lock().write_register(index, value)
    }

    /// Render into `buffer` (producer role)
    pub fn render_into(&self, buffer: &mut [f32]) -> Result<()> {
        self.chip.lock().render_into(buffer)
    }

    /// Render one block of `block_size` samples and hand it to `sink`.
    ///
    /// The lock is released before the sink sees the block.
    pub fn pump<S: AudioSink + ?Sized>(&self, sink: &mut S, block_size: usize) -> Result<()> {
        if block_size == 0 {
            return Err(PsgError::InvalidSampleCount);
        }
        let mut block = vec![0.0; block_size];
        self.render_into(&mut block)?;
        sink.accept(&block)
    }

    /// Mark the chip ready
    pub fn start(&self) {
        self.chip.lock().start();
    }

    /// Mark the chip not ready
    pub fn stop(&self) {
        self.chip.lock().stop();
    }

    /// Flip the mute flag and return the new enabled state
    pub fn toggle_enabled(&self) -> bool {
        self.chip.lock().toggle_enabled()
    }

    /// Snapshot of the derived chip state
    pub fn state(&self) -> PsgState {
        self.chip.lock().state()
    }

    /// Copy of the register bytes
    pub fn registers(&self) -> [u8; 16] {
        *self.chip.lock().registers()
    }

    /// Direct access for multi-step operations; hold the guard briefly
    pub fn lock(&self) -> MutexGuard<'_, Psg> {
        self.chip.lock()
    }
}

impl std::fmt::Debug for SharedPsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = f.debug_struct("SharedPsg");
        // Formatting while the caller holds the guard must not deadlock
        match self.chip.try_lock() {
            Some(chip) => out.field("registers", chip.registers()),
            None => out.field("registers", &"<locked>"),
        };
        out.finish()
    }
}
