//! AY-3-8910 / YM2149 PSG emulation
//!
//! Counter-driven core: generator counters run at twice the output sample
//! rate, in mixing sub-steps of two ticks, and every sub-step measures how
//! long each square wave stayed high. Only the first sub-step of each pair
//! is emitted as an output sample.

use log::{debug, trace, warn};

use super::constants::{
    VolumeTable, MAX_VOLUME, MIX_DIVISOR, REG_MASK, SUBSTEPS_PER_SAMPLE, SUBSTEP_TICKS,
};
use super::envelope::{Envelope, EnvelopeShape};
use super::generators::{NoiseGenerator, ToneGenerator, NUM_CHANNELS};
use super::mixer::{MixerFlags, NoiseGate};
use super::registers::{BusMode, Register, RegisterBank, RegisterStorage, REGISTER_COUNT};
use crate::{PsgError, Result};

/// Longest run of samples rendered against one tick budget.
const MAX_BLOCK_SAMPLES: usize = 1 << 16;

/// Snapshot of the derived chip state, for hosts and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsgState {
    /// Tone half periods A/B/C
    pub tone_periods: [i32; NUM_CHANNELS],
    /// Tone counters A/B/C
    pub tone_counts: [i32; NUM_CHANNELS],
    /// Tone outputs A/B/C (0 or 1)
    pub tone_outputs: [u8; NUM_CHANNELS],
    /// Noise period
    pub noise_period: i32,
    /// Noise counter
    pub noise_count: i32,
    /// Noise output (0x00 or 0xFF)
    pub noise_output: u8,
    /// Noise LFSR state
    pub rng: u32,
    /// Envelope period
    pub envelope_period: i32,
    /// Envelope counter
    pub envelope_count: i32,
    /// Envelope step (0-31)
    pub envelope_step: i32,
    /// Envelope attack mask (0x00 or 0x1F)
    pub attack: u8,
    /// Normalized hold bit
    pub hold: bool,
    /// Normalized alternate bit
    pub alternate: bool,
    /// Envelope stopped
    pub holding: bool,
    /// Envelope amplitude
    pub envelope_volume: i32,
    /// Channel amplitudes A/B/C
    pub volumes: [i32; NUM_CHANNELS],
}

/// AY-3-8910 PSG emulator
///
/// Generic over where the 16 register bytes live; see [`RegisterStorage`].
pub struct Psg<R: RegisterStorage = RegisterBank> {
    regs: R,
    volume_table: VolumeTable,
    tones: [ToneGenerator; NUM_CHANNELS],
    noise: NoiseGenerator,
    envelope: Envelope,
    /// Current amplitude per channel
    volumes: [i32; NUM_CHANNELS],
    /// Channel follows the envelope (amplitude bit 4)
    envelope_select: [bool; NUM_CHANNELS],
    /// Last per-channel contribution (high time x amplitude)
    analog: [i32; NUM_CHANNELS],
    selected_reg: usize,
    last_write: Option<(usize, u8)>,
    ready: bool,
    enabled: bool,
}

impl Psg<RegisterBank> {
    /// Create a new PSG owning its registers (all zero)
    pub fn new() -> Self {
        Self::with_storage(RegisterBank::new())
    }
}

impl Default for Psg<RegisterBank> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RegisterStorage> Psg<R> {
    /// Create a PSG on top of host-supplied register storage.
    ///
    /// The stored bytes are replayed through the write path, so they get
    /// masked and the derived periods, volumes and envelope match them.
    /// The chip starts not ready and enabled.
    pub fn with_storage(regs: R) -> Self {
        let mut chip = Psg {
            regs,
            volume_table: VolumeTable::new(),
            tones: Default::default(),
            noise: NoiseGenerator::new(),
            envelope: Envelope::new(),
            volumes: [0; NUM_CHANNELS],
            envelope_select: [false; NUM_CHANNELS],
            analog: [0; NUM_CHANNELS],
            selected_reg: 0,
            last_write: None,
            ready: false,
            enabled: true,
        };
        chip.replay_registers();
        chip
    }

    fn replay_registers(&mut self) {
        let snapshot = *self.regs.registers();
        for (reg, value) in snapshot.into_iter().enumerate() {
            self.write_reg(reg, value);
        }
        self.last_write = None;
    }

    /// Reset the chip to power-on state.
    ///
    /// Clears all registers through the write path, reseeds the noise LFSR and
    /// resets the generator outputs. Ready and enabled flags are kept.
    pub fn reset(&mut self) {
        debug!("PSG reset");
        *self.regs.registers_mut() = [0; REGISTER_COUNT];
        for tone in self.tones.iter_mut() {
            tone.reset();
        }
        self.noise.reset();
        self.envelope.reset();
        self.volumes = [0; NUM_CHANNELS];
        self.envelope_select = [false; NUM_CHANNELS];
        self.analog = [0; NUM_CHANNELS];
        self.selected_reg = 0;
        self.replay_registers();
    }

    /// Write a register (0-15).
    ///
    /// Values are masked to the register width. An index above 15 is
    /// rejected without touching any state.
    pub fn write_register(&mut self, index: u8, value: u8) -> Result<()> {
        let index = index as usize;
        if index >= REGISTER_COUNT {
            warn!("Rejected write of {value:#04x} to invalid PSG register {index}");
            return Err(PsgError::InvalidRegister(index));
        }
        self.write_reg(index, value);
        Ok(())
    }

    /// Drive the BDIR/BC1 bus pins with `data` on the bus.
    ///
    /// Latching selects a register, writing stores into the latched one.
    /// Read and inactive cycles have no effect.
    pub fn drive_bus(&mut self, bdir: bool, bc1: bool, data: u8) -> Result<()> {
        match BusMode::from_pins(bdir, bc1) {
            BusMode::LatchAddress => {
                let index = data as usize;
                if index >= REGISTER_COUNT {
                    warn!("Rejected latch of invalid PSG register {index}");
                    return Err(PsgError::InvalidRegister(index));
                }
                self.selected_reg = index;
            }
            BusMode::Write => self.write_reg(self.selected_reg, data),
            BusMode::Read | BusMode::Inactive => {}
        }
        Ok(())
    }

    fn write_reg(&mut self, reg: usize, value: u8) {
        let value = value & REG_MASK[reg];
        self.regs.registers_mut()[reg] = value;
        self.last_write = Some((reg, value));
        trace!("PSG R{reg} <- {value:#04x}");

        match reg {
            0..=5 => {
                let voice = reg >> 1;
                // The coarse byte may still hold bits that were never masked
                self.regs.registers_mut()[voice * 2 + 1] &= REG_MASK[voice * 2 + 1];
                let regs = self.regs.registers();
                let period = regs[voice * 2] as i32 | (regs[voice * 2 + 1] as i32) << 8;
                self.tones[voice].set_period(period);
            }
            6 => self.noise.set_period(value as i32),
            8..=10 => {
                let voice = reg - 8;
                self.envelope_select[voice] = value & 0x10 != 0;
                self.volumes[voice] = if self.envelope_select[voice] {
                    self.envelope.volume()
                } else {
                    self.volume_table.fixed_volume(value)
                };
            }
            11 | 12 => {
                let regs = self.regs.registers();
                let period = regs[11] as i32 | (regs[12] as i32) << 8;
                self.envelope.set_period(period);
            }
            13 => {
                let volume = self.envelope.trigger(value, &self.volume_table);
                debug!(
                    "Envelope triggered: {} (period {})",
                    EnvelopeShape::from_register(value),
                    self.envelope.period()
                );
                self.propagate_envelope(volume);
            }
            // R7 is read straight from storage by the mixer; R14/R15 are I/O ports
            _ => {}
        }
    }

    fn propagate_envelope(&mut self, volume: i32) {
        for (vol, &selected) in self.volumes.iter_mut().zip(self.envelope_select.iter()) {
            if selected {
                *vol = volume;
            }
        }
    }

    /// Mark the chip ready; output stays silent until this is called.
    pub fn start(&mut self) {
        debug!("PSG started");
        self.ready = true;
    }

    /// Mark the chip not ready. State is kept.
    pub fn stop(&mut self) {
        debug!("PSG stopped");
        self.ready = false;
    }

    /// Flip the mute flag and return the new enabled state.
    pub fn toggle_enabled(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    /// Set the mute flag.
    pub fn set_enabled(&mut self, enabled: bool) {
        debug!("PSG output {}", if enabled { "enabled" } else { "muted" });
        self.enabled = enabled;
    }

    /// Whether `start` was called (and `stop` was not)
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether output is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Generate `count` samples.
    pub fn render(&mut self, count: usize) -> Result<Vec<f32>> {
        let mut samples = vec![0.0; count];
        self.render_into(&mut samples)?;
        Ok(samples)
    }

    /// Fill `buffer` with unit-scale samples.
    ///
    /// While not ready or muted the buffer is zeroed and no counter moves.
    /// An empty buffer is rejected.
    pub fn render_into(&mut self, buffer: &mut [f32]) -> Result<()> {
        if buffer.is_empty() {
            warn!("Rejected empty PSG render request");
            return Err(PsgError::InvalidSampleCount);
        }

        if !self.ready || !self.enabled {
            buffer.fill(0.0);
            return Ok(());
        }

        for block in buffer.chunks_mut(MAX_BLOCK_SAMPLES) {
            self.render_block(block);
        }
        Ok(())
    }

    fn render_block(&mut self, buffer: &mut [f32]) {
        let block_ticks = buffer.len() as i32 * (SUBSTEPS_PER_SAMPLE as i32 * SUBSTEP_TICKS);
        let mixer_reg = self.regs.registers()[Register::MixerCtrl.index()];
        let mixer = MixerFlags::from_register(mixer_reg);

        // A disabled tone is locked high; a silent channel keeps its output.
        // Either way its counter is pushed past the block so it never goes stale.
        for ch in 0..NUM_CHANNELS {
            if !mixer.is_tone_enabled(ch) {
                self.tones[ch].pin_high(block_ticks);
            } else if self.regs.registers()[Register::ChAAmplitude.index() + ch] == 0 {
                self.tones[ch].hold_phase(block_ticks);
            }
        }
        if mixer.all_noise_disabled() {
            self.noise.hold_phase(block_ticks);
        }

        let mut gate = NoiseGate::new(self.noise.output(), mixer_reg);
        for sample in buffer.iter_mut() {
            let first = self.mix_substep(&mut gate, mixer_reg);
            self.mix_substep(&mut gate, mixer_reg);
            *sample = first as f32 / MIX_DIVISOR as f32 / MAX_VOLUME as f32;
        }
    }

    /// Run one sub-step and return the summed channel contributions.
    fn mix_substep(&mut self, gate: &mut NoiseGate, mixer_reg: u8) -> i32 {
        let mut high = [0i32; NUM_CHANNELS];
        let mut left = SUBSTEP_TICKS;

        // Split the sub-step at noise transitions so every tone sees the
        // gate that was open while it ran.
        while left > 0 {
            let next = self.noise.count().min(left);
            for (ch, tone) in self.tones.iter_mut().enumerate() {
                if gate.is_open(ch) {
                    high[ch] += tone.step(next);
                } else {
                    tone.skip(next);
                }
            }
            if self.noise.advance(next) {
                *gate = NoiseGate::new(self.noise.output(), mixer_reg);
            }
            left -= next;
        }

        if let Some(volume) = self.envelope.advance(SUBSTEP_TICKS, &self.volume_table) {
            self.propagate_envelope(volume);
        }

        for ch in 0..NUM_CHANNELS {
            self.analog[ch] = high[ch] * self.volumes[ch];
        }
        self.analog.iter().sum()
    }

    /// Raw register bytes
    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        self.regs.registers()
    }

    /// Read one register, `None` above 15
    pub fn register(&self, index: usize) -> Option<u8> {
        self.regs.registers().get(index).copied()
    }

    /// Last register write as (index, masked value)
    pub fn last_write(&self) -> Option<(usize, u8)> {
        self.last_write
    }

    /// Register currently latched on the bus
    pub fn selected_register(&self) -> usize {
        self.selected_reg
    }

    /// The chip's volume table
    pub fn volume_table(&self) -> &VolumeTable {
        &self.volume_table
    }

    /// Last per-channel contribution (high time x amplitude) of the most
    /// recent sub-step, for pin monitoring and visualization.
    pub fn analog_levels(&self) -> [i32; NUM_CHANNELS] {
        self.analog
    }

    /// [`analog_levels`](Self::analog_levels) scaled to 0.0-1.0
    pub fn channel_outputs(&self) -> [f32; NUM_CHANNELS] {
        let full = (SUBSTEP_TICKS * MAX_VOLUME) as f32;
        self.analog.map(|level| level as f32 / full)
    }

    /// Decoded envelope shape from R13
    pub fn envelope_shape(&self) -> EnvelopeShape {
        EnvelopeShape::from_register(self.regs.registers()[Register::EnvelopeShape.index()])
    }

    /// Snapshot of the derived state
    pub fn state(&self) -> PsgState {
        PsgState {
            tone_periods: self.tones.each_ref().map(|t| t.period()),
            tone_counts: self.tones.each_ref().map(|t| t.count()),
            tone_outputs: self.tones.each_ref().map(|t| t.output()),
            noise_period: self.noise.period(),
            noise_count: self.noise.count(),
            noise_output: self.noise.output(),
            rng: self.noise.rng(),
            envelope_period: self.envelope.period(),
            envelope_count: self.envelope.count(),
            envelope_step: self.envelope.step(),
            attack: self.envelope.attack(),
            hold: self.envelope.hold(),
            alternate: self.envelope.alternate(),
            holding: self.envelope.is_holding(),
            envelope_volume: self.envelope.volume(),
            volumes: self.volumes,
        }
    }
}

impl<R: RegisterStorage> std::fmt::Debug for Psg<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Psg")
            .field("regs", self.regs.registers())
            .field("ready", &self.ready)
            .field("enabled", &self.enabled)
            .field("state", &self.state())
            .finish()
    }
}
