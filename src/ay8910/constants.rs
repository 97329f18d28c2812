//! AY-3-8910 Hardware Constants
//!
//! Shared constants and the logarithmic volume table used by every channel.

/// Number of entries in the volume table (5-bit envelope resolution).
pub const VOLUME_STEPS: usize = 32;

/// Largest value stored in the volume table.
pub const MAX_VOLUME: i32 = 0x0FFF;

/// Attenuation ratio between two consecutive table steps: 10 ^ (1.5 / 20), i.e. 1.5 dB.
pub const STEP_RATIO: f64 = 1.188502227;

/// Generator ticks consumed by one mixing sub-step.
pub const SUBSTEP_TICKS: i32 = 2;

/// Mixing sub-steps per emitted output sample.
pub const SUBSTEPS_PER_SAMPLE: usize = 2;

/// Divisor that brings the summed channel contributions back to table scale
/// (three channels, two ticks per sub-step).
pub const MIX_DIVISOR: i32 = 3 * SUBSTEP_TICKS;

/// Write masks applied to R0-R15.
pub const REG_MASK: [u8; 16] = [
    0xFF, 0x0F, 0xFF, 0x0F, 0xFF, 0x0F, 0x1F, 0xFF, 0x1F, 0x1F, 0x1F, 0xFF, 0xFF, 0x0F, 0xFF, 0xFF,
];

/// Volume-to-amplitude table, built once per chip.
///
/// The AY-3-8910 has 16 levels on a 3 dB scale; the YM2149 has 32 envelope
/// levels on a 1.5 dB scale. Only the finer curve is used here, tone volumes
/// index it at odd positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeTable([i32; VOLUME_STEPS]);

impl VolumeTable {
    /// Build the table: entry 0 is silence, entries 31..1 start at 4095 and
    /// drop by 1.5 dB per step, rounded to nearest.
    pub fn new() -> Self {
        let mut table = [0; VOLUME_STEPS];
        let mut out = MAX_VOLUME as f64;
        for entry in table.iter_mut().skip(1).rev() {
            *entry = (out + 0.5) as i32;
            out /= STEP_RATIO;
        }
        table[0] = 0;
        VolumeTable(table)
    }

    /// Amplitude for a 5-bit step index (masked to 0-31).
    #[inline]
    pub fn level(&self, step: usize) -> i32 {
        self.0[step & (VOLUME_STEPS - 1)]
    }

    /// Amplitude for a fixed 4-bit channel volume (R8-R10 low nibble).
    #[inline]
    pub fn fixed_volume(&self, nibble: u8) -> i32 {
        match nibble & 0x0F {
            0 => 0,
            n => self.0[n as usize * 2 + 1],
        }
    }
}

impl Default for VolumeTable {
    fn default() -> Self {
        Self::new()
    }
}
