//! AY-3-8910 Output Mixer Control
//!
//! Decodes the mixer enable register (R7). Each channel output is
//! `(ToneOn | ToneDisable) & (NoiseOn | NoiseDisable)`, mixed before the DAC,
//! so a channel with both tone and noise disabled is locked high and can
//! still be modulated through its volume.

use bitflags::bitflags;

use super::generators::NUM_CHANNELS;

bitflags! {
    /// Mixer Control Register (R7) bitflags
    ///
    /// A set bit disables the generator for that channel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MixerFlags: u8 {
        /// Channel A tone disable
        const CH_A_TONE = 0x01;
        /// Channel B tone disable
        const CH_B_TONE = 0x02;
        /// Channel C tone disable
        const CH_C_TONE = 0x04;
        /// Channel A noise disable
        const CH_A_NOISE = 0x08;
        /// Channel B noise disable
        const CH_B_NOISE = 0x10;
        /// Channel C noise disable
        const CH_C_NOISE = 0x20;
    }
}

impl MixerFlags {
    /// All three noise-disable bits
    pub const ALL_NOISE: MixerFlags = MixerFlags::CH_A_NOISE
        .union(MixerFlags::CH_B_NOISE)
        .union(MixerFlags::CH_C_NOISE);

    /// Create mixer flags from raw register value (I/O direction bits are dropped)
    pub fn from_register(value: u8) -> Self {
        MixerFlags::from_bits_truncate(value)
    }

    /// Tone-disable bit for a channel (0=A, 1=B, 2=C)
    pub fn tone_bit(channel: usize) -> Self {
        debug_assert!(channel < NUM_CHANNELS);
        MixerFlags::from_bits_truncate(0x01 << channel)
    }

    /// Noise-disable bit for a channel (0=A, 1=B, 2=C)
    pub fn noise_bit(channel: usize) -> Self {
        debug_assert!(channel < NUM_CHANNELS);
        MixerFlags::from_bits_truncate(0x08 << channel)
    }

    /// Check if the tone of a channel reaches its output
    pub fn is_tone_enabled(&self, channel: usize) -> bool {
        !self.contains(Self::tone_bit(channel))
    }

    /// Check if the noise reaches a channel output
    pub fn is_noise_enabled(&self, channel: usize) -> bool {
        !self.contains(Self::noise_bit(channel))
    }

    /// Check whether noise is disabled on every channel
    pub fn all_noise_disabled(&self) -> bool {
        self.contains(Self::ALL_NOISE)
    }
}

/// Per-channel noise gate: `noise output | R7`.
///
/// Bit `3 + channel` is set when the channel currently passes its tone,
/// either because the noise output is high or because noise is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseGate(u8);

impl NoiseGate {
    /// Combine the noise output mask (0x00/0xFF) with the raw R7 value.
    #[inline]
    pub fn new(noise_output: u8, mixer: u8) -> Self {
        NoiseGate(noise_output | mixer)
    }

    /// Whether a channel is open during the current noise state.
    #[inline]
    pub fn is_open(&self, channel: usize) -> bool {
        self.0 & MixerFlags::noise_bit(channel).bits() != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixer_flags() {
        let flags = MixerFlags::from_register(0x00);
        for ch in 0..NUM_CHANNELS {
            assert!(flags.is_tone_enabled(ch));
            assert!(flags.is_noise_enabled(ch));
        }
        assert!(!flags.all_noise_disabled());
    }

    #[test]
    fn test_mixer_flags_disabled() {
        let flags = MixerFlags::from_register(0xFF);
        for ch in 0..NUM_CHANNELS {
            assert!(!flags.is_tone_enabled(ch));
            assert!(!flags.is_noise_enabled(ch));
        }
        assert!(flags.all_noise_disabled());
    }

    #[test]
    fn test_mixer_flags_tone_only_a() {
        // Tone A on, everything else off
        let flags = MixerFlags::from_register(0x3E);
        assert!(flags.is_tone_enabled(0));
        assert!(!flags.is_tone_enabled(1));
        assert!(!flags.is_noise_enabled(0));
    }

    #[test]
    fn test_noise_gate() {
        // Noise enabled everywhere: gate follows the noise output
        assert!(!NoiseGate::new(0x00, 0x00).is_open(0));
        assert!(NoiseGate::new(0xFF, 0x00).is_open(2));
        // Noise disabled on B keeps B open while noise is low
        let gate = NoiseGate::new(0x00, 0x10);
        assert!(!gate.is_open(0));
        assert!(gate.is_open(1));
        assert!(!gate.is_open(2));
    }
}
