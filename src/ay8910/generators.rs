//! Sound generators for the AY-3-8910 PSG
//!
//! This module contains the counter-driven generator components:
//! - Tone generators (3 channels)
//! - Noise generator (shared LFSR)
//!
//! Counters count down from the period to zero. The real chip counts up
//! until the counter reaches the period, which matters when a program
//! modulates the period quickly; [`retune`] compensates by moving the
//! counter by the period delta instead of reloading it.

/// Number of tone channels
pub const NUM_CHANNELS: usize = 3;

/// Initial LFSR seed
pub const NOISE_SEED: u32 = 1;

/// Galois feedback applied when bit 0 is shifted out (taps at bit 0 and bit 3).
const NOISE_FEEDBACK: u32 = 0x24000;

const LFSR_MASK: u32 = 0x1FFFF;

/// Apply a new period while keeping the oscillator phase.
///
/// A period of 0 behaves as 1. The counter moves by `new - old` and is
/// clamped so it stays strictly positive.
#[inline]
pub(crate) fn retune(period: &mut i32, count: &mut i32, new_period: i32) {
    let new_period = new_period.max(1);
    *count += new_period - *period;
    *period = new_period;
    if *count <= 0 {
        *count = 1;
    }
}

/// Tone generator for a single channel
///
/// A square wave whose half period is `period` generator ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToneGenerator {
    /// Ticks left until the next output transition
    count: i32,
    /// Half period from registers (12-bit, R0/R1, R2/R3, R4/R5)
    period: i32,
    /// Square wave output (0 or 1)
    output: u8,
}

impl ToneGenerator {
    /// Create a new tone generator (period 1, output low)
    pub fn new() -> Self {
        Self {
            count: 1,
            period: 1,
            output: 0,
        }
    }

    /// Set the period, preserving phase
    #[inline]
    pub fn set_period(&mut self, period: i32) {
        retune(&mut self.period, &mut self.count, period);
    }

    /// Get current period
    #[inline]
    pub fn period(&self) -> i32 {
        self.period
    }

    /// Ticks left until the next transition
    #[inline]
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Current output bit
    #[inline]
    pub fn output(&self) -> u8 {
        self.output
    }

    /// Keep the counter ahead of a whole block of `ticks` so the output
    /// cannot flip during that block.
    #[inline]
    pub fn hold_phase(&mut self, ticks: i32) {
        if self.count <= ticks {
            self.count += ticks;
        }
    }

    /// Lock the output high for a block of `ticks` (tone disabled in R7).
    #[inline]
    pub fn pin_high(&mut self, ticks: i32) {
        self.hold_phase(ticks);
        self.output = 1;
    }

    /// Advance by `ticks` and return how many of them the output spent high.
    #[inline]
    pub fn step(&mut self, ticks: i32) -> i32 {
        let mut high = 0;
        if self.output != 0 {
            high += self.count;
        }
        self.count -= ticks;
        // Adding the period twice leaves the output where it was and the wave
        // high for exactly one period; only a single add flips it.
        while self.count <= 0 {
            self.count += self.period;
            if self.count > 0 {
                self.output ^= 1;
                if self.output != 0 {
                    high += self.period;
                }
                break;
            }
            self.count += self.period;
            high += self.period;
        }
        if self.output != 0 {
            high -= self.count;
        }
        high
    }

    /// Advance by `ticks` without measuring the output.
    #[inline]
    pub fn skip(&mut self, ticks: i32) {
        self.count -= ticks;
        while self.count <= 0 {
            self.count += self.period;
            if self.count > 0 {
                self.output ^= 1;
                break;
            }
            self.count += self.period;
        }
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ToneGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Noise generator using a 17-bit LFSR
///
/// The output is kept as 0x00/0xFF so it can be OR-ed straight into the
/// mixer enable byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoiseGenerator {
    /// Ticks left until the next shift
    count: i32,
    /// Period from register R6 (5-bit)
    period: i32,
    /// 17-bit LFSR state, never 0
    rng: u32,
    /// Current output mask (0x00 or 0xFF)
    output: u8,
}

impl NoiseGenerator {
    /// Create a noise generator seeded with [`NOISE_SEED`]
    pub fn new() -> Self {
        Self {
            count: 1,
            period: 1,
            rng: NOISE_SEED,
            output: 0xFF,
        }
    }

    /// Set the period, preserving phase
    #[inline]
    pub fn set_period(&mut self, period: i32) {
        retune(&mut self.period, &mut self.count, period);
    }

    /// Get current period
    #[inline]
    pub fn period(&self) -> i32 {
        self.period
    }

    /// Ticks left until the next shift
    #[inline]
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Current output mask (0x00 or 0xFF)
    #[inline]
    pub fn output(&self) -> u8 {
        self.output
    }

    /// Current LFSR state
    #[inline]
    pub fn rng(&self) -> u32 {
        self.rng
    }

    /// See [`ToneGenerator::hold_phase`].
    #[inline]
    pub fn hold_phase(&mut self, ticks: i32) {
        if self.count <= ticks {
            self.count += ticks;
        }
    }

    /// Advance by `ticks` (never more than [`count`](Self::count)).
    ///
    /// Returns `true` when the output flipped.
    #[inline]
    pub fn advance(&mut self, ticks: i32) -> bool {
        self.count -= ticks;
        if self.count > 0 {
            return false;
        }

        // bit0 ^ bit1 of the register decides whether the output changes
        let flipped = (self.rng + 1) & 2 != 0;
        if flipped {
            self.output = !self.output;
        }

        // Galois form of the bit0 ^ bit3 feedback: what is now bit 3 becomes
        // bit 0 three shifts later and inverts what was bit 17.
        if self.rng & 1 != 0 {
            self.rng ^= NOISE_FEEDBACK;
        }
        self.rng >>= 1;
        debug_assert!(self.rng != 0 && self.rng <= LFSR_MASK);

        self.count += self.period;
        flipped
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retune_preserves_phase() {
        let mut period = 100;
        let mut count = 40;
        retune(&mut period, &mut count, 150);
        assert_eq!(period, 150);
        assert_eq!(count, 90);
    }

    #[test]
    fn test_retune_zero_period_and_clamp() {
        let mut period = 100;
        let mut count = 10;
        retune(&mut period, &mut count, 0);
        assert_eq!(period, 1);
        assert_eq!(count, 1, "counter is clamped to stay positive");
    }

    #[test]
    fn test_tone_square_wave() {
        let mut tone = ToneGenerator::new();
        tone.set_period(4);
        assert_eq!(tone.count(), 4);

        let mut highs = Vec::new();
        for _ in 0..8 {
            highs.push(tone.step(2));
        }
        // Low for 4 ticks, high for 4 ticks, repeated
        assert_eq!(highs, vec![0, 0, 2, 2, 0, 0, 2, 2]);
    }

    #[test]
    fn test_tone_partial_high_time() {
        let mut tone = ToneGenerator::new();
        tone.set_period(3);
        // Low for 3 ticks: only the last tick of the second step is high
        assert_eq!(tone.step(2), 0);
        assert_eq!(tone.step(2), 1);
        assert_eq!(tone.output(), 1);
    }

    #[test]
    fn test_tone_period_shorter_than_step() {
        let mut tone = ToneGenerator::new();
        // Period 1 toggles every tick: half of every 2-tick step is high
        for _ in 0..10 {
            assert_eq!(tone.step(2), 1);
        }
    }

    #[test]
    fn test_tone_skip_matches_step_phase() {
        let mut a = ToneGenerator::new();
        let mut b = ToneGenerator::new();
        a.set_period(7);
        b.set_period(7);
        for _ in 0..50 {
            a.step(2);
            b.skip(2);
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_tone_pin_high() {
        let mut tone = ToneGenerator::new();
        tone.set_period(3);
        tone.pin_high(16);
        assert_eq!(tone.output(), 1);
        for _ in 0..8 {
            assert_eq!(tone.step(2), 2);
        }
    }

    #[test]
    fn test_noise_power_on_state() {
        let noise = NoiseGenerator::new();
        assert_eq!(noise.rng(), NOISE_SEED);
        assert_eq!(noise.output(), 0xFF);
        assert_eq!(noise.period(), 1);
    }

    #[test]
    fn test_noise_lfsr_never_reaches_zero() {
        let mut noise = NoiseGenerator::new();
        for _ in 0..200_000 {
            noise.advance(1);
            assert_ne!(noise.rng(), 0);
            assert!(noise.rng() <= LFSR_MASK);
        }
    }

    #[test]
    fn test_noise_flip_reported() {
        let mut noise = NoiseGenerator::new();
        let mut last = noise.output();
        for _ in 0..1000 {
            let flipped = noise.advance(1);
            assert_eq!(flipped, noise.output() != last);
            last = noise.output();
        }
    }

    #[test]
    fn test_noise_period_gates_shift() {
        let mut noise = NoiseGenerator::new();
        noise.set_period(4);
        let seed = noise.rng();
        assert!(!noise.advance(1));
        assert!(!noise.advance(2));
        assert_eq!(noise.rng(), seed);
        noise.advance(1);
        assert_ne!(noise.rng(), seed);
        assert_eq!(noise.count(), 4);
    }
}
