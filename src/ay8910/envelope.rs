//! AY-3-8910 Envelope Generator
//!
//! A 32-step counter walked from 31 down to 0 and XOR-ed with the attack mask,
//! so the same down-counter produces both falling and rising ramps. The
//! envelope is clocked once per mixing sub-step and counts its period in
//! generator ticks like the tone and noise generators.

use std::fmt;

use super::constants::VolumeTable;
use super::generators::retune;

/// Attack mask value for rising shapes
pub const ATTACK_MASK: u8 = 0x1F;

/// Highest envelope step
const TOP_STEP: i32 = 0x1F;

/// Envelope Shape Control - Register R13
///
/// Shapes with Continue=0 are listed separately but behave like their
/// Continue=1 counterpart (hold, alternate = attack).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    /// 00xx: `\___` decay once, then silence
    DecayOnce,
    /// 01xx: `/___` attack once, then silence
    AttackOnce,
    /// 1000: `\\\\` repeating sawtooth down
    SawtoothDown,
    /// 1001: `\___` decay once, then silence
    DecayHoldLow,
    /// 1010: `\/\/` triangle starting high
    TriangleDown,
    /// 1011: `\¯¯¯` decay once, then hold high
    DecayHoldHigh,
    /// 1100: `////` repeating sawtooth up
    SawtoothUp,
    /// 1101: `/¯¯¯` attack once, then hold high
    AttackHoldHigh,
    /// 1110: `/\/\` triangle starting low
    TriangleUp,
    /// 1111: `/___` attack once, then silence
    AttackHoldLow,
}

impl EnvelopeShape {
    /// Create from raw register value (masked to 4 bits)
    pub fn from_register(value: u8) -> Self {
        match value & 0x0F {
            0x00..=0x03 => EnvelopeShape::DecayOnce,
            0x04..=0x07 => EnvelopeShape::AttackOnce,
            0x08 => EnvelopeShape::SawtoothDown,
            0x09 => EnvelopeShape::DecayHoldLow,
            0x0A => EnvelopeShape::TriangleDown,
            0x0B => EnvelopeShape::DecayHoldHigh,
            0x0C => EnvelopeShape::SawtoothUp,
            0x0D => EnvelopeShape::AttackHoldHigh,
            0x0E => EnvelopeShape::TriangleUp,
            _ => EnvelopeShape::AttackHoldLow,
        }
    }

    /// Normalized control bits for this shape.
    pub fn flags(&self) -> ShapeFlags {
        let (attack, alternate, hold) = match self {
            EnvelopeShape::DecayOnce | EnvelopeShape::DecayHoldLow => (false, false, true),
            EnvelopeShape::AttackOnce | EnvelopeShape::AttackHoldLow => (true, true, true),
            EnvelopeShape::SawtoothDown => (false, false, false),
            EnvelopeShape::TriangleDown => (false, true, false),
            EnvelopeShape::DecayHoldHigh => (false, true, true),
            EnvelopeShape::SawtoothUp => (true, false, false),
            EnvelopeShape::AttackHoldHigh => (true, false, true),
            EnvelopeShape::TriangleUp => (true, true, false),
        };
        ShapeFlags {
            attack,
            alternate,
            hold,
        }
    }
}

impl fmt::Display for EnvelopeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeShape::DecayOnce => write!(f, "Decay-Once"),
            EnvelopeShape::AttackOnce => write!(f, "Attack-Once"),
            EnvelopeShape::SawtoothDown => write!(f, "Sawtooth-Down"),
            EnvelopeShape::DecayHoldLow => write!(f, "Decay-Hold-Low"),
            EnvelopeShape::TriangleDown => write!(f, "Triangle-Down"),
            EnvelopeShape::DecayHoldHigh => write!(f, "Decay-Hold-High"),
            EnvelopeShape::SawtoothUp => write!(f, "Sawtooth-Up"),
            EnvelopeShape::AttackHoldHigh => write!(f, "Attack-Hold-High"),
            EnvelopeShape::TriangleUp => write!(f, "Triangle-Up"),
            EnvelopeShape::AttackHoldLow => write!(f, "Attack-Hold-Low"),
        }
    }
}

/// Decoded R13 control bits after Continue normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeFlags {
    /// Ramp starts rising
    pub attack: bool,
    /// Direction flips at the end of every ramp
    pub alternate: bool,
    /// Envelope stops after the first ramp
    pub hold: bool,
}

/// Envelope Generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Period from R11/R12 (16-bit, 0 behaves as 1)
    period: i32,
    /// Ticks left until the next step
    count: i32,
    /// Current step, 31 down to 0
    step: i32,
    /// 0x00 or 0x1F, XOR-ed into the step
    attack: u8,
    hold: bool,
    alternate: bool,
    /// Set once a holding shape finished its ramp
    holding: bool,
    /// Current envelope amplitude
    volume: i32,
}

impl Envelope {
    /// Create a new envelope generator
    pub fn new() -> Self {
        Envelope {
            period: 1,
            count: 1,
            step: 0,
            attack: 0,
            hold: false,
            alternate: false,
            holding: false,
            volume: 0,
        }
    }

    /// Set the envelope period, preserving phase.
    ///
    /// Period 0 is treated as 1, the same as tone and noise.
    pub fn set_period(&mut self, period: i32) {
        retune(&mut self.period, &mut self.count, period);
    }

    /// Restart the envelope with a new R13 shape and return its first volume.
    pub fn trigger(&mut self, shape: u8, table: &VolumeTable) -> i32 {
        let flags = EnvelopeShape::from_register(shape).flags();
        self.attack = if flags.attack { ATTACK_MASK } else { 0 };
        self.alternate = flags.alternate;
        self.hold = flags.hold;
        self.count = self.period;
        self.step = TOP_STEP;
        self.holding = false;
        self.volume = table.level((self.step as u8 ^ self.attack) as usize);
        self.volume
    }

    /// Advance by `ticks` generator ticks.
    ///
    /// Returns the new volume when the envelope moved to another step.
    pub fn advance(&mut self, ticks: i32, table: &VolumeTable) -> Option<i32> {
        if self.holding {
            return None;
        }

        self.count -= ticks;
        if self.count > 0 {
            return None;
        }

        loop {
            self.step -= 1;
            self.count += self.period;
            if self.count > 0 {
                break;
            }
        }

        if self.step < 0 {
            if self.hold {
                if self.alternate {
                    self.attack ^= ATTACK_MASK;
                }
                self.holding = true;
                self.step = 0;
            } else {
                // An odd number of wraps (usually one) flips direction
                if self.alternate && self.step & 0x20 != 0 {
                    self.attack ^= ATTACK_MASK;
                }
                self.step &= TOP_STEP;
            }
        }

        self.volume = table.level((self.step as u8 ^ self.attack) as usize);
        Some(self.volume)
    }

    /// Current envelope amplitude
    #[inline]
    pub fn volume(&self) -> i32 {
        self.volume
    }

    /// Envelope period
    pub fn period(&self) -> i32 {
        self.period
    }

    /// Ticks left until the next step
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Current step (0-31)
    pub fn step(&self) -> i32 {
        self.step
    }

    /// Attack mask (0x00 or 0x1F)
    pub fn attack(&self) -> u8 {
        self.attack
    }

    /// Hold bit after normalization
    pub fn hold(&self) -> bool {
        self.hold
    }

    /// Alternate bit after normalization
    pub fn alternate(&self) -> bool {
        self.alternate
    }

    /// Whether the envelope has stopped
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collect the volume after each of `steps` sub-steps of 2 ticks.
    fn run(env: &mut Envelope, table: &VolumeTable, steps: usize) -> Vec<i32> {
        (0..steps)
            .map(|_| {
                env.advance(2, table);
                env.volume()
            })
            .collect()
    }

    /// Decode the raw Continue/Attack/Alternate/Hold bits directly.
    fn decode_bits(value: u8) -> ShapeFlags {
        let attack = value & 0x04 != 0;
        if value & 0x08 == 0 {
            // Continue=0: hold set, alternate follows attack
            ShapeFlags {
                attack,
                alternate: attack,
                hold: true,
            }
        } else {
            ShapeFlags {
                attack,
                alternate: value & 0x02 != 0,
                hold: value & 0x01 != 0,
            }
        }
    }

    #[test]
    fn test_envelope_shape_creation() {
        assert_eq!(EnvelopeShape::from_register(0x00), EnvelopeShape::DecayOnce);
        assert_eq!(EnvelopeShape::from_register(0x0C), EnvelopeShape::SawtoothUp);
        assert_eq!(EnvelopeShape::from_register(0xFE), EnvelopeShape::TriangleUp);
    }

    #[test]
    fn test_continue_zero_normalization() {
        for value in 0x00..=0x03 {
            let flags = decode_bits(value);
            assert_eq!(flags, EnvelopeShape::DecayHoldLow.flags());
        }
        for value in 0x04..=0x07 {
            let flags = decode_bits(value);
            assert_eq!(flags, EnvelopeShape::AttackHoldLow.flags());
        }
    }

    #[test]
    fn test_shape_flags_match_register_decoding() {
        for value in 0x00..=0x0F {
            assert_eq!(
                EnvelopeShape::from_register(value).flags(),
                decode_bits(value),
                "shape {value:#x}"
            );
        }
    }

    #[test]
    fn test_trigger_applies_normalized_flags() {
        let table = VolumeTable::new();
        for value in 0x00..=0x0F {
            let mut env = Envelope::new();
            env.trigger(value, &table);
            let flags = decode_bits(value);
            assert_eq!(env.attack() != 0, flags.attack, "shape {value:#x}");
            assert_eq!(env.alternate(), flags.alternate, "shape {value:#x}");
            assert_eq!(env.hold(), flags.hold, "shape {value:#x}");
        }
    }

    #[test]
    fn test_trigger_seeds_state() {
        let table = VolumeTable::new();
        let mut env = Envelope::new();
        env.set_period(10);
        let vol = env.trigger(0x0D, &table);
        assert_eq!(env.step(), 31);
        assert_eq!(env.count(), 10);
        assert!(!env.is_holding());
        assert_eq!(env.attack(), ATTACK_MASK);
        assert_eq!(vol, table.level(0));
    }

    #[test]
    fn test_decay_then_hold_silent() {
        let table = VolumeTable::new();
        let mut env = Envelope::new();
        env.trigger(0x00, &table);
        assert_eq!(env.volume(), table.level(31));

        let vols = run(&mut env, &table, 40);
        // Period 1: two steps per sub-step
        assert_eq!(vols[0], table.level(29));
        assert!(env.is_holding());
        assert_eq!(env.volume(), 0);
        assert!(env.advance(2, &table).is_none());
    }

    #[test]
    fn test_attack_hold_high() {
        let table = VolumeTable::new();
        let mut env = Envelope::new();
        env.trigger(0x0D, &table);
        run(&mut env, &table, 40);
        assert!(env.is_holding());
        assert_eq!(env.volume(), table.level(31));
    }

    #[test]
    fn test_sawtooth_repeats() {
        let table = VolumeTable::new();
        let mut env = Envelope::new();
        env.set_period(2);
        env.trigger(0x08, &table);
        // One step per sub-step: 30, 29, ... 0, 31, 30 ...
        let vols = run(&mut env, &table, 40);
        assert_eq!(vols[0], table.level(30));
        assert_eq!(vols[30], table.level(0));
        assert_eq!(vols[31], table.level(31));
        assert!(!env.is_holding());
    }

    #[test]
    fn test_triangle_alternates() {
        let table = VolumeTable::new();
        let mut env = Envelope::new();
        env.set_period(2);
        env.trigger(0x0A, &table);
        let vols = run(&mut env, &table, 40);
        assert_eq!(vols[30], table.level(0));
        // After the wrap the ramp rises again instead of jumping to the top
        assert_eq!(vols[31], table.level(0));
        assert_eq!(vols[32], table.level(1));
    }

    #[test]
    fn test_envelope_zero_period_behaves_as_one() {
        let mut env = Envelope::new();
        env.set_period(0);
        assert_eq!(env.period(), 1);
    }
}
