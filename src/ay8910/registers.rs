//! AY-3-8910 Register Definitions
//!
//! Defines the 16 registers (R0-R13, R14-R15 for I/O ports) that control
//! the PSG, the storage they live in, and the BDIR/BC1 bus modes used to
//! address them.

use std::fmt;

/// Number of chip registers.
pub const REGISTER_COUNT: usize = 16;

/// AY-3-8910 Register Address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Channel A Period (fine) - R0
    ChAFineTune = 0x00,
    /// Channel A Period (coarse, 4 bits) - R1
    ChACoarseTune = 0x01,
    /// Channel B Period (fine) - R2
    ChBFineTune = 0x02,
    /// Channel B Period (coarse, 4 bits) - R3
    ChBCoarseTune = 0x03,
    /// Channel C Period (fine) - R4
    ChCFineTune = 0x04,
    /// Channel C Period (coarse, 4 bits) - R5
    ChCCoarseTune = 0x05,
    /// Noise Period (5 bits) - R6
    NoisePeriod = 0x06,
    /// Mixer Enable (tone/noise disable bits) - R7
    MixerCtrl = 0x07,
    /// Channel A Amplitude / envelope select - R8
    ChAAmplitude = 0x08,
    /// Channel B Amplitude / envelope select - R9
    ChBAmplitude = 0x09,
    /// Channel C Amplitude / envelope select - R10
    ChCAmplitude = 0x0A,
    /// Envelope Period (fine) - R11
    EnvelopeFine = 0x0B,
    /// Envelope Period (coarse) - R12
    EnvelopeCoarse = 0x0C,
    /// Envelope Shape - R13
    EnvelopeShape = 0x0D,
    /// I/O Port A - R14
    PortA = 0x0E,
    /// I/O Port B - R15
    PortB = 0x0F,
}

impl Register {
    const ALL: [Register; REGISTER_COUNT] = [
        Register::ChAFineTune,
        Register::ChACoarseTune,
        Register::ChBFineTune,
        Register::ChBCoarseTune,
        Register::ChCFineTune,
        Register::ChCCoarseTune,
        Register::NoisePeriod,
        Register::MixerCtrl,
        Register::ChAAmplitude,
        Register::ChBAmplitude,
        Register::ChCAmplitude,
        Register::EnvelopeFine,
        Register::EnvelopeCoarse,
        Register::EnvelopeShape,
        Register::PortA,
        Register::PortB,
    ];

    /// Convert a raw register number (0-15) to Register enum.
    ///
    /// Unlike the hardware address decoder this does not wrap: anything
    /// above 15 is rejected.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Get the register address value
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::ChAFineTune => write!(f, "R0 (Channel A Fine Tune)"),
            Register::ChACoarseTune => write!(f, "R1 (Channel A Coarse Tune)"),
            Register::ChBFineTune => write!(f, "R2 (Channel B Fine Tune)"),
            Register::ChBCoarseTune => write!(f, "R3 (Channel B Coarse Tune)"),
            Register::ChCFineTune => write!(f, "R4 (Channel C Fine Tune)"),
            Register::ChCCoarseTune => write!(f, "R5 (Channel C Coarse Tune)"),
            Register::NoisePeriod => write!(f, "R6 (Noise Period)"),
            Register::MixerCtrl => write!(f, "R7 (Mixer Enable)"),
            Register::ChAAmplitude => write!(f, "R8 (Channel A Amplitude)"),
            Register::ChBAmplitude => write!(f, "R9 (Channel B Amplitude)"),
            Register::ChCAmplitude => write!(f, "R10 (Channel C Amplitude)"),
            Register::EnvelopeFine => write!(f, "R11 (Envelope Period Fine)"),
            Register::EnvelopeCoarse => write!(f, "R12 (Envelope Period Coarse)"),
            Register::EnvelopeShape => write!(f, "R13 (Envelope Shape)"),
            Register::PortA => write!(f, "R14 (I/O Port A)"),
            Register::PortB => write!(f, "R15 (I/O Port B)"),
        }
    }
}

/// Backing store for the 16 register bytes.
///
/// The chip either owns its registers or borrows them from the host's
/// memory-mapped view of the PSG. Either way all mutation must go through
/// [`Psg::write_register`](crate::Psg::write_register); bytes changed
/// behind the chip's back are not decoded.
pub trait RegisterStorage {
    /// Current register bytes.
    fn registers(&self) -> &[u8; REGISTER_COUNT];

    /// Mutable register bytes (used by the chip's write path only).
    fn registers_mut(&mut self) -> &mut [u8; REGISTER_COUNT];
}

/// Raw register bank (16 bytes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterBank {
    /// Register values R0-R15
    pub registers: [u8; REGISTER_COUNT],
}

impl RegisterBank {
    /// Create a new register bank with all values set to 0
    pub fn new() -> Self {
        RegisterBank {
            registers: [0; REGISTER_COUNT],
        }
    }
}

impl RegisterStorage for RegisterBank {
    fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }

    fn registers_mut(&mut self) -> &mut [u8; REGISTER_COUNT] {
        &mut self.registers
    }
}

impl RegisterStorage for [u8; REGISTER_COUNT] {
    fn registers(&self) -> &[u8; REGISTER_COUNT] {
        self
    }

    fn registers_mut(&mut self) -> &mut [u8; REGISTER_COUNT] {
        self
    }
}

impl RegisterStorage for &mut [u8; REGISTER_COUNT] {
    fn registers(&self) -> &[u8; REGISTER_COUNT] {
        self
    }

    fn registers_mut(&mut self) -> &mut [u8; REGISTER_COUNT] {
        self
    }
}

/// PSG bus function selected by the BDIR and BC1 pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusMode {
    /// BDIR=0, BC1=0: bus released
    Inactive,
    /// BDIR=0, BC1=1: host reads the latched register
    Read,
    /// BDIR=1, BC1=0: host writes the latched register
    Write,
    /// BDIR=1, BC1=1: host latches a register address
    LatchAddress,
}

impl BusMode {
    /// Decode the pin pair.
    pub fn from_pins(bdir: bool, bc1: bool) -> Self {
        match (bdir, bc1) {
            (false, false) => BusMode::Inactive,
            (false, true) => BusMode::Read,
            (true, false) => BusMode::Write,
            (true, true) => BusMode::LatchAddress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_conversion() {
        assert_eq!(Register::from_index(0x00), Some(Register::ChAFineTune));
        assert_eq!(Register::from_index(0x0D), Some(Register::EnvelopeShape));
        assert_eq!(Register::from_index(0x0F), Some(Register::PortB));
        assert_eq!(Register::from_index(0x10), None);
    }

    #[test]
    fn test_register_index_round_trip() {
        for index in 0..REGISTER_COUNT {
            let reg = Register::from_index(index).unwrap();
            assert_eq!(reg.index(), index);
        }
    }

    #[test]
    fn test_register_bank() {
        let mut bank = RegisterBank::new();
        assert_eq!(bank.registers(), &[0; REGISTER_COUNT]);

        bank.registers_mut()[0] = 0x42;
        assert_eq!(bank.registers()[0], 0x42);
    }

    #[test]
    fn test_borrowed_storage_aliases_host_array() {
        fn poke<R: RegisterStorage>(mut storage: R) {
            storage.registers_mut()[7] = 0x3E;
        }

        let mut host = [0u8; REGISTER_COUNT];
        poke(&mut host);
        assert_eq!(host[7], 0x3E);
    }

    #[test]
    fn test_bus_mode_decoding() {
        assert_eq!(BusMode::from_pins(false, false), BusMode::Inactive);
        assert_eq!(BusMode::from_pins(false, true), BusMode::Read);
        assert_eq!(BusMode::from_pins(true, false), BusMode::Write);
        assert_eq!(BusMode::from_pins(true, true), BusMode::LatchAddress);
    }

    #[test]
    fn test_register_display() {
        assert_eq!(
            Register::EnvelopeShape.to_string(),
            "R13 (Envelope Shape)"
        );
    }
}
