//! AY-3-8910 PSG Emulation Domain
//!
//! Core AY-3-8910 / YM2149 Programmable Sound Generator emulation:
//! tone generation, noise synthesis, envelope control and sample mixing.
//!
//! Implementation:
//! - `chip` - Counter-driven, sample-accurate core implementation

// Internal modules
pub mod chip;
pub mod constants;
pub mod envelope;
pub mod generators;
pub mod mixer;
pub mod registers;

// Re-export public API
pub use chip::{Psg, PsgState};
pub use constants::VolumeTable;
pub use envelope::{EnvelopeShape, ShapeFlags};
pub use mixer::MixerFlags;
pub use registers::{BusMode, Register, RegisterBank, RegisterStorage};
