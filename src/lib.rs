//! AY-3-8910 / YM2149 PSG core
//!
//! A sample-accurate emulator of the General Instrument AY-3-8910 family of
//! Programmable Sound Generators (and the compatible Yamaha YM2149), built as
//! the sound core of a retro console emulator: the host CPU emulation feeds
//! register writes in, an audio callback pulls sample blocks out.
//!
//! # Features
//! - Three tone channels, the shared 17-bit noise LFSR and the envelope generator
//! - Phase-preserving period updates and period-0 aliasing like the real chip
//! - 32-step, 1.5 dB logarithmic volume table
//! - Side-effect-free silence while stopped or muted
//! - Owned or host-aliased register storage
//!
//! # Crate feature flags
//! - `export-wav` (default): WAV file sink (enables `hound`)
//! - `streaming` (opt-in): Real-time audio output via rodio
//!
//! # Quick start
//! ```
//! use ay8910::Psg;
//! let mut chip = Psg::new();
//! chip.write_register(0, 0x1C).unwrap(); // Tone A fine
//! chip.write_register(1, 0x01).unwrap(); // Tone A coarse
//! chip.write_register(7, 0x3E).unwrap(); // Tone A only
//! chip.write_register(8, 0x0F).unwrap(); // Volume A
//! chip.start();
//! let block = chip.render(512).unwrap();
//! assert_eq!(block.len(), 512);
//! ```
//!
//! ## Sharing between an emulation thread and an audio thread
//! ```
//! use ay8910::{BufferSink, SharedPsg};
//! let psg = SharedPsg::default();
//! psg.write_register(8, 0x0F).unwrap();
//! psg.start();
//!
//! let mut sink = BufferSink::new(22_050);
//! psg.pump(&mut sink, 512).unwrap();
//! assert_eq!(sink.samples().len(), 512);
//! ```

#![warn(missing_docs)]

pub mod ay8910; // PSG Emulation (core)
pub mod config; // Runtime configuration
pub mod shared; // Writer/producer handle
pub mod sink; // Audio sink abstraction

#[cfg(feature = "export-wav")]
pub mod export; // WAV file output

#[cfg(feature = "streaming")]
pub mod streaming; // Audio Output & Streaming

/// Error types for PSG operations
#[derive(thiserror::Error, Debug)]
pub enum PsgError {
    /// Register index outside 0-15
    #[error("Invalid register index: {0}")]
    InvalidRegister(usize),

    /// Render request for zero samples
    #[error("Sample count must be positive")]
    InvalidSampleCount,

    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFileError(String),

    /// Audio device error
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// Result type for PSG operations
pub type Result<T> = std::result::Result<T, PsgError>;

// Public API exports
pub use crate::ay8910::{Psg, PsgState, Register, RegisterBank, RegisterStorage, VolumeTable};
pub use config::PsgConfig;
pub use shared::SharedPsg;
pub use sink::{AudioSink, BufferSink};

#[cfg(feature = "export-wav")]
pub use export::WavSink;

#[cfg(feature = "streaming")]
pub use streaming::AudioDevice;
