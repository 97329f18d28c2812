//! Real-time audio output
//!
//! The playback thread owned by rodio plays the producer role: whenever its
//! block runs dry it pulls the next one from the shared chip.

pub mod audio_device;

pub use audio_device::AudioDevice;
