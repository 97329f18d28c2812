//! Audio file output
//!
//! File-backed [`AudioSink`](crate::AudioSink) implementations.

pub mod wav;

pub use wav::{render_to_wav, WavSink};
