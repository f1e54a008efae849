//! Audio pipeline — microphone capture → fixed-size frames → f32 conversion.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → CpalFrameSource (mpsc accumulation)
//!           → RawFrame (one chunk of i16 samples)
//!           → convert_frame → Vec<f32> in [-1.0, 1.0]
//! ```
//!
//! Capture hands out frames of exactly `sample_rate × chunk_secs` samples;
//! conversion is a strict 1:1 mapping with no resampling.

pub mod capture;
pub mod convert;

pub use capture::{AudioInput, CaptureError, CpalInput, FrameSource, FrameSpec};
pub use convert::{convert_frame, normalize_by_peak, ConvertError, RawFrame, PCM16_FULL_SCALE};
