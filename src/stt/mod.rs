//! STT (Speech-to-Text) engine module.
//!
//! [`SttEngine`] is the recognition boundary the capture loop calls:
//! normalized f32 samples and a beam size in, timestamped [`Segment`]s
//! out. The model file and decoding language are fixed when the engine is
//! constructed at startup.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use dictapad::stt::{SttEngine, TranscribeParams, WhisperEngine};
//!
//! let engine = WhisperEngine::load("models/ggml-small-q8_0.bin", TranscribeParams::default())
//!     .expect("model file missing");
//!
//! // audio: 16 kHz, mono, f32 PCM from the audio module
//! let audio: Vec<f32> = vec![0.0; 16_000]; // 1 s of silence
//! let segments = engine.transcribe(&audio, 5).unwrap();
//! assert!(segments.is_empty());
//! ```

pub mod engine;
pub mod transcribe;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use engine::{SttEngine, SttError, WhisperEngine};
pub use transcribe::{Segment, TranscribeParams};

// test-only re-export so other test modules can import MockSttEngine
// without `use dictapad::stt::engine::MockSttEngine`.
#[cfg(test)]
pub use engine::MockSttEngine;
