//! DictaPad — chunked microphone dictation into an editable transcript pad.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → FrameSource::read_frame (one chunk, blocking)
//!           → convert_frame (i16 → f32 in [-1.0, 1.0])
//!           → SttEngine::transcribe (whisper, beam search)
//!           → SessionEvent (mpsc) → egui update loop → TranscriptBuffer
//! ```
//!
//! The whole pipeline runs serially on a single `capture-loop` worker
//! thread owned by [`session::SessionController`]; the UI thread only sets
//! the recording flag and drains the event channel.

pub mod app;
pub mod audio;
pub mod clipboard;
pub mod config;
pub mod session;
pub mod stt;
pub mod transcript;
