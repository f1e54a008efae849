//! Recording session — state machine, capture worker, UI event marshaling.
//!
//! [`SessionController`] lives on the UI thread and owns the recording
//! flag plus the worker handle. The worker runs
//! [`worker::run_capture_loop`]: a strictly serial
//! read → convert → transcribe → send loop that checks the flag at every
//! iteration boundary and exits cooperatively.
//!
//! Everything the worker produces reaches the UI as a [`SessionEvent`]
//! over `std::sync::mpsc` — the transcript widget is only ever touched on
//! the UI thread.

pub mod controller;
pub mod worker;

pub use controller::SessionController;

use thiserror::Error;

use crate::audio::{CaptureError, ConvertError};
use crate::stt::{Segment, SttError};

// ---------------------------------------------------------------------------
// SessionEvent
// ---------------------------------------------------------------------------

/// Messages marshaled from the capture worker to the UI thread.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// One frame finished recognition; segments are in playback order.
    /// Not sent for frames that recognized nothing.
    Transcribed { segments: Vec<Segment> },

    /// The session ended with a fatal error. The recording flag has
    /// already been reset by the time this arrives.
    Error { message: String },
}

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Fatal session failures. Any variant ends the recording session — no
/// retry, no degraded mode.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("audio capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("frame conversion failed: {0}")]
    Convert(#[from] ConvertError),

    #[error("transcription failed: {0}")]
    Stt(#[from] SttError),
}
