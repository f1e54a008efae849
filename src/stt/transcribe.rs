//! Transcription parameter and result types.
//!
//! [`TranscribeParams`] carries the process-wide settings fixed at engine
//! construction; the beam size is per-call and passed straight through
//! [`crate::stt::SttEngine::transcribe`].

// ---------------------------------------------------------------------------
// TranscribeParams
// ---------------------------------------------------------------------------

/// Settings fixed when the engine is constructed.
///
/// ```
/// use dictapad::stt::TranscribeParams;
///
/// let params = TranscribeParams {
///     language: "en".into(),
///     ..TranscribeParams::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct TranscribeParams {
    /// ISO-639-1 language code (e.g. `"en"`), or `"auto"` to let Whisper
    /// detect the language.
    pub language: String,

    /// Number of CPU threads handed to Whisper. Defaults to
    /// [`optimal_threads()`], capped at 8.
    pub n_threads: i32,

    /// Suppress Whisper's progress output to stderr.
    pub suppress_progress: bool,
}

impl Default for TranscribeParams {
    fn default() -> Self {
        Self {
            language: "auto".into(),
            n_threads: optimal_threads(),
            suppress_progress: true,
        }
    }
}

/// Number of physical CPU threads to use for inference, capped at 8 to
/// avoid diminishing returns on Whisper.
pub(crate) fn optimal_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get().min(8) as i32)
        .unwrap_or(4)
}

// ---------------------------------------------------------------------------
// Segment
// ---------------------------------------------------------------------------

/// A single time-aligned text chunk produced by the recognition engine for
/// one audio frame.
///
/// Segment order within a frame is playback order; the UI appends them in
/// exactly that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Segment text (may include punctuation inserted by Whisper).
    pub text: String,
    /// Segment start time in milliseconds from the start of the frame.
    pub start_ms: u64,
    /// Segment end time in milliseconds from the start of the frame.
    pub end_ms: u64,
}
