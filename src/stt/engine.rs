//! Core STT engine trait and implementations.
//!
//! [`SttEngine`] is the interface the capture worker calls. It is
//! object-safe and `Send + Sync` so it can be held behind an
//! `Arc<dyn SttEngine>`.
//!
//! [`WhisperEngine`] is the production implementation wrapping a
//! `whisper_rs::WhisperContext`. Construct it with [`WhisperEngine::load`].
//!
//! [`MockSttEngine`] (under `#[cfg(test)]`) returns a pre-configured
//! response and records its calls — used to unit-test the capture loop
//! without a GGML model file.

use std::path::Path;

use thiserror::Error;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::stt::transcribe::{Segment, TranscribeParams};

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

/// All errors that can arise from the STT subsystem.
#[derive(Debug, Clone, Error)]
pub enum SttError {
    /// The GGML model file was not found at the given path.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// `whisper_rs` failed to initialise a `WhisperContext` or `WhisperState`.
    #[error("Whisper context initialisation failed: {0}")]
    ContextInit(String),

    /// An error occurred during the inference pass.
    #[error("Transcription error: {0}")]
    Transcription(String),
}

// ---------------------------------------------------------------------------
// SttEngine trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for speech-to-text engines.
///
/// # Contract
///
/// - `audio` must be 16 kHz, mono, f32 PCM in `[-1.0, 1.0]`.
/// - `beam_size` is the beam-search width, passed through unchanged.
/// - Returns the recognized segments in playback order; an empty list
///   means nothing was recognized in this frame (e.g. silence).
pub trait SttEngine: Send + Sync {
    /// Transcribe one frame of audio.
    fn transcribe(&self, audio: &[f32], beam_size: i32) -> Result<Vec<Segment>, SttError>;
}

// Compile-time assertion: Box<dyn SttEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SttEngine>) {}
};

// ---------------------------------------------------------------------------
// WhisperEngine
// ---------------------------------------------------------------------------

/// Production STT engine that wraps a `whisper_rs::WhisperContext`.
///
/// A new `WhisperState` is created for every [`transcribe`] call so the
/// engine can be shared across threads without any locking.
///
/// [`transcribe`]: SttEngine::transcribe
pub struct WhisperEngine {
    ctx: WhisperContext,
    params: TranscribeParams,
}

impl std::fmt::Debug for WhisperEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperEngine")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

// `WhisperContext` holds a raw pointer internally but declares
// `unsafe impl Send` and `unsafe impl Sync` in whisper-rs — the model
// weights are read-only after loading.  `TranscribeParams` is fully owned
// and trivially Send+Sync.
// SAFETY: WhisperContext is Send+Sync as declared by whisper-rs.
unsafe impl Send for WhisperEngine {}
unsafe impl Sync for WhisperEngine {}

impl WhisperEngine {
    /// Load a GGML model from `model_path` and prepare it for inference.
    ///
    /// # Errors
    ///
    /// - [`SttError::ModelNotFound`] — `model_path` does not exist.
    /// - [`SttError::ContextInit`]  — whisper-rs failed to load the file.
    pub fn load(
        model_path: impl AsRef<Path>,
        params: TranscribeParams,
    ) -> Result<Self, SttError> {
        let path = model_path.as_ref();

        if !path.exists() {
            return Err(SttError::ModelNotFound(path.display().to_string()));
        }

        let path_str = path.to_str().ok_or_else(|| {
            SttError::ModelNotFound(format!(
                "model path contains non-UTF-8 characters: {}",
                path.display()
            ))
        })?;

        let ctx_params = WhisperContextParameters::default();
        let ctx = WhisperContext::new_with_params(path_str, ctx_params)
            .map_err(|e| SttError::ContextInit(e.to_string()))?;

        Ok(Self { ctx, params })
    }
}

impl SttEngine for WhisperEngine {
    fn transcribe(&self, audio: &[f32], beam_size: i32) -> Result<Vec<Segment>, SttError> {
        let mut fp = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size,
            patience: 1.0,
        });

        // set_language takes an Option<&str> whose lifetime is tied to fp.
        // Both `fp` and the borrow of `self.params.language` remain alive
        // until state.full() returns, so the borrow is valid.
        let lang: Option<&str> = if self.params.language == "auto" {
            None
        } else {
            Some(self.params.language.as_str())
        };
        fp.set_language(lang);
        fp.set_n_threads(self.params.n_threads);

        if self.params.suppress_progress {
            fp.set_print_progress(false);
            fp.set_print_realtime(false);
        }

        // Per-call state keeps the shared context lock-free.
        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| SttError::ContextInit(e.to_string()))?;

        state
            .full(fp, audio)
            .map_err(|e| SttError::Transcription(e.to_string()))?;

        let n_segments = state
            .full_n_segments()
            .map_err(|e| SttError::Transcription(e.to_string()))?;

        let mut segments: Vec<Segment> = Vec::with_capacity(n_segments as usize);
        for i in 0..n_segments {
            let text = state
                .full_get_segment_text(i)
                .map_err(|e| SttError::Transcription(format!("segment {i}: {e}")))?;

            // Timestamps are in centiseconds → multiply by 10 for ms.
            let start_ms = state.full_get_segment_t0(i).unwrap_or(0).max(0) as u64 * 10;
            let end_ms = state.full_get_segment_t1(i).unwrap_or(0).max(0) as u64 * 10;

            segments.push(Segment {
                text,
                start_ms,
                end_ms,
            });
        }

        Ok(segments)
    }
}

// ---------------------------------------------------------------------------
// MockSttEngine  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response without loading
/// any model file, recording every call it receives.
///
/// # Example
///
/// ```ignore
/// let engine = MockSttEngine::segments(&["hello"]);
/// let result = engine.transcribe(&vec![0.0f32; 16_000], 5);
/// assert_eq!(result.unwrap()[0].text, "hello");
/// ```
#[cfg(test)]
pub struct MockSttEngine {
    response: Result<Vec<Segment>, SttError>,
    /// `(audio_len, beam_size)` of every transcribe call, in order.
    pub calls: std::sync::Mutex<Vec<(usize, i32)>>,
}

#[cfg(test)]
impl MockSttEngine {
    /// A mock that recognizes the given texts as zero-length segments.
    pub fn segments(texts: &[&str]) -> Self {
        Self {
            response: Ok(texts
                .iter()
                .map(|t| Segment {
                    text: (*t).to_string(),
                    start_ms: 0,
                    end_ms: 0,
                })
                .collect()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// A mock that recognizes nothing (silence).
    pub fn silent() -> Self {
        Self::segments(&[])
    }

    /// A mock that always fails with `error`.
    pub fn err(error: SttError) -> Self {
        Self {
            response: Err(error),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Number of transcribe calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[cfg(test)]
impl SttEngine for MockSttEngine {
    fn transcribe(&self, audio: &[f32], beam_size: i32) -> Result<Vec<Segment>, SttError> {
        self.calls.lock().unwrap().push((audio.len(), beam_size));
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
