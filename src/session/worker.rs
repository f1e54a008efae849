//! The capture loop — one iteration per audio frame.
//!
//! ```text
//! while recording:
//!     frame    = source.read_frame()          (blocks ~ chunk duration)
//!     samples  = convert_frame(frame)
//!     segments = engine.transcribe(samples, beam_size)
//!     events.send(Transcribed { segments })   (skipped when empty)
//! ```
//!
//! The flag is checked only at iteration boundaries: an in-flight frame
//! read or inference call is never interrupted, so the last frame captured
//! before a stop still delivers its result. Any error aborts the loop and
//! propagates — a malformed frame is not silently skipped, since that
//! would desynchronize frame-to-result pacing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use crate::audio::{convert_frame, FrameSource};
use crate::stt::SttEngine;

use super::{SessionError, SessionEvent};

/// Run the capture loop until the flag clears, the event receiver goes
/// away, or a fatal error occurs.
///
/// The caller (the worker thread body in
/// [`super::SessionController::start`]) owns the frame source and drops it
/// when this returns, releasing the device on every exit path.
pub(crate) fn run_capture_loop(
    source: &mut dyn FrameSource,
    engine: &dyn SttEngine,
    recording: &AtomicBool,
    events: &mpsc::Sender<SessionEvent>,
    beam_size: i32,
) -> Result<(), SessionError> {
    while recording.load(Ordering::Acquire) {
        let frame = source.read_frame()?;
        let samples = convert_frame(frame)?;
        let segments = engine.transcribe(&samples, beam_size)?;

        log::debug!(
            "capture loop: frame of {} samples → {} segment(s)",
            samples.len(),
            segments.len()
        );

        if segments.is_empty() {
            continue;
        }
        if events.send(SessionEvent::Transcribed { segments }).is_err() {
            // UI is gone; nothing left to deliver to.
            break;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    use crate::audio::{CaptureError, RawFrame};
    use crate::stt::{MockSttEngine, SttError};

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Frame source that replays a script and clears the recording flag
    /// once the script is exhausted, so the loop exits at the next
    /// boundary exactly like a user pressing Stop.
    struct ScriptedSource {
        script: VecDeque<Result<RawFrame, CaptureError>>,
        recording: Arc<AtomicBool>,
        reads: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn new(
            script: Vec<Result<RawFrame, CaptureError>>,
            recording: &Arc<AtomicBool>,
        ) -> Self {
            Self {
                script: script.into(),
                recording: Arc::clone(recording),
                reads: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl FrameSource for ScriptedSource {
        fn read_frame(&mut self) -> Result<RawFrame, CaptureError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let next = self
                .script
                .pop_front()
                .expect("capture loop read past the scripted frames");
            if self.script.is_empty() {
                // Last scripted frame: simulate Stop during this read.
                self.recording.store(false, Ordering::Release);
            }
            next
        }
    }

    fn silence_frame() -> Result<RawFrame, CaptureError> {
        Ok(RawFrame::Samples(vec![0i16; 16_000]))
    }

    fn recording_flag(initial: bool) -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(initial))
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    /// A cleared flag means the loop exits before touching the source.
    #[test]
    fn cleared_flag_exits_without_reading() {
        let recording = recording_flag(false);
        let mut source = ScriptedSource::new(vec![silence_frame()], &recording);
        let reads = Arc::clone(&source.reads);
        let engine = MockSttEngine::segments(&["never"]);
        let (tx, rx) = mpsc::channel();

        run_capture_loop(&mut source, &engine, &recording, &tx, 5).unwrap();

        assert_eq!(reads.load(Ordering::SeqCst), 0);
        assert_eq!(engine.call_count(), 0);
        assert!(rx.try_recv().is_err());
    }

    /// Each recognized frame produces exactly one event, and no events
    /// arrive after the in-flight frame's result is delivered.
    #[test]
    fn stop_delivers_in_flight_result_then_nothing() {
        let recording = recording_flag(true);
        let mut source =
            ScriptedSource::new(vec![silence_frame(), silence_frame()], &recording);
        let engine = MockSttEngine::segments(&["hello"]);
        let (tx, rx) = mpsc::channel();

        run_capture_loop(&mut source, &engine, &recording, &tx, 5).unwrap();
        drop(tx);

        let mut transcribed = 0;
        while let Ok(event) = rx.recv() {
            assert!(matches!(event, SessionEvent::Transcribed { .. }));
            transcribed += 1;
        }
        // Both frames were read before the flag cleared; both delivered.
        assert_eq!(transcribed, 2);
        assert_eq!(engine.call_count(), 2);
    }

    /// Silence → empty segment list → the sink receives nothing.
    #[test]
    fn silent_frame_sends_no_event() {
        let recording = recording_flag(true);
        let mut source = ScriptedSource::new(vec![silence_frame()], &recording);
        let engine = MockSttEngine::silent();
        let (tx, rx) = mpsc::channel();

        run_capture_loop(&mut source, &engine, &recording, &tx, 5).unwrap();

        assert_eq!(engine.call_count(), 1);
        assert!(rx.try_recv().is_err());
    }

    /// A malformed frame fails conversion; the engine is never invoked and
    /// no partial text is appended.
    #[test]
    fn malformed_frame_aborts_before_recognition() {
        let recording = recording_flag(true);
        let odd_bytes = Ok(RawFrame::Pcm16Le(vec![0u8; 31_999]));
        let mut source = ScriptedSource::new(vec![odd_bytes], &recording);
        let engine = MockSttEngine::segments(&["garbage"]);
        let (tx, rx) = mpsc::channel();

        let err = run_capture_loop(&mut source, &engine, &recording, &tx, 5).unwrap_err();

        assert!(matches!(err, SessionError::Convert(_)));
        assert_eq!(engine.call_count(), 0);
        assert!(rx.try_recv().is_err());
    }

    /// A device failure mid-session is fatal and propagates.
    #[test]
    fn capture_error_propagates() {
        let recording = recording_flag(true);
        let mut source = ScriptedSource::new(
            vec![Err(CaptureError::Stream("device unplugged".into()))],
            &recording,
        );
        let engine = MockSttEngine::silent();
        let (tx, _rx) = mpsc::channel();

        let err = run_capture_loop(&mut source, &engine, &recording, &tx, 5).unwrap_err();
        assert!(matches!(err, SessionError::Capture(_)));
    }

    /// An engine failure is fatal-to-session — the frame is not retried.
    #[test]
    fn stt_error_propagates_without_retry() {
        let recording = recording_flag(true);
        let mut source = ScriptedSource::new(vec![silence_frame()], &recording);
        let engine = MockSttEngine::err(SttError::Transcription("boom".into()));
        let (tx, rx) = mpsc::channel();

        let err = run_capture_loop(&mut source, &engine, &recording, &tx, 5).unwrap_err();

        assert!(matches!(err, SessionError::Stt(_)));
        assert_eq!(engine.call_count(), 1);
        assert!(rx.try_recv().is_err());
    }

    /// The configured beam size reaches the engine unchanged, and the
    /// converted frame keeps its sample count.
    #[test]
    fn beam_size_and_sample_count_pass_through() {
        let recording = recording_flag(true);
        let mut source = ScriptedSource::new(vec![silence_frame()], &recording);
        let engine = MockSttEngine::silent();
        let (tx, _rx) = mpsc::channel();

        run_capture_loop(&mut source, &engine, &recording, &tx, 7).unwrap();

        assert_eq!(*engine.calls.lock().unwrap(), vec![(16_000, 7)]);
    }

    /// A dropped receiver ends the loop cleanly instead of erroring.
    #[test]
    fn dropped_receiver_ends_loop() {
        let recording = recording_flag(true);
        let mut source =
            ScriptedSource::new(vec![silence_frame(), silence_frame()], &recording);
        let engine = MockSttEngine::segments(&["hello"]);
        let (tx, rx) = mpsc::channel();
        drop(rx);

        run_capture_loop(&mut source, &engine, &recording, &tx, 5).unwrap();

        // First send fails → loop breaks after one frame.
        assert_eq!(engine.call_count(), 1);
    }
}
