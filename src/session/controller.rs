//! Recording session controller — the Idle/Recording state machine.
//!
//! [`SessionController`] is owned by the UI and drives the single capture
//! worker:
//!
//! ```text
//! Idle ──start()──▶ Recording      (spawns the capture-loop thread)
//! Recording ──stop()──▶ Idle       (clears the flag; worker exits at the
//!                                   next iteration boundary)
//! ```
//!
//! `start()` while recording is a no-op, which is what guarantees at most
//! one capture loop exists. `stop()` never joins — the UI thread must not
//! block on an in-flight frame read or inference call — but the handle is
//! not abandoned either: a finished predecessor is reaped on the next
//! `start()`, and [`shutdown`](SessionController::shutdown) joins on app
//! exit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::audio::{AudioInput, FrameSpec};
use crate::stt::SttEngine;

use super::worker::run_capture_loop;
use super::{SessionError, SessionEvent};

/// Owns the recording flag, the worker handle, and everything the worker
/// needs injected: the audio input factory and the recognition engine.
pub struct SessionController {
    input: Arc<dyn AudioInput>,
    engine: Arc<dyn SttEngine>,
    events: mpsc::Sender<SessionEvent>,
    spec: FrameSpec,
    beam_size: i32,
    recording: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SessionController {
    /// Create a controller in the `Idle` state.
    pub fn new(
        input: Arc<dyn AudioInput>,
        engine: Arc<dyn SttEngine>,
        events: mpsc::Sender<SessionEvent>,
        spec: FrameSpec,
        beam_size: i32,
    ) -> Self {
        Self {
            input,
            engine,
            events,
            spec,
            beam_size,
            recording: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Whether a recording session is active.
    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Acquire)
    }

    /// Start a recording session. No-op while one is already active or
    /// while the previous worker is still delivering its final frame.
    pub fn start(&mut self) {
        if self.is_recording() {
            log::debug!("start ignored — already recording");
            return;
        }
        if let Some(handle) = &self.worker {
            if !handle.is_finished() {
                log::debug!("start ignored — previous capture worker still winding down");
                return;
            }
        }
        // Previous worker (if any) has exited; reap it so the slot is free.
        self.reap_worker();

        self.recording.store(true, Ordering::Release);
        log::info!("recording started");

        let input = Arc::clone(&self.input);
        let engine = Arc::clone(&self.engine);
        let events = self.events.clone();
        let recording = Arc::clone(&self.recording);
        let spec = self.spec;
        let beam_size = self.beam_size;

        let handle = std::thread::Builder::new()
            .name("capture-loop".into())
            .spawn(move || {
                // The frame source lives entirely inside this closure: it
                // is opened here and dropped on every exit path, releasing
                // the device.
                let result: Result<(), SessionError> = (|| {
                    let mut source = input.open(spec)?;
                    run_capture_loop(
                        source.as_mut(),
                        engine.as_ref(),
                        &recording,
                        &events,
                        beam_size,
                    )
                })();

                recording.store(false, Ordering::Release);

                if let Err(e) = result {
                    log::error!("capture session ended: {e}");
                    let _ = events.send(SessionEvent::Error {
                        message: e.to_string(),
                    });
                } else {
                    log::info!("recording stopped");
                }
            })
            .expect("failed to spawn capture-loop thread");

        self.worker = Some(handle);
    }

    /// Stop the active session. Returns immediately; the worker observes
    /// the flag at its next iteration boundary and delivers any in-flight
    /// frame's result before exiting.
    pub fn stop(&mut self) {
        if !self.is_recording() {
            log::debug!("stop ignored — not recording");
            return;
        }
        self.recording.store(false, Ordering::Release);
        log::info!("stop requested");
    }

    /// Map a toggle action to whichever transition is valid.
    pub fn toggle(&mut self) {
        if self.is_recording() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Stop and wait for the worker to finish. Called on app exit, where
    /// blocking for the in-flight frame is acceptable.
    pub fn shutdown(&mut self) {
        self.recording.store(false, Ordering::Release);
        self.reap_worker();
    }

    fn reap_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!("capture worker panicked");
            }
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
