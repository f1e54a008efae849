//! Microphone capture via `cpal`.
//!
//! [`CpalInput`] opens the system default input device as a mono i16
//! stream at the requested rate. The cpal callback runs on a dedicated
//! audio thread and forwards each hardware buffer over an mpsc channel;
//! [`FrameSource::read_frame`] blocks on that channel until a full frame
//! of `frame_samples` samples has accumulated. Any leftover samples carry
//! over into the next frame, so no audio is dropped between reads.
//!
//! The stream itself lives inside the returned [`FrameSource`] — dropping
//! the source stops the hardware stream, which is how the capture worker
//! releases the device on every exit path.

use std::sync::mpsc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use super::convert::RawFrame;

// ---------------------------------------------------------------------------
// FrameSpec
// ---------------------------------------------------------------------------

/// Fixed capture geometry: rate and samples-per-frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpec {
    /// Capture sample rate in Hz.
    pub sample_rate: u32,
    /// Samples per frame (`sample_rate × chunk duration`).
    pub frame_samples: usize,
}

impl FrameSpec {
    /// Build a spec from a rate and a chunk duration in seconds.
    pub fn new(sample_rate: u32, chunk_secs: f32) -> Self {
        Self {
            sample_rate,
            frame_samples: (sample_rate as f32 * chunk_secs).round() as usize,
        }
    }
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors that can occur while setting up or running audio capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("failed to query input configs: {0}")]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("input device does not support mono 16-bit capture at {sample_rate} Hz")]
    UnsupportedFormat { sample_rate: u32 },

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// The running stream reported an error (device unplugged, backend
    /// failure). Fatal to the session — not retried.
    #[error("audio stream failed: {0}")]
    Stream(String),

    /// The stream stopped delivering data without reporting an error.
    #[error("audio stream disconnected")]
    Disconnected,
}

// ---------------------------------------------------------------------------
// AudioInput / FrameSource traits
// ---------------------------------------------------------------------------

/// Factory for capture sources.
///
/// The capture worker calls [`open`](AudioInput::open) on its own thread,
/// so only the factory itself needs to be `Send + Sync` — the returned
/// source never leaves the worker.
pub trait AudioInput: Send + Sync {
    /// Acquire the device and start streaming.
    fn open(&self, spec: FrameSpec) -> Result<Box<dyn FrameSource>, CaptureError>;
}

/// A started capture stream that hands out fixed-size frames.
pub trait FrameSource {
    /// Block until one full frame is available and return it.
    ///
    /// # Errors
    ///
    /// Any [`CaptureError`] is fatal to the capture session.
    fn read_frame(&mut self) -> Result<RawFrame, CaptureError>;
}

// ---------------------------------------------------------------------------
// CpalInput
// ---------------------------------------------------------------------------

/// What the cpal callback threads send to the reader.
enum CaptureMsg {
    Data(Vec<i16>),
    Error(String),
}

/// [`AudioInput`] backed by the default cpal host.
#[derive(Debug, Default)]
pub struct CpalInput;

impl CpalInput {
    pub fn new() -> Self {
        Self
    }
}

impl AudioInput for CpalInput {
    fn open(&self, spec: FrameSpec) -> Result<Box<dyn FrameSource>, CaptureError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(CaptureError::NoDevice)?;

        // Pick a mono i16 config that covers the requested rate.
        let supported = device
            .supported_input_configs()?
            .find(|range| {
                range.channels() == 1
                    && range.sample_format() == cpal::SampleFormat::I16
                    && range.min_sample_rate().0 <= spec.sample_rate
                    && range.max_sample_rate().0 >= spec.sample_rate
            })
            .ok_or(CaptureError::UnsupportedFormat {
                sample_rate: spec.sample_rate,
            })?
            .with_sample_rate(cpal::SampleRate(spec.sample_rate));

        let config: cpal::StreamConfig = supported.into();

        let (tx, rx) = mpsc::channel::<CaptureMsg>();
        let err_tx = tx.clone();

        let stream = device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                // Ignore send errors; the receiver may have been dropped.
                let _ = tx.send(CaptureMsg::Data(data.to_vec()));
            },
            move |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
                let _ = err_tx.send(CaptureMsg::Error(err.to_string()));
            },
            None, // no timeout
        )?;

        stream.play()?;
        log::info!(
            "audio capture started ({} Hz, mono i16, {} samples/frame)",
            spec.sample_rate,
            spec.frame_samples
        );

        Ok(Box::new(CpalFrameSource {
            _stream: stream,
            rx,
            pending: Vec::with_capacity(spec.frame_samples * 2),
            frame_samples: spec.frame_samples,
        }))
    }
}

/// Accumulates callback buffers into fixed-size frames.
///
/// Holding the `cpal::Stream` keeps the hardware stream alive; dropping
/// this source stops it.
struct CpalFrameSource {
    _stream: cpal::Stream,
    rx: mpsc::Receiver<CaptureMsg>,
    pending: Vec<i16>,
    frame_samples: usize,
}

impl FrameSource for CpalFrameSource {
    fn read_frame(&mut self) -> Result<RawFrame, CaptureError> {
        while self.pending.len() < self.frame_samples {
            match self.rx.recv() {
                Ok(CaptureMsg::Data(samples)) => self.pending.extend_from_slice(&samples),
                Ok(CaptureMsg::Error(msg)) => return Err(CaptureError::Stream(msg)),
                Err(mpsc::RecvError) => return Err(CaptureError::Disconnected),
            }
        }

        let frame: Vec<i16> = self.pending.drain(..self.frame_samples).collect();
        Ok(RawFrame::Samples(frame))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_spec_one_second_at_16k() {
        let spec = FrameSpec::new(16_000, 1.0);
        assert_eq!(spec.frame_samples, 16_000);
    }

    #[test]
    fn frame_spec_fractional_chunk_rounds() {
        let spec = FrameSpec::new(16_000, 0.25);
        assert_eq!(spec.frame_samples, 4_000);
    }

    /// The input factory must be shareable across threads.
    #[test]
    fn cpal_input_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CpalInput>();
    }

    /// Frame accumulation over the channel: callback-sized buffers are
    /// reassembled into exact frames with the remainder carried over.
    /// Uses a channel-only source with the same accumulation loop as
    /// `CpalFrameSource`, which needs real hardware to construct.
    #[test]
    fn frame_source_reassembles_callback_buffers() {
        struct ChannelSource {
            rx: mpsc::Receiver<CaptureMsg>,
            pending: Vec<i16>,
            frame_samples: usize,
        }
        impl FrameSource for ChannelSource {
            fn read_frame(&mut self) -> Result<RawFrame, CaptureError> {
                while self.pending.len() < self.frame_samples {
                    match self.rx.recv() {
                        Ok(CaptureMsg::Data(s)) => self.pending.extend_from_slice(&s),
                        Ok(CaptureMsg::Error(msg)) => return Err(CaptureError::Stream(msg)),
                        Err(mpsc::RecvError) => return Err(CaptureError::Disconnected),
                    }
                }
                Ok(RawFrame::Samples(
                    self.pending.drain(..self.frame_samples).collect(),
                ))
            }
        }

        let (tx, rx) = mpsc::channel();
        // 5 samples across two callbacks, frame size 4 → one frame + 1 pending.
        tx.send(CaptureMsg::Data(vec![1, 2, 3])).unwrap();
        tx.send(CaptureMsg::Data(vec![4, 5])).unwrap();

        let mut source = ChannelSource {
            rx,
            pending: Vec::new(),
            frame_samples: 4,
        };
        assert_eq!(
            source.read_frame().unwrap(),
            RawFrame::Samples(vec![1, 2, 3, 4])
        );
        assert_eq!(source.pending, vec![5]);

        // Remainder becomes the head of the next frame.
        tx.send(CaptureMsg::Data(vec![6, 7, 8])).unwrap();
        assert_eq!(
            source.read_frame().unwrap(),
            RawFrame::Samples(vec![5, 6, 7, 8])
        );

        // A stream error surfaces on the next read.
        tx.send(CaptureMsg::Error("device unplugged".into())).unwrap();
        assert!(matches!(
            source.read_frame().unwrap_err(),
            CaptureError::Stream(_)
        ));

        // Sender gone → disconnected.
        drop(tx);
        assert!(matches!(
            source.read_frame().unwrap_err(),
            CaptureError::Disconnected
        ));
    }
}
