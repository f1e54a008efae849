//! Frame conversion — raw captured audio → Whisper's expected input.
//!
//! [`convert_frame`] turns one captured [`RawFrame`] into `f32` samples in
//! `[-1.0, 1.0]` by dividing each 16-bit sample by the signed full-scale
//! magnitude (32768). The mapping is 1:1 — sample order and count are
//! preserved exactly, and no resampling happens here.
//!
//! [`normalize_by_peak`] is an alternative scaling strategy (divide by the
//! frame's own peak amplitude). It is exported and tested but is **not**
//! called by the capture loop — see DESIGN.md.

use thiserror::Error;

/// Signed 16-bit full-scale magnitude. Division by this (not 32767) means
/// the most negative sample maps to exactly -1.0 and the most positive to
/// slightly under 1.0.
pub const PCM16_FULL_SCALE: f32 = 32768.0;

// ---------------------------------------------------------------------------
// RawFrame
// ---------------------------------------------------------------------------

/// One captured audio frame, in either of the two accepted encodings.
///
/// The capture layer produces [`RawFrame::Samples`]; [`RawFrame::Pcm16Le`]
/// covers byte-encoded PCM from alternate sources (e.g. a file or socket).
/// Making the encoding a tagged variant keeps both cases explicit and
/// exhaustively handled at the converter boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFrame {
    /// Little-endian 16-bit PCM bytes. Must have even length.
    Pcm16Le(Vec<u8>),
    /// Already-decoded signed 16-bit samples.
    Samples(Vec<i16>),
}

impl RawFrame {
    /// Number of samples this frame decodes to (bytes ÷ 2 for the byte
    /// encoding, ignoring a trailing odd byte — [`convert_frame`] rejects
    /// odd-length buffers outright).
    pub fn sample_count(&self) -> usize {
        match self {
            RawFrame::Pcm16Le(bytes) => bytes.len() / 2,
            RawFrame::Samples(samples) => samples.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// ConvertError
// ---------------------------------------------------------------------------

/// Errors from frame conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// A byte-encoded frame did not contain a whole number of 16-bit
    /// samples.
    #[error("PCM byte buffer has odd length {0} — not a whole number of 16-bit samples")]
    OddByteLength(usize),
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Convert a raw frame into `f32` samples in `[-1.0, 1.0]`.
///
/// Both encodings are first normalized to i16 samples, then each sample is
/// divided by [`PCM16_FULL_SCALE`].
///
/// # Errors
///
/// [`ConvertError::OddByteLength`] when a [`RawFrame::Pcm16Le`] buffer has
/// odd length.
pub fn convert_frame(frame: RawFrame) -> Result<Vec<f32>, ConvertError> {
    let samples = match frame {
        RawFrame::Samples(samples) => samples,
        RawFrame::Pcm16Le(bytes) => {
            if bytes.len() % 2 != 0 {
                return Err(ConvertError::OddByteLength(bytes.len()));
            }
            bytes
                .chunks_exact(2)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
                .collect()
        }
    };

    Ok(samples
        .iter()
        .map(|&s| f32::from(s) / PCM16_FULL_SCALE)
        .collect())
}

/// Scale samples by the frame's own peak absolute value.
///
/// An all-zero (silent) frame divides by 1 instead of 0 and comes back as
/// all zeros. Unlike [`convert_frame`], a frame containing any nonzero
/// sample always reaches ±1.0 at its loudest point.
///
/// Not used by the transcription loop — kept as a named alternate
/// strategy.
pub fn normalize_by_peak(samples: &[i16]) -> Vec<f32> {
    let peak = samples
        .iter()
        .map(|&s| i32::from(s).unsigned_abs())
        .max()
        .unwrap_or(0)
        .max(1) as f32;

    samples.iter().map(|&s| f32::from(s) / peak).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- convert_frame: sample encoding ------------------------------------

    #[test]
    fn samples_length_is_preserved() {
        let out = convert_frame(RawFrame::Samples(vec![0i16; 16_000])).unwrap();
        assert_eq!(out.len(), 16_000);
    }

    #[test]
    fn all_zero_samples_convert_to_all_zero_floats() {
        let out = convert_frame(RawFrame::Samples(vec![0i16; 256])).unwrap();
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn max_negative_sample_converts_to_exactly_minus_one() {
        let out = convert_frame(RawFrame::Samples(vec![i16::MIN])).unwrap();
        assert_eq!(out, vec![-1.0]);
    }

    #[test]
    fn max_positive_sample_converts_to_just_under_one() {
        let out = convert_frame(RawFrame::Samples(vec![i16::MAX])).unwrap();
        assert_eq!(out, vec![32_767.0 / 32_768.0]);
        assert!(out[0] < 1.0);
    }

    #[test]
    fn output_stays_in_unit_range() {
        let samples: Vec<i16> = vec![i16::MIN, -1, 0, 1, i16::MAX, 12_345, -12_345];
        let out = convert_frame(RawFrame::Samples(samples)).unwrap();
        assert!(out.iter().all(|&v| (-1.0..=1.0).contains(&v)));
    }

    #[test]
    fn sample_order_is_preserved() {
        let out = convert_frame(RawFrame::Samples(vec![32, -32, 64])).unwrap();
        assert_eq!(
            out,
            vec![32.0 / 32_768.0, -32.0 / 32_768.0, 64.0 / 32_768.0]
        );
    }

    // ---- convert_frame: byte encoding --------------------------------------

    #[test]
    fn byte_frame_decodes_little_endian_pairs() {
        // 0x0100 = 256, 0xFF7F = 32767, 0x0080 = -32768
        let bytes = vec![0x00, 0x01, 0xFF, 0x7F, 0x00, 0x80];
        let out = convert_frame(RawFrame::Pcm16Le(bytes)).unwrap();
        assert_eq!(
            out,
            vec![256.0 / 32_768.0, 32_767.0 / 32_768.0, -1.0]
        );
    }

    #[test]
    fn byte_frame_length_equals_sample_count() {
        let bytes = vec![0u8; 2 * 16_000];
        let out = convert_frame(RawFrame::Pcm16Le(bytes)).unwrap();
        assert_eq!(out.len(), 16_000);
    }

    #[test]
    fn odd_length_byte_frame_is_rejected() {
        let err = convert_frame(RawFrame::Pcm16Le(vec![0u8; 31_999])).unwrap_err();
        assert_eq!(err, ConvertError::OddByteLength(31_999));
    }

    #[test]
    fn empty_frames_convert_to_empty_output() {
        assert!(convert_frame(RawFrame::Pcm16Le(Vec::new())).unwrap().is_empty());
        assert!(convert_frame(RawFrame::Samples(Vec::new())).unwrap().is_empty());
    }

    #[test]
    fn both_encodings_agree_on_the_same_audio() {
        let samples: Vec<i16> = vec![0, 100, -100, i16::MAX, i16::MIN];
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let from_samples = convert_frame(RawFrame::Samples(samples)).unwrap();
        let from_bytes = convert_frame(RawFrame::Pcm16Le(bytes)).unwrap();
        assert_eq!(from_samples, from_bytes);
    }

    // ---- RawFrame::sample_count --------------------------------------------

    #[test]
    fn sample_count_matches_decoded_length() {
        assert_eq!(RawFrame::Pcm16Le(vec![0u8; 10]).sample_count(), 5);
        assert_eq!(RawFrame::Samples(vec![0i16; 7]).sample_count(), 7);
    }

    // ---- normalize_by_peak -------------------------------------------------

    #[test]
    fn peak_normalization_reaches_unit_amplitude() {
        let out = normalize_by_peak(&[0, 50, -100, 25]);
        assert_eq!(out, vec![0.0, 0.5, -1.0, 0.25]);
    }

    #[test]
    fn peak_normalization_of_silence_stays_silent() {
        // All-zero frame: peak guard divides by 1, not 0.
        let out = normalize_by_peak(&[0i16; 64]);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn peak_normalization_handles_min_sample() {
        // |i16::MIN| = 32768 does not fit in i16; the widened abs must not
        // overflow.
        let out = normalize_by_peak(&[i16::MIN, 16_384]);
        assert_eq!(out, vec![-1.0, 0.5]);
    }

    #[test]
    fn peak_normalization_of_empty_frame_is_empty() {
        assert!(normalize_by_peak(&[]).is_empty());
    }
}
