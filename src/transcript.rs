//! The transcript buffer — the text sink behind the editable panel.
//!
//! [`TranscriptBuffer`] accumulates recognized text in arrival order. The
//! UI binds the inner `String` to an egui `TextEdit`, so the user can also
//! edit it freely between appends; appends always go to the end.
//!
//! Only the UI thread touches this type — the capture worker delivers
//! segments over the session event channel instead of mutating the sink
//! directly.

/// Append-only accumulation of recognized text, with clear/copy support.
///
/// # Example
///
/// ```rust
/// use dictapad::transcript::TranscriptBuffer;
///
/// let mut transcript = TranscriptBuffer::new();
/// transcript.append("hello");
/// transcript.append("world");
/// assert_eq!(transcript.as_str(), "hello world ");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TranscriptBuffer {
    text: String,
}

impl TranscriptBuffer {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one segment's text followed by a single separating space.
    pub fn append(&mut self, text: &str) {
        self.text.push_str(text);
        self.text.push(' ');
    }

    /// Discard all accumulated text.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// The full accumulated transcript.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Mutable access for the egui text editor binding.
    pub fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    /// Returns `true` when no text has accumulated.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
