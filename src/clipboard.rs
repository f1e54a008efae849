//! Clipboard helper backed by the `arboard` crate.
//!
//! A short-lived [`arboard::Clipboard`] handle is created per call rather
//! than shared, because `arboard::Clipboard` is not `Send` on all
//! platforms and the handle is cheap to create.

use arboard::Clipboard;
use thiserror::Error;

/// Errors from clipboard access.
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// Could not open the system clipboard.
    #[error("cannot access clipboard: {0}")]
    Access(String),

    /// Could not write text to the system clipboard.
    #[error("cannot set clipboard text: {0}")]
    Set(String),
}

/// Write `text` into the system clipboard, replacing whatever was there.
///
/// # Errors
///
/// [`ClipboardError::Access`] if the clipboard cannot be opened,
/// [`ClipboardError::Set`] if writing fails.
pub fn copy_text(text: &str) -> Result<(), ClipboardError> {
    let mut clipboard = Clipboard::new().map_err(|e| ClipboardError::Access(e.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|e| ClipboardError::Set(e.to_string()))
}
