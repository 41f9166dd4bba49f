use std::path::Path;

use crate::shared::frame::Frame;

/// Reads a single image file into a [`Frame`].
///
/// The pipeline assigns its own position index to frames it reads; the
/// returned frame's index is always 0.
pub trait ImageReader: Send {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>>;
}
