use crate::detection::domain::detected_face::DetectedFace;
use crate::shared::frame::Frame;

/// Boundary to the face swap model.
///
/// `swap` replaces `target`'s face region in `frame` with the identity of
/// `source` and returns the new frame; the input frame is untouched.
/// Implementations are shared between runs (`&self`), so they serialize
/// model calls internally. Per-call failures (degenerate geometry, model
/// runtime errors) are recoverable for the frame at hand, never fatal to
/// the process.
pub trait FaceSwapper: Send + Sync {
    fn swap(
        &self,
        frame: &Frame,
        target: &DetectedFace,
        source: &DetectedFace,
    ) -> Result<Frame, Box<dyn std::error::Error>>;
}
