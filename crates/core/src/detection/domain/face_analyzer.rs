use crate::detection::domain::detected_face::DetectedFace;
use crate::shared::frame::Frame;

/// Domain interface for combined face detection + identity embedding.
///
/// Implementations may hold inference state, hence `&mut self`. The order
/// of the returned faces is the detector's own output order; the pipeline
/// relies on it when no reference face is configured.
pub trait FaceAnalyzer: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>>;
}
