use crate::shared::frame::Frame;

/// Boundary to the face enhancement model.
///
/// Fixed mode: restore the single centered face and paste it back, leaving
/// the rest of the frame geometry intact. No per-call configuration.
pub trait FaceEnhancer: Send + Sync {
    fn enhance(&self, frame: &Frame) -> Result<Frame, Box<dyn std::error::Error>>;
}
