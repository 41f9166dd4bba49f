use std::path::{Path, PathBuf};

use crate::shared::video_metadata::VideoMetadata;

/// An extracted, ordered frame-file sequence.
///
/// `paths` is the processing order; position in this vector is the
/// pipeline's frame index, independent of any numbering embedded in the
/// file names. `fps` is the effective rate of the sequence (after any
/// frame-rate cap was applied).
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedSequence {
    pub paths: Vec<PathBuf>,
    pub fps: f64,
}

/// Turns a video file into an ordered sequence of frame image files.
pub trait FrameExtractor: Send {
    /// Inspects the video without decoding frames.
    fn probe(&mut self, video: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Decodes the video into numbered image files under `out_dir`.
    ///
    /// When `max_fps` is set and the source rate exceeds it, frames are
    /// dropped evenly so the returned sequence plays at the capped rate.
    fn extract(
        &mut self,
        video: &Path,
        out_dir: &Path,
        max_fps: Option<f64>,
    ) -> Result<ExtractedSequence, Box<dyn std::error::Error>>;
}
