use std::path::{Path, PathBuf};

/// Encodes an ordered frame-file sequence back into a video.
///
/// After encoding, the audio stream of `audio_source` (the original
/// container) is re-attached to the output when one exists.
pub trait VideoAssembler: Send {
    fn assemble(
        &mut self,
        frames: &[PathBuf],
        fps: f64,
        audio_source: &Path,
        output: &Path,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
