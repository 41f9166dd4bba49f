use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::detection::domain::detected_face::{select_primary, DetectedFace};
use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::pipeline::candidate_filter::first_qualifying;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::report::{RunStatus, UnitOutcome, VideoRunReport};
use crate::shared::lazy_model::LazyModel;
use crate::swapping::domain::face_enhancer::FaceEnhancer;
use crate::swapping::domain::face_swapper::FaceSwapper;
use crate::swapping::domain::swap_verifier::SwapVerifier;
use crate::video::domain::image_reader::ImageReader;
use crate::video::domain::image_writer::ImageWriter;

/// Swap-and-verify pipeline over an ordered frame-file sequence.
///
/// The source face (and the reference face, when configured) is selected
/// once per run. Each frame is then processed strictly in sequence order:
/// detect → first qualifying face wins → swap → enhance → verify → write
/// back in place. A frame is only written after both swap and enhancement
/// succeeded; a partially processed buffer is never persisted.
///
/// The black-region check gates writes only until the first verified
/// commit; after that the run trusts the configuration and commits
/// enhanced frames unconditionally. A verification failure while the gate
/// is still armed aborts the whole run: it means the model/resolution/
/// threshold combination is unsound for this input and later frames would
/// keep failing the same way.
pub struct SwapVideoUseCase {
    reader: Box<dyn ImageReader>,
    writer: Box<dyn ImageWriter>,
    analyzer: Box<dyn FaceAnalyzer>,
    swapper: Arc<LazyModel<dyn FaceSwapper>>,
    enhancer: Arc<LazyModel<dyn FaceEnhancer>>,
    verifier: SwapVerifier,
    match_threshold: f64,
    logger: Box<dyn PipelineLogger>,
}

enum UnitResult {
    Committed { verified: bool },
    Skipped,
    Rejected,
}

impl SwapVideoUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reader: Box<dyn ImageReader>,
        writer: Box<dyn ImageWriter>,
        analyzer: Box<dyn FaceAnalyzer>,
        swapper: Arc<LazyModel<dyn FaceSwapper>>,
        enhancer: Arc<LazyModel<dyn FaceEnhancer>>,
        verifier: SwapVerifier,
        match_threshold: f64,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            reader,
            writer,
            analyzer,
            swapper,
            enhancer,
            verifier,
            match_threshold,
            logger,
        }
    }

    /// Runs the pipeline over `frame_paths` in order, writing swapped
    /// frames back to their own paths.
    ///
    /// Precondition failures (faceless source or reference image) are
    /// reported through the returned status, not as errors; per-frame
    /// errors mark that unit failed and processing continues.
    pub fn execute(
        &mut self,
        source_path: &Path,
        frame_paths: &[PathBuf],
        reference_path: Option<&Path>,
    ) -> Result<VideoRunReport, Box<dyn std::error::Error>> {
        let Some(source_face) = self.load_primary_face(source_path)? else {
            self.logger
                .warn("No face detected in source image. Please try with another one.");
            return Ok(VideoRunReport::aborted(RunStatus::NoSourceFace));
        };

        let reference_face = match reference_path {
            Some(path) => match self.load_primary_face(path)? {
                Some(face) => Some(face),
                None => {
                    self.logger
                        .warn("No face detected in reference image. Please try with another one.");
                    return Ok(VideoRunReport::aborted(RunStatus::NoReferenceFace));
                }
            },
            None => None,
        };

        let total = frame_paths.len();
        let mut verification_required = true;
        let mut committed = 0usize;
        let mut skipped = 0usize;
        let mut failed = 0usize;

        for (position, path) in frame_paths.iter().enumerate() {
            match self.process_unit(
                path,
                &source_face,
                reference_face.as_ref(),
                verification_required,
            ) {
                Ok(UnitResult::Committed { verified }) => {
                    committed += 1;
                    if verified {
                        // First verified swap proves the configuration;
                        // later frames commit un-gated.
                        verification_required = false;
                    }
                    self.logger.unit(position, UnitOutcome::Committed);
                }
                Ok(UnitResult::Skipped) => {
                    skipped += 1;
                    self.logger.unit(position, UnitOutcome::Skipped);
                }
                Ok(UnitResult::Rejected) => {
                    self.logger.warn(&format!(
                        "Frame {position} failed the black-region check; aborting run."
                    ));
                    return Ok(VideoRunReport {
                        status: RunStatus::VerificationFailed { unit: position },
                        committed,
                        skipped,
                        failed,
                    });
                }
                Err(e) => {
                    failed += 1;
                    log::debug!("frame {position} error: {e}");
                    self.logger.unit(position, UnitOutcome::Failed);
                }
            }
            self.logger.progress(position + 1, total);
        }

        self.logger.summary();
        Ok(VideoRunReport {
            status: RunStatus::Completed,
            committed,
            skipped,
            failed,
        })
    }

    fn load_primary_face(
        &mut self,
        path: &Path,
    ) -> Result<Option<DetectedFace>, Box<dyn std::error::Error>> {
        let image = self.reader.read(path)?;
        let faces = self.analyzer.detect(&image)?;
        Ok(select_primary(faces))
    }

    fn process_unit(
        &mut self,
        path: &Path,
        source_face: &DetectedFace,
        reference_face: Option<&DetectedFace>,
        verification_required: bool,
    ) -> Result<UnitResult, Box<dyn std::error::Error>> {
        let frame = self.reader.read(path)?;
        let faces = self.analyzer.detect(&frame)?;

        let Some(target) = first_qualifying(&faces, reference_face, self.match_threshold)? else {
            return Ok(UnitResult::Skipped);
        };

        let swapped = self
            .swapper
            .get()
            .map_err(|e| -> Box<dyn std::error::Error> { e })?
            .swap(&frame, target, source_face)?;
        let enhanced = self
            .enhancer
            .get()
            .map_err(|e| -> Box<dyn std::error::Error> { e })?
            .enhance(&swapped)?;

        if verification_required && !self.verifier.is_usable(&enhanced) {
            return Ok(UnitResult::Rejected);
        }

        self.writer.write(path, &enhanced)?;
        Ok(UnitResult::Committed {
            verified: verification_required,
        })
    }
}
