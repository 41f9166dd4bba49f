use std::path::Path;
use std::sync::Arc;

use crate::detection::domain::detected_face::{select_primary, DetectedFace};
use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::pipeline::candidate_filter::first_qualifying;
use crate::pipeline::output_path::swapped_output_path;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::report::{ImageRunReport, RunStatus};
use crate::shared::lazy_model::LazyModel;
use crate::swapping::domain::face_enhancer::FaceEnhancer;
use crate::swapping::domain::face_swapper::FaceSwapper;
use crate::swapping::domain::swap_verifier::SwapVerifier;
use crate::video::domain::image_reader::ImageReader;
use crate::video::domain::image_writer::ImageWriter;

/// Single-image swap pipeline: detect → first qualifying face wins →
/// swap → enhance → verify → write to the `swapped-` path beside the
/// original.
///
/// One unit of work means verification always applies here, and there is
/// no unit-level recovery: any error aborts the call. A target where no
/// face qualifies is a reported failure; nothing is written.
pub struct SwapImageUseCase {
    reader: Box<dyn ImageReader>,
    writer: Box<dyn ImageWriter>,
    analyzer: Box<dyn FaceAnalyzer>,
    swapper: Arc<LazyModel<dyn FaceSwapper>>,
    enhancer: Arc<LazyModel<dyn FaceEnhancer>>,
    verifier: SwapVerifier,
    match_threshold: f64,
    logger: Box<dyn PipelineLogger>,
}

impl SwapImageUseCase {
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

    pub fn execute(
        &mut self,
        source_path: &Path,
        target_path: &Path,
        reference_path: Option<&Path>,
    ) -> Result<ImageRunReport, Box<dyn std::error::Error>> {
        let Some(source_face) = self.load_primary_face(source_path)? else {
            self.logger
                .warn("No face detected in source image. Please try with another one.");
            return Ok(ImageRunReport::aborted(RunStatus::NoSourceFace));
        };

        let reference_face = match reference_path {
            Some(path) => match self.load_primary_face(path)? {
                Some(face) => Some(face),
                None => {
                    self.logger
                        .warn("No face detected in reference image. Please try with another one.");
                    return Ok(ImageRunReport::aborted(RunStatus::NoReferenceFace));
                }
            },
            None => None,
        };

        let frame = self.reader.read(target_path)?;
        let faces = self.analyzer.detect(&frame)?;

        let Some(target) = first_qualifying(&faces, reference_face.as_ref(), self.match_threshold)?
        else {
            self.logger
                .warn("No qualifying face in target image; nothing was swapped.");
            return Ok(ImageRunReport::aborted(RunStatus::NoMatchingFace));
        };

        let swapped = self
            .swapper
            .get()
            .map_err(|e| -> Box<dyn std::error::Error> { e })?
            .swap(&frame, target, &source_face)?;
        let enhanced = self
            .enhancer
            .get()
            .map_err(|e| -> Box<dyn std::error::Error> { e })?
            .enhance(&swapped)?;

        if !self.verifier.is_usable(&enhanced) {
            self.logger
                .warn("Swapped image failed the black-region check; no output written.");
            return Ok(ImageRunReport::aborted(RunStatus::VerificationFailed {
                unit: 0,
            }));
        }

        let output = swapped_output_path(target_path);
        self.writer.write(&output, &enhanced)?;
        self.logger
            .info(&format!("Output written to {}", output.display()));

        Ok(ImageRunReport {
            status: RunStatus::Completed,
            output_path: Some(output),
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
}
