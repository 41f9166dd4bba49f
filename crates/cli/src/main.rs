use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;

use refacer_core::detection::infrastructure::onnx_face_analyzer::OnnxFaceAnalyzer;
use refacer_core::pipeline::pipeline_logger::LogPipelineLogger;
use refacer_core::pipeline::swap_image_use_case::SwapImageUseCase;
use refacer_core::pipeline::swap_video_use_case::SwapVideoUseCase;
use refacer_core::shared::constants::{
    DETECT_MODEL_NAME, DETECT_MODEL_URL, EMBED_MODEL_NAME, EMBED_MODEL_URL, ENHANCE_MODEL_NAME,
    ENHANCE_MODEL_URL, FPS_CAP, IMAGE_EXTENSIONS, SWAP_MODEL_NAME, SWAP_MODEL_URL,
};
use refacer_core::shared::lazy_model::LazyModel;
use refacer_core::shared::model_resolver;
use refacer_core::swapping::domain::face_enhancer::FaceEnhancer;
use refacer_core::swapping::domain::face_swapper::FaceSwapper;
use refacer_core::swapping::domain::swap_verifier::SwapVerifier;
use refacer_core::swapping::infrastructure::onnx_face_enhancer::OnnxFaceEnhancer;
use refacer_core::swapping::infrastructure::onnx_face_swapper::OnnxFaceSwapper;
use refacer_core::video::domain::frame_extractor::FrameExtractor;
use refacer_core::video::domain::video_assembler::VideoAssembler;
use refacer_core::video::infrastructure::ffmpeg_frame_extractor::FfmpegFrameExtractor;
use refacer_core::video::infrastructure::ffmpeg_video_assembler::FfmpegVideoAssembler;
use refacer_core::video::infrastructure::image_file_reader::ImageFileReader;
use refacer_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Face swapping for videos and images.
#[derive(Parser)]
#[command(name = "refacer")]
struct Cli {
    /// Image containing the face to transfer.
    source: PathBuf,

    /// Target image or video to swap the face into.
    target: PathBuf,

    /// Only swap faces that match this reference image.
    #[arg(long)]
    reference_image: Option<PathBuf>,

    /// Cosine-distance threshold for reference matching (lower = stricter).
    #[arg(long, default_value = "1.0")]
    match_threshold: f64,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value = "0.5")]
    confidence: f64,

    /// Black-pixel count above which a swapped frame is rejected.
    /// Derived for ~1080p frames; re-derive for other resolutions.
    #[arg(long, default_value = "125000")]
    black_pixel_limit: usize,

    /// Keep the source frame rate instead of capping at 30 fps.
    #[arg(long)]
    keep_fps: bool,

    /// Keep the extracted frame files after the video is assembled.
    #[arg(long)]
    keep_frames: bool,

    /// Working directory for extracted frames and the output video.
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let analyzer = build_analyzer(&cli)?;
    let (swapper, enhancer) = build_model_holders()?;

    // Warm both holders so a missing or broken model artifact is fatal
    // before any frame is touched.
    log::info!("Loading swap and enhancement models...");
    swapper.get()?;
    enhancer.get()?;

    let verifier = SwapVerifier::new(cli.black_pixel_limit);

    let success = if is_image(&cli.target) {
        run_image_swap(&cli, analyzer, swapper, enhancer, verifier)?
    } else {
        run_video_swap(&cli, analyzer, swapper, enhancer, verifier)?
    };

    if !success {
        // Distinct from "some frames were skipped": the run itself failed.
        process::exit(1);
    }
    Ok(())
}

fn run_image_swap(
    cli: &Cli,
    analyzer: Box<OnnxFaceAnalyzer>,
    swapper: Arc<LazyModel<dyn FaceSwapper>>,
    enhancer: Arc<LazyModel<dyn FaceEnhancer>>,
    verifier: SwapVerifier,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut use_case = SwapImageUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(ImageFileWriter::new()),
        analyzer,
        swapper,
        enhancer,
        verifier,
        cli.match_threshold,
        Box::new(LogPipelineLogger::default()),
    );

    let report = use_case.execute(&cli.source, &cli.target, cli.reference_image.as_deref())?;
    if let Some(path) = &report.output_path {
        log::info!("Swap successful: {}", path.display());
    } else {
        log::warn!("Swap did not produce an output: {:?}", report.status);
    }
    Ok(report.is_success())
}

fn run_video_swap(
    cli: &Cli,
    analyzer: Box<OnnxFaceAnalyzer>,
    swapper: Arc<LazyModel<dyn FaceSwapper>>,
    enhancer: Arc<LazyModel<dyn FaceEnhancer>>,
    verifier: SwapVerifier,
) -> Result<bool, Box<dyn std::error::Error>> {
    if cli.output_dir.exists() {
        std::fs::remove_dir_all(&cli.output_dir)?;
    }
    std::fs::create_dir_all(&cli.output_dir)?;
    let frames_dir = cli.output_dir.join("frames");

    let mut extractor = FfmpegFrameExtractor::new();

    log::info!("Detecting video FPS...");
    let metadata = extractor.probe(&cli.target)?;
    log::info!("Source rate: {:.2} fps", metadata.fps);

    log::info!("Extracting frames...");
    let max_fps = if cli.keep_fps { None } else { Some(FPS_CAP) };
    let sequence = extractor.extract(&cli.target, &frames_dir, max_fps)?;
    log::info!(
        "Extracted {} frames at {:.2} fps",
        sequence.paths.len(),
        sequence.fps
    );

    log::info!("Swapping in progress...");
    let start = Instant::now();
    let mut use_case = SwapVideoUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(ImageFileWriter::new()),
        analyzer,
        swapper,
        enhancer,
        verifier,
        cli.match_threshold,
        Box::new(LogPipelineLogger::default()),
    );
    let report = use_case.execute(&cli.source, &sequence.paths, cli.reference_image.as_deref())?;
    log::info!("Processing time: {:.2}s", start.elapsed().as_secs_f64());

    if !report.is_success() {
        log::warn!("Run failed: {:?}; no video was assembled.", report.status);
        return Ok(false);
    }

    log::info!("Creating video...");
    let output = cli.output_dir.join("output.mp4");
    FfmpegVideoAssembler::new().assemble(&sequence.paths, sequence.fps, &cli.target, &output)?;

    if !cli.keep_frames {
        std::fs::remove_dir_all(&frames_dir)?;
    }

    log::info!("Video saved as: {}", output.display());
    Ok(true)
}

fn build_analyzer(cli: &Cli) -> Result<Box<OnnxFaceAnalyzer>, Box<dyn std::error::Error>> {
    let detect_path = resolve_model(DETECT_MODEL_NAME, DETECT_MODEL_URL)?;
    let embed_path = resolve_model(EMBED_MODEL_NAME, EMBED_MODEL_URL)?;
    Ok(Box::new(OnnxFaceAnalyzer::new(
        &detect_path,
        &embed_path,
        cli.confidence,
    )?))
}

#[allow(clippy::type_complexity)]
fn build_model_holders() -> Result<
    (
        Arc<LazyModel<dyn FaceSwapper>>,
        Arc<LazyModel<dyn FaceEnhancer>>,
    ),
    Box<dyn std::error::Error>,
> {
    let swap_path = resolve_model(SWAP_MODEL_NAME, SWAP_MODEL_URL)?;
    let enhance_path = resolve_model(ENHANCE_MODEL_NAME, ENHANCE_MODEL_URL)?;

    let swapper: Arc<LazyModel<dyn FaceSwapper>> = Arc::new(LazyModel::new(move || {
        let swapper: Arc<dyn FaceSwapper> = Arc::new(OnnxFaceSwapper::new(&swap_path)?);
        Ok(swapper)
    }));
    let enhancer: Arc<LazyModel<dyn FaceEnhancer>> = Arc::new(LazyModel::new(move || {
        let enhancer: Arc<dyn FaceEnhancer> = Arc::new(OnnxFaceEnhancer::new(&enhance_path)?);
        Ok(enhancer)
    }));
    Ok((swapper, enhancer))
}

fn resolve_model(name: &str, url: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {name}");
    let owned_name = name.to_string();
    let path = model_resolver::resolve(
        name,
        url,
        Some(Box::new(move |downloaded, total| {
            download_progress(&owned_name, downloaded, total)
        })),
    )?;
    Ok(path)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.source.exists() {
        return Err(format!("Source image not found: {}", cli.source.display()).into());
    }
    if !cli.target.exists() {
        return Err(format!("Target file not found: {}", cli.target.display()).into());
    }
    if let Some(reference) = &cli.reference_image {
        if !reference.exists() {
            return Err(format!("Reference image not found: {}", reference.display()).into());
        }
    }
    if !(0.0..=2.0).contains(&cli.match_threshold) || cli.match_threshold == 0.0 {
        return Err(format!(
            "Match threshold must be in (0.0, 2.0], got {}",
            cli.match_threshold
        )
        .into());
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn download_progress(name: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {name}... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading {name}... {downloaded} bytes");
    }
}
