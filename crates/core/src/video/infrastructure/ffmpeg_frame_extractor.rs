use std::path::{Path, PathBuf};

use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_extractor::{ExtractedSequence, FrameExtractor};

/// Decodes a video into numbered PNG frame files via ffmpeg-next
/// (libavformat + libavcodec).
///
/// Each decoded frame is converted to RGB24 and written as
/// `<out_dir>/NNNNNN.png`. A frame-rate cap is applied by dropping frames
/// during decode rather than re-encoding the source first.
pub struct FfmpegFrameExtractor;

impl FfmpegFrameExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FfmpegFrameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameExtractor for FfmpegFrameExtractor {
    fn probe(&mut self, video: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(video)?;
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        Ok(VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps: stream_fps(&stream),
            total_frames: stream.frames().max(0) as usize,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(video.to_path_buf()),
        })
    }

    fn extract(
        &mut self,
        video: &Path,
        out_dir: &Path,
        max_fps: Option<f64>,
    ) -> Result<ExtractedSequence, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        std::fs::create_dir_all(out_dir)?;

        let mut ictx = ffmpeg_next::format::input(video)?;

        let (video_stream_index, src_fps, mut decoder) = {
            let stream = ictx
                .streams()
                .best(ffmpeg_next::media::Type::Video)
                .ok_or("No video stream found")?;
            let codec_ctx =
                ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
            (stream.index(), stream_fps(&stream), codec_ctx.decoder().video()?)
        };

        let width = decoder.width();
        let height = decoder.height();

        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        // Decimation step: >1 means dropping frames to honor the cap
        let step = match max_fps {
            Some(cap) if cap > 0.0 && src_fps > cap => src_fps / cap,
            _ => 1.0,
        };
        let effective_fps = if step > 1.0 { max_fps.unwrap() } else { src_fps };

        let mut seen = 0usize;
        let mut paths: Vec<PathBuf> = Vec::new();

        for (stream, packet) in ictx.packets() {
            if stream.index() != video_stream_index {
                continue;
            }
            if decoder.send_packet(&packet).is_err() {
                continue;
            }
            drain_decoder(
                &mut decoder,
                &mut scaler,
                width,
                height,
                step,
                out_dir,
                &mut seen,
                &mut paths,
            )?;
        }

        let _ = decoder.send_eof();
        drain_decoder(
            &mut decoder,
            &mut scaler,
            width,
            height,
            step,
            out_dir,
            &mut seen,
            &mut paths,
        )?;

        Ok(ExtractedSequence {
            paths,
            fps: effective_fps,
        })
    }
}

fn stream_fps(stream: &ffmpeg_next::format::stream::Stream) -> f64 {
    let rate = stream.rate();
    if rate.denominator() != 0 {
        rate.numerator() as f64 / rate.denominator() as f64
    } else {
        0.0
    }
}

/// Pulls every pending frame out of the decoder, keeping one frame per
/// `step` decoded frames and writing the kept ones as PNG files.
#[allow(clippy::too_many_arguments)]
fn drain_decoder(
    decoder: &mut ffmpeg_next::decoder::Video,
    scaler: &mut ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    step: f64,
    out_dir: &Path,
    seen: &mut usize,
    paths: &mut Vec<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
    while decoder.receive_frame(&mut decoded).is_ok() {
        let keep = (*seen as f64 / step) as usize >= paths.len();
        if keep {
            let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
            scaler.run(&decoded, &mut rgb_frame)?;
            let pixels = extract_rgb_pixels(&rgb_frame, width, height);

            let path = out_dir.join(format!("{:06}.png", paths.len()));
            image::RgbImage::from_raw(width, height, pixels)
                .ok_or("Failed to create image from decoded frame")?
                .save(&path)?;
            paths.push(path);
        }
        *seen += 1;
    }
    Ok(())
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer.
///
/// ffmpeg frames may have padding bytes at the end of each row
/// (stride > width*3); this strips that padding.
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}
