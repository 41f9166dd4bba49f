use std::path::{Path, PathBuf};

use crate::video::domain::video_assembler::VideoAssembler;

/// Encodes a frame-file sequence into a video via ffmpeg-next, then remuxes
/// the source container's audio stream into the result.
///
/// Uses MPEG4 as a widely compatible encoder. Audio re-attachment is a
/// stream copy; no re-encode and no external ffmpeg binary.
pub struct FfmpegVideoAssembler;

impl FfmpegVideoAssembler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FfmpegVideoAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoAssembler for FfmpegVideoAssembler {
    fn assemble(
        &mut self,
        frames: &[PathBuf],
        fps: f64,
        audio_source: &Path,
        output: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if frames.is_empty() {
            return Err("no frames to assemble".into());
        }
        ffmpeg_next::init()?;

        let first = image::open(&frames[0])?.to_rgb8();
        let (width, height) = first.dimensions();
        drop(first);

        let fps_i = fps.round() as i32;
        let fps_i = if fps_i <= 0 { 30 } else { fps_i };

        let mut octx = ffmpeg_next::format::output(output)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
            .ok_or("MPEG4 encoder not found")?;

        let mut ost = octx.add_stream(Some(codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        encoder_ctx.set_width(width);
        encoder_ctx.set_height(height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps_i));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps_i, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let mut encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);

        octx.write_header()?;
        let ost_time_base = octx.stream(0).ok_or("output stream missing")?.time_base();

        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::format::Pixel::YUV420P,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        for (i, path) in frames.iter().enumerate() {
            let img = image::open(path)?.to_rgb8();
            if img.dimensions() != (width, height) {
                return Err(format!(
                    "frame {} has dimensions {:?}, expected {:?}",
                    path.display(),
                    img.dimensions(),
                    (width, height)
                )
                .into());
            }

            let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
                ffmpeg_next::format::Pixel::RGB24,
                width,
                height,
            );
            let stride = rgb_frame.stride(0);
            let data = rgb_frame.data_mut(0);
            let src = img.as_raw();

            // Copy pixel data, respecting stride
            for row in 0..height as usize {
                let src_start = row * width as usize * 3;
                let dst_start = row * stride;
                data[dst_start..dst_start + width as usize * 3]
                    .copy_from_slice(&src[src_start..src_start + width as usize * 3]);
            }

            let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
            scaler.run(&rgb_frame, &mut yuv_frame)?;
            yuv_frame.set_pts(Some(i as i64));

            encoder.send_frame(&yuv_frame)?;
            write_packets(&mut encoder, &mut octx, fps_i, ost_time_base)?;
        }

        encoder.send_eof()?;
        write_packets(&mut encoder, &mut octx, fps_i, ost_time_base)?;
        octx.write_trailer()?;

        if let Err(e) = mux_audio(audio_source, output) {
            log::warn!("Audio muxing failed: {e}");
        }

        Ok(())
    }
}

fn write_packets(
    encoder: &mut ffmpeg_next::codec::encoder::video::Encoder,
    octx: &mut ffmpeg_next::format::context::Output,
    fps_i: i32,
    ost_time_base: ffmpeg_next::Rational,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut encoded = ffmpeg_next::Packet::empty();
    while encoder.receive_packet(&mut encoded).is_ok() {
        encoded.set_stream(0);
        encoded.rescale_ts(ffmpeg_next::Rational(1, fps_i), ost_time_base);
        encoded.write_interleaved(octx)?;
    }
    Ok(())
}

/// Copies audio from `source` into `video_output` by remuxing.
///
/// Creates a temp file with both video + audio, then replaces the original
/// output. A source without audio is not an error.
fn mux_audio(source: &Path, video_output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let ictx_source = ffmpeg_next::format::input(source)?;

    let has_audio = ictx_source
        .streams()
        .best(ffmpeg_next::media::Type::Audio)
        .is_some();

    if !has_audio {
        return Ok(());
    }

    drop(ictx_source);

    // Re-open source and video-only output for remuxing
    let mut ictx_source = ffmpeg_next::format::input(source)?;
    let mut ictx_video = ffmpeg_next::format::input(video_output)?;

    let ext = video_output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("mp4");
    let temp_path = video_output.with_extension(format!("_mux.{ext}"));

    let mut octx = ffmpeg_next::format::output(&temp_path)?;

    let mut video_stream_map: Vec<isize> = vec![-1; ictx_video.nb_streams() as usize];
    let mut audio_stream_map: Vec<isize> = vec![-1; ictx_source.nb_streams() as usize];
    let mut ost_index: usize = 0;

    for (idx, stream) in ictx_video.streams().enumerate() {
        if stream.parameters().medium() == ffmpeg_next::media::Type::Video {
            let mut ost =
                octx.add_stream(ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::None))?;
            ost.set_parameters(stream.parameters());
            unsafe {
                (*ost.parameters().as_mut_ptr()).codec_tag = 0;
            }
            video_stream_map[idx] = ost_index as isize;
            ost_index += 1;
        }
    }

    for (idx, stream) in ictx_source.streams().enumerate() {
        if stream.parameters().medium() == ffmpeg_next::media::Type::Audio {
            let mut ost =
                octx.add_stream(ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::None))?;
            ost.set_parameters(stream.parameters());
            unsafe {
                (*ost.parameters().as_mut_ptr()).codec_tag = 0;
            }
            audio_stream_map[idx] = ost_index as isize;
            ost_index += 1;
        }
    }

    octx.write_header()?;

    // Copy video packets
    let video_time_bases: Vec<_> = ictx_video.streams().map(|s| s.time_base()).collect();

    for (stream, mut packet) in ictx_video.packets() {
        let ist_idx = stream.index();
        let ost_idx = video_stream_map[ist_idx];
        if ost_idx < 0 {
            continue;
        }
        let ost_time_base = octx.stream(ost_idx as usize).unwrap().time_base();
        packet.rescale_ts(video_time_bases[ist_idx], ost_time_base);
        packet.set_position(-1);
        packet.set_stream(ost_idx as usize);
        packet.write_interleaved(&mut octx)?;
    }

    // Copy audio packets
    let audio_time_bases: Vec<_> = ictx_source.streams().map(|s| s.time_base()).collect();

    for (stream, mut packet) in ictx_source.packets() {
        let ist_idx = stream.index();
        let ost_idx = audio_stream_map[ist_idx];
        if ost_idx < 0 {
            continue;
        }
        let ost_time_base = octx.stream(ost_idx as usize).unwrap().time_base();
        packet.rescale_ts(audio_time_bases[ist_idx], ost_time_base);
        packet.set_position(-1);
        packet.set_stream(ost_idx as usize);
        packet.write_interleaved(&mut octx)?;
    }

    octx.write_trailer()?;

    // Replace original output with muxed version
    std::fs::rename(&temp_path, video_output)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::infrastructure::test_support::create_test_video;

    fn write_frame_files(dir: &Path, count: usize, width: u32, height: u32) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.join(format!("{i:06}.png"));
                let mut img = image::RgbImage::new(width, height);
                for px in img.pixels_mut() {
                    *px = image::Rgb([128, 128, 128]);
                }
                img.save(&path).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_assemble_creates_video() {
        let dir = tempfile::tempdir().unwrap();
        let frames = write_frame_files(dir.path(), 3, 160, 120);
        let source = dir.path().join("source.mp4");
        create_test_video(&source, 3, 160, 120, 30.0);
        let output = dir.path().join("out.mp4");

        FfmpegVideoAssembler::new()
            .assemble(&frames, 30.0, &source, &output)
            .unwrap();

        assert!(output.exists());
        assert!(std::fs::metadata(&output).unwrap().len() > 0);
    }

    #[test]
    fn test_assembled_video_has_frame_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let frames = write_frame_files(dir.path(), 2, 160, 120);
        let source = dir.path().join("source.mp4");
        create_test_video(&source, 2, 160, 120, 30.0);
        let output = dir.path().join("out.mp4");

        FfmpegVideoAssembler::new()
            .assemble(&frames, 30.0, &source, &output)
            .unwrap();

        ffmpeg_next::init().unwrap();
        let ictx = ffmpeg_next::format::input(&output).unwrap();
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .unwrap();
        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(stream.parameters()).unwrap();
        let decoder = codec_ctx.decoder().video().unwrap();
        assert_eq!(decoder.width(), 160);
        assert_eq!(decoder.height(), 120);
    }

    #[test]
    fn test_assemble_empty_sequence_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.mp4");
        create_test_video(&source, 1, 160, 120, 30.0);
        let output = dir.path().join("out.mp4");

        let result = FfmpegVideoAssembler::new().assemble(&[], 30.0, &source, &output);
        assert!(result.is_err());
    }

    #[test]
    fn test_assemble_mismatched_frame_size_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let other = dir.path().join("other");
        std::fs::create_dir_all(&other).unwrap();
        let mut frames = write_frame_files(dir.path(), 1, 160, 120);
        frames.extend(write_frame_files(&other, 1, 80, 60));
        let source = dir.path().join("source.mp4");
        create_test_video(&source, 1, 160, 120, 30.0);
        let output = dir.path().join("out.mp4");

        let result = FfmpegVideoAssembler::new().assemble(&frames, 30.0, &source, &output);
        assert!(result.is_err());
    }

    #[test]
    fn test_audio_free_source_still_assembles() {
        // The test source has no audio stream; muxing must be a no-op,
        // not a failure.
        let dir = tempfile::tempdir().unwrap();
        let frames = write_frame_files(dir.path(), 2, 160, 120);
        let source = dir.path().join("source.mp4");
        create_test_video(&source, 2, 160, 120, 30.0);
        let output = dir.path().join("out.mp4");

        FfmpegVideoAssembler::new()
            .assemble(&frames, 30.0, &source, &output)
            .unwrap();
        assert!(output.exists());
    }
}
