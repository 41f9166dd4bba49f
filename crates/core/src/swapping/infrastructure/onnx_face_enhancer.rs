/// Face enhancer backed by a GFPGAN-family ONNX restoration model.
///
/// Fixed "centered single face, paste back" mode: the central square of
/// the frame is scaled to the model's 512×512 input, restored, scaled
/// back, and pasted over the original region. Frame geometry is never
/// changed.
use std::path::Path;
use std::sync::Mutex;

use image::imageops::FilterType;
use image::RgbImage;

use crate::shared::frame::Frame;
use crate::swapping::domain::face_enhancer::FaceEnhancer;

const ENHANCE_INPUT_SIZE: u32 = 512;
const NORM_MEAN: f32 = 0.5;
const NORM_STD: f32 = 0.5;

pub struct OnnxFaceEnhancer {
    session: Mutex<ort::session::Session>,
}

impl OnnxFaceEnhancer {
    pub fn new(model_path: &Path) -> Result<Self, ort::Error> {
        let intra_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let session = ort::session::Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_inter_threads(1)?
            .with_intra_threads(intra_threads)?
            .commit_from_file(model_path)?;
        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl FaceEnhancer for OnnxFaceEnhancer {
    fn enhance(&self, frame: &Frame) -> Result<Frame, Box<dyn std::error::Error>> {
        let (x0, y0, side) = centered_square(frame.width(), frame.height());
        let crop = frame.crop(x0, y0, x0 + side, y0 + side);

        let input_value = ort::value::Tensor::from_array(preprocess(&crop)?)?;
        let mut session = self
            .session
            .lock()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        let outputs = session.run(ort::inputs![input_value])?;
        let output = outputs[0].try_extract_array::<f32>()?;

        let restored = postprocess(output.view(), side)?;
        let mut result = frame.clone();
        result.paste(&restored, x0, y0);
        Ok(result)
    }
}

/// Largest centered square inside a `w` × `h` frame.
fn centered_square(w: u32, h: u32) -> (u32, u32, u32) {
    let side = w.min(h);
    ((w - side) / 2, (h - side) / 2, side)
}

/// Scale the crop to the model input and normalize to [-1,1] NCHW.
fn preprocess(crop: &Frame) -> Result<ndarray::Array4<f32>, Box<dyn std::error::Error>> {
    let img = RgbImage::from_raw(crop.width(), crop.height(), crop.data().to_vec())
        .ok_or("Failed to create image from frame data")?;
    let resized = image::imageops::resize(
        &img,
        ENHANCE_INPUT_SIZE,
        ENHANCE_INPUT_SIZE,
        FilterType::Triangle,
    );

    let size = ENHANCE_INPUT_SIZE as usize;
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, size, size));
    for (x, y, px) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = (px[c] as f32 / 255.0 - NORM_MEAN) / NORM_STD;
        }
    }
    Ok(tensor)
}

/// Convert the [-1,1] NCHW model output back to a `side`-sized RGB frame.
fn postprocess(
    output: ndarray::ArrayViewD<'_, f32>,
    side: u32,
) -> Result<Frame, Box<dyn std::error::Error>> {
    let shape = output.shape();
    let (h, w) = match shape {
        [1, 3, h, w] => (*h, *w),
        _ => return Err(format!("unexpected enhancer output shape: {shape:?}").into()),
    };

    let mut img = RgbImage::new(w as u32, h as u32);
    for y in 0..h {
        for x in 0..w {
            let px = [
                to_u8(output[[0, 0, y, x]]),
                to_u8(output[[0, 1, y, x]]),
                to_u8(output[[0, 2, y, x]]),
            ];
            img.put_pixel(x as u32, y as u32, image::Rgb(px));
        }
    }

    let resized = image::imageops::resize(&img, side, side, FilterType::Triangle);
    Ok(Frame::new(resized.into_raw(), side, side, 3, 0))
}

fn to_u8(v: f32) -> u8 {
    ((v * NORM_STD + NORM_MEAN) * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_square_landscape() {
        assert_eq!(centered_square(1920, 1080), (420, 0, 1080));
    }

    #[test]
    fn test_centered_square_portrait() {
        assert_eq!(centered_square(720, 1280), (0, 280, 720));
    }

    #[test]
    fn test_centered_square_already_square() {
        assert_eq!(centered_square(512, 512), (0, 0, 512));
    }

    #[test]
    fn test_preprocess_shape_and_normalization() {
        let crop = Frame::new(vec![255u8; 64 * 64 * 3], 64, 64, 3, 0);
        let tensor = preprocess(&crop).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 512, 512]);
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-5);

        let crop = Frame::new(vec![0u8; 64 * 64 * 3], 64, 64, 3, 0);
        let tensor = preprocess(&crop).unwrap();
        assert!((tensor[[0, 0, 0, 0]] + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_postprocess_roundtrips_normalization() {
        // 0.0 in [-1,1] space maps back to mid gray
        let output = ndarray::Array4::<f32>::zeros((1, 3, 512, 512)).into_dyn();
        let patch = postprocess(output.view(), 100).unwrap();
        assert_eq!(patch.width(), 100);
        assert_eq!(patch.height(), 100);
        assert_eq!(patch.data()[0], 128);
    }

    #[test]
    fn test_postprocess_rejects_bad_shape() {
        let output = ndarray::Array4::<f32>::zeros((1, 1, 512, 512)).into_dyn();
        assert!(postprocess(output.view(), 100).is_err());
    }

    #[test]
    fn test_to_u8_clamps_out_of_range() {
        assert_eq!(to_u8(-2.0), 0);
        assert_eq!(to_u8(-1.0), 0);
        assert_eq!(to_u8(1.0), 255);
        assert_eq!(to_u8(3.0), 255);
    }
}
