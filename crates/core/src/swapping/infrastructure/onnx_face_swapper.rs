/// Face swapper backed by an inswapper-family ONNX model.
///
/// The model takes the target face crop at 128×128 plus the source
/// identity embedding and returns the identity-transferred crop, which is
/// resized back and pasted over the original box.
use std::path::Path;
use std::sync::Mutex;

use image::imageops::FilterType;
use image::RgbImage;

use crate::detection::domain::detected_face::DetectedFace;
use crate::shared::frame::Frame;
use crate::swapping::domain::face_swapper::FaceSwapper;

const SWAP_INPUT_SIZE: u32 = 128;

pub struct OnnxFaceSwapper {
    session: Mutex<ort::session::Session>,
}

impl OnnxFaceSwapper {
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

impl FaceSwapper for OnnxFaceSwapper {
    fn swap(
        &self,
        frame: &Frame,
        target: &DetectedFace,
        source: &DetectedFace,
    ) -> Result<Frame, Box<dyn std::error::Error>> {
        let (x0, y0, x1, y1) = target.bbox.clamped(frame.width(), frame.height());
        if x1 <= x0 || y1 <= y0 {
            return Err("target face box is empty after clamping".into());
        }
        let crop = frame.crop(x0, y0, x1, y1);
        let (crop_w, crop_h) = (crop.width(), crop.height());

        let target_tensor = ort::value::Tensor::from_array(preprocess_crop(&crop)?)?;
        let source_tensor = ort::value::Tensor::from_array(ndarray::Array2::from_shape_vec(
            (1, source.embedding.len()),
            source.embedding.clone(),
        )?)?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        let outputs = session.run(ort::inputs![
            "target" => target_tensor,
            "source" => source_tensor,
        ])?;

        let output = outputs["output"].try_extract_array::<f32>()?;
        let patch = postprocess_output(output.view(), crop_w, crop_h)?;

        let mut result = frame.clone();
        result.paste(&patch, x0, y0);
        Ok(result)
    }
}

/// Resize the face crop to the model input and convert to a [0,1] NCHW tensor.
fn preprocess_crop(crop: &Frame) -> Result<ndarray::Array4<f32>, Box<dyn std::error::Error>> {
    let img = RgbImage::from_raw(crop.width(), crop.height(), crop.data().to_vec())
        .ok_or("Failed to create image from face crop")?;
    let resized = image::imageops::resize(&img, SWAP_INPUT_SIZE, SWAP_INPUT_SIZE, FilterType::Triangle);

    let size = SWAP_INPUT_SIZE as usize;
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, size, size));
    for (x, y, px) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = px[c] as f32 / 255.0;
        }
    }
    Ok(tensor)
}

/// Convert the [0,1] NCHW model output back to a crop-sized RGB frame.
fn postprocess_output(
    output: ndarray::ArrayViewD<'_, f32>,
    crop_w: u32,
    crop_h: u32,
) -> Result<Frame, Box<dyn std::error::Error>> {
    let shape = output.shape();
    let (h, w) = match shape {
        [1, 3, h, w] => (*h, *w),
        _ => return Err(format!("unexpected swap output shape: {shape:?}").into()),
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

    let resized = image::imageops::resize(&img, crop_w, crop_h, FilterType::Triangle);
    Ok(Frame::new(resized.into_raw(), crop_w, crop_h, 3, 0))
}

fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_crop_shape_and_range() {
        let crop = Frame::new(vec![255u8; 60 * 40 * 3], 60, 40, 3, 0);
        let tensor = preprocess_crop(&crop).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 128, 128]);
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_preprocess_crop_zero_input() {
        let crop = Frame::new(vec![0u8; 10 * 10 * 3], 10, 10, 3, 0);
        let tensor = preprocess_crop(&crop).unwrap();
        assert!((tensor[[0, 0, 64, 64]]).abs() < 1e-6);
    }

    #[test]
    fn test_postprocess_output_resizes_to_crop() {
        let output = ndarray::Array4::<f32>::from_elem((1, 3, 128, 128), 0.5).into_dyn();
        let patch = postprocess_output(output.view(), 60, 40).unwrap();
        assert_eq!(patch.width(), 60);
        assert_eq!(patch.height(), 40);
        assert_eq!(patch.data()[0], 128); // 0.5 * 255 rounded
    }

    #[test]
    fn test_postprocess_output_rejects_bad_shape() {
        let output = ndarray::Array3::<f32>::zeros((3, 128, 128)).into_dyn();
        assert!(postprocess_output(output.view(), 60, 40).is_err());
    }

    #[test]
    fn test_to_u8_clamps() {
        assert_eq!(to_u8(-0.5), 0);
        assert_eq!(to_u8(0.0), 0);
        assert_eq!(to_u8(1.0), 255);
        assert_eq!(to_u8(2.0), 255);
    }
}
