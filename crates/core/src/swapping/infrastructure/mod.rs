pub mod onnx_face_enhancer;
pub mod onnx_face_swapper;
