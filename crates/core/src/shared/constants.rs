pub const DETECT_MODEL_NAME: &str = "yoloface_8n.onnx";
pub const DETECT_MODEL_URL: &str =
    "https://github.com/facefusion/facefusion-assets/releases/download/models/yoloface_8n.onnx";

pub const EMBED_MODEL_NAME: &str = "arcface_w600k_r50.onnx";
pub const EMBED_MODEL_URL: &str =
    "https://github.com/facefusion/facefusion-assets/releases/download/models/arcface_w600k_r50.onnx";

pub const SWAP_MODEL_NAME: &str = "inswapper_128_fp16.onnx";
pub const SWAP_MODEL_URL: &str =
    "https://github.com/facefusion/facefusion-assets/releases/download/models/inswapper_128_fp16.onnx";

pub const ENHANCE_MODEL_NAME: &str = "gfpgan_1.4.onnx";
pub const ENHANCE_MODEL_URL: &str =
    "https://github.com/facefusion/facefusion-assets/releases/download/models/gfpgan_1.4.onnx";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Frame-rate cap applied to extracted video unless the caller opts out.
pub const FPS_CAP: f64 = 30.0;
