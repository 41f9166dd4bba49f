pub mod constants;
pub mod frame;
pub mod lazy_model;
pub mod model_resolver;
pub mod video_metadata;
