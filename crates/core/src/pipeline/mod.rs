pub mod candidate_filter;
pub mod output_path;
pub mod pipeline_logger;
pub mod report;
pub mod swap_image_use_case;
pub mod swap_video_use_case;
