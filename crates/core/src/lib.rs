//! Face swapping for images and videos.
//!
//! The core of the crate is the swap-and-verify pipeline in [`pipeline`]:
//! pick a source face once, then for each frame unit detect faces, choose
//! the first qualifying one (optionally by identity match against a
//! reference face), swap it, enhance the result, and gate the write-back
//! behind a black-region check. Model inference, video demux/mux, and
//! frame-file I/O live behind traits in [`detection`], [`swapping`], and
//! [`video`] so the pipeline can be exercised without models on disk.

pub mod detection;
pub mod pipeline;
pub mod shared;
pub mod swapping;
pub mod video;
