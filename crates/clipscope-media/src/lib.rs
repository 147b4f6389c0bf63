#![deny(unreachable_patterns)]
//! Frame extraction and image preparation.
//!
//! This crate provides:
//! - A render service client with an explicit poll state machine
//! - The frame strategy chain (rendered stills, thumbnail proxy)
//! - Image fetching and JPEG transcoding for model requests

pub mod error;
pub mod frames;
pub mod image_prep;
pub mod render;

pub use error::{MediaError, MediaResult};
pub use frames::{
    FrameExtractor, FrameStrategy, RenderFrameStrategy, ThumbnailProxyStrategy, VideoSource,
    DEFAULT_THUMBNAIL_PROXY_URL,
};
pub use image_prep::{ImageLoader, ImagePrepConfig, ImagePreparer};
pub use render::poll::{advance, poll_until_settled, Clock, PollPolicy, PollState, TokioClock};
pub use render::{RenderClient, RenderClientConfig, RenderObservation, RenderService};
