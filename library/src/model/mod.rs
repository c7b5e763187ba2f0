pub mod format;
pub mod frame;
pub mod link;

pub use format::{ChannelLayout, MediaType, PixelFormat, SampleFormat};
pub use frame::{AudioFrame, Frame, VideoFrame};
pub use link::{AudioParams, LinkMedia, LinkParams, VideoParams};
